//! Tokenizers split text into tokens.
//!
//! - [`whitespace::WhitespaceTokenizer`] splits on whitespace
//! - [`regex::RegexTokenizer`] extracts regex matches
//! - [`unicode_word::UnicodeWordTokenizer`] uses Unicode word boundaries
//! - [`whole::WholeTokenizer`] emits the entire input as one token

use crate::analysis::token::TokenStream;
use crate::error::Result;

pub mod regex;
pub mod unicode_word;
pub mod whitespace;
pub mod whole;

/// Trait for tokenizers that convert text into tokens.
pub trait Tokenizer: Send + Sync + std::fmt::Debug {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this tokenizer.
    fn name(&self) -> &'static str;
}
