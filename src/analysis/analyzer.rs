//! Analyzers combine a tokenizer with token filters.
//!
//! # Available Analyzers
//!
//! - [`whitespace::WhitespaceAnalyzer`] splits on whitespace, keeps case
//! - [`simple::SimpleAnalyzer`] letter runs, lowercased
//! - [`standard::StandardAnalyzer`] Unicode words, lowercased
//! - [`keyword::KeywordAnalyzer`] whole input as one token
//! - [`per_field::PerFieldAnalyzer`] different analyzers for different fields
//! - [`pipeline::PipelineAnalyzer`] any tokenizer plus a filter chain

use crate::analysis::token::TokenStream;
use crate::error::Result;

pub mod keyword;
pub mod per_field;
pub mod pipeline;
pub mod simple;
pub mod standard;
pub mod whitespace;

/// Trait for analyzers that convert text into processed tokens.
pub trait Analyzer: Send + Sync + std::fmt::Debug {
    /// Analyze the given text and return a stream of tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Analyze text destined for `field`. Defaults to [`Analyzer::analyze`].
    fn analyze_field(&self, _field: &str, text: &str) -> Result<TokenStream> {
        self.analyze(text)
    }

    /// Get the name of this analyzer (for debugging and configuration).
    fn name(&self) -> &str;
}
