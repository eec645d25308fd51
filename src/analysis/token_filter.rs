//! Token filters transform token streams.

use crate::analysis::token::TokenStream;
use crate::error::Result;

pub mod lowercase;

/// Trait for filters that transform token streams.
pub trait Filter: Send + Sync + std::fmt::Debug {
    /// Apply this filter to a token stream.
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    /// Get the name of this filter.
    fn name(&self) -> &'static str;
}
