//! Text analysis for Strata.
//!
//! An [`Analyzer`] turns field text into a lazy stream of [`Token`]s. The index
//! writer consumes analyzers for `Text` fields and the query parser uses the
//! same analyzer to normalize query terms.

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

pub use analyzer::Analyzer;
pub use analyzer::keyword::KeywordAnalyzer;
pub use analyzer::per_field::PerFieldAnalyzer;
pub use analyzer::pipeline::PipelineAnalyzer;
pub use analyzer::simple::SimpleAnalyzer;
pub use analyzer::standard::StandardAnalyzer;
pub use analyzer::whitespace::WhitespaceAnalyzer;
pub use token::{Token, TokenStream};
