//! # Strata
//!
//! A segment-based inverted index and search engine core.
//!
//! ## Features
//!
//! - Immutable segments with positional postings, stored fields and field norms
//! - Atomic commit points and a single-writer lock
//! - Updates and deletes through versioned deletion bitmaps
//! - Log-structured segment merging and optimize
//! - Point-in-time and near-real-time readers
//! - Term, phrase, prefix, wildcard, fuzzy, range and boolean queries
//! - TF-IDF scoring with explanations
//! - A query parser for the classic query syntax
//! - Pluggable storage backends

pub mod analysis;
pub mod document;
pub mod error;
pub mod index;
pub mod search;
pub mod storage;
pub mod util;

pub mod prelude {
    pub use crate::analysis::{Analyzer, StandardAnalyzer};
    pub use crate::document::{Document, Field, Store, StoredDocument};
    pub use crate::error::{Result, StrataError};
    pub use crate::index::{Directory, IndexReader, IndexWriter, IndexWriterConfig, OpenMode, Term};
    pub use crate::search::{IndexSearcher, Query, QueryParser, TopDocs};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
