//! Queries, scoring and searching.
//!
//! Scoring is classic TF-IDF:
//!
//! ```text
//! score(q, d) = boost · √freq · idf · norm
//! idf         = 1 + ln(maxDoc / (docFreq + 1))
//! norm        = 1 / √fieldLength
//! ```
//!
//! Multi-term queries (prefix, wildcard, ranges) score a constant equal to
//! their boost; boolean queries add up their matching clauses.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use strata::analysis::StandardAnalyzer;
//! use strata::document::{Document, Store};
//! use strata::index::{Directory, IndexReader, IndexWriter, IndexWriterConfig};
//! use strata::search::{IndexSearcher, QueryParser};
//! use strata::storage::memory::MemoryStorage;
//!
//! # fn main() -> strata::error::Result<()> {
//! let directory = Directory::new(Arc::new(MemoryStorage::default()));
//! let writer = IndexWriter::open(&directory, IndexWriterConfig::default())?;
//! for title in ["JUnit in Action", "Ant in Action", "Tapestry in Action"] {
//!     writer.add_document(Document::builder().add_text("title", title, Store::Yes).build())?;
//! }
//! writer.close()?;
//!
//! let searcher = IndexSearcher::new(IndexReader::open(&directory)?);
//! let parser = QueryParser::new("title", Arc::new(StandardAnalyzer::new()));
//! let top = searcher.search(&parser.parse("+action -tapestry")?, 10)?;
//! assert_eq!(top.total_hits, 2);
//! # Ok(())
//! # }
//! ```

pub mod collector;
pub mod explanation;
pub mod parser;
pub mod phrase;
pub mod query;
pub mod searcher;
pub mod similarity;
pub mod weight;

pub use collector::{ScoreDoc, TopDocs, TopDocsCollector};
pub use explanation::Explanation;
pub use parser::{Operator, QueryParser};
pub use query::{
    BooleanClause, BooleanQuery, FuzzyQuery, MatchAllQuery, NumericRangeQuery, Occur,
    PhraseQuery, PrefixQuery, Query, TermQuery, TermRangeQuery, WildcardQuery,
};
pub use searcher::IndexSearcher;
