//! Segment-based inverted index: writing, committing, merging and reading.
//!
//! # Files
//!
//! | File | Content |
//! |---|---|
//! | `write.lock` | held by the open [`IndexWriter`] |
//! | `segments.gen` | pointer naming the current commit |
//! | `segments_<gen>` | commit point: the live segment list |
//! | `<seg>.dict` | per-field sorted term dictionary |
//! | `<seg>.post` | positional posting lists |
//! | `<seg>.docs` | stored fields |
//! | `<seg>.lens` | per-field token counts |
//! | `<seg>_<delgen>.del` | deletion bitmap |
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use strata::document::{Document, Store};
//! use strata::index::{Directory, IndexReader, IndexWriter, IndexWriterConfig, Term};
//! use strata::storage::memory::MemoryStorage;
//!
//! # fn main() -> strata::error::Result<()> {
//! let directory = Directory::new(Arc::new(MemoryStorage::default()));
//! let writer = IndexWriter::open(&directory, IndexWriterConfig::default())?;
//! writer.add_document(
//!     Document::builder()
//!         .add_keyword("isbn", "1930110995", Store::Yes)
//!         .add_text("title", "Lucene in Action", Store::Yes)
//!         .build(),
//! )?;
//! writer.commit()?;
//!
//! let reader = IndexReader::open(&directory)?;
//! assert_eq!(reader.num_docs(), 1);
//! assert_eq!(reader.doc_freq("title", "lucene"), 1);
//!
//! writer.delete_documents(&Term::new("isbn", "1930110995"))?;
//! writer.close()?;
//! assert_eq!(reader.reopen()?.num_docs(), 0);
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod commit;
pub mod config;
pub mod deletes;
pub mod dictionary;
pub mod directory;
pub mod merge;
pub mod merge_policy;
pub mod posting;
pub mod reader;
pub mod segment;
pub mod segment_reader;
pub mod segment_writer;
pub mod term;
pub mod writer;

pub use commit::CommitPoint;
pub use config::{IndexWriterConfig, OpenMode, PositionGaps};
pub use directory::Directory;
pub use merge_policy::{LogMergePolicy, MergePolicy, NoMergePolicy};
pub use reader::IndexReader;
pub use segment::SegmentInfo;
pub use term::Term;
pub use writer::IndexWriter;
