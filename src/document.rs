//! Documents and fields.
//!
//! A [`Document`] is an ordered list of [`Field`]s. A field name may repeat;
//! every instance of an indexed field feeds the same postings, with a position
//! gap between instances so phrases never span two values.
//!
//! ```
//! use strata::document::{Document, Store};
//!
//! let doc = Document::builder()
//!     .add_keyword("isbn", "1932394850", Store::Yes)
//!     .add_text("title", "Lucene in Action", Store::Yes)
//!     .add_text("author", "Otis Gospodnetic", Store::Yes)
//!     .add_text("author", "Erik Hatcher", Store::Yes)
//!     .add_int("pubmonth", 200406, Store::Yes)
//!     .build();
//!
//! assert_eq!(doc.len(), 5);
//! assert_eq!(doc.get_all("author").count(), 2);
//! ```

pub mod document;
pub mod field;

pub use document::{Document, DocumentBuilder, StoredDocument};
pub use field::{Field, FieldKind, Store, StoredValue};
