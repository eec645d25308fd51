//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use strata::analysis::{Analyzer, KeywordAnalyzer, PerFieldAnalyzer, StandardAnalyzer};
use strata::prelude::*;
use strata::storage::memory::MemoryStorage;

pub struct Book {
    pub isbn: &'static str,
    pub title: &'static str,
    pub authors: &'static [&'static str],
    pub subject: &'static str,
    pub pubmonth: i64,
    pub category: &'static str,
}

pub const BOOKS: &[Book] = &[
    Book {
        isbn: "9781933988177",
        title: "Lucene in Action, Second Edition",
        authors: &["Michael McCandless", "Erik Hatcher", "Otis Gospodnetic"],
        subject: "lucene search java",
        pubmonth: 201005,
        category: "/technology/computers/programming",
    },
    Book {
        isbn: "9781935182023",
        title: "JUnit in Action, Second Edition",
        authors: &["Petar Tahchiev", "Felipe Leme", "Vincent Massol", "Gary Gregory"],
        subject: "junit unit testing mock objects",
        pubmonth: 201005,
        category: "/technology/computers/programming",
    },
    Book {
        isbn: "9781932394801",
        title: "Ant in Action",
        authors: &["Steve Loughran", "Erik Hatcher"],
        subject: "apache ant build tool junit java development",
        pubmonth: 200707,
        category: "/technology/computers/programming",
    },
    Book {
        isbn: "9780974514017",
        title: "Pragmatic Unit Testing in Java with JUnit",
        authors: &["Andy Hunt", "Dave Thomas"],
        subject: "junit unit testing java",
        pubmonth: 200403,
        category: "/technology/computers/programming",
    },
    Book {
        isbn: "9781932394115",
        title: "Tapestry in Action",
        authors: &["Howard Lewis Ship"],
        subject: "tapestry web user interface components",
        pubmonth: 200403,
        category: "/technology/computers/programming",
    },
    Book {
        isbn: "9780321278654",
        title: "Extreme Programming Explained",
        authors: &["Kent Beck"],
        subject: "extreme programming agile test driven development methodology",
        pubmonth: 200411,
        category: "/technology/computers/programming/methodology",
    },
    Book {
        isbn: "9780465026562",
        title: "Gödel, Escher, Bach",
        authors: &["Douglas Hofstadter"],
        subject: "artificial intelligence number theory mathematics music",
        pubmonth: 199905,
        category: "/technology/computers/ai",
    },
    Book {
        isbn: "9780465046744",
        title: "Mindstorms: Children, Computers, And Powerful Ideas",
        authors: &["Seymour Papert"],
        subject: "children computers powerful ideas logo education",
        pubmonth: 199307,
        category: "/education/pedagogy",
    },
    Book {
        isbn: "9780936185514",
        title: "Imperial Secrets of Health and Longevity",
        authors: &["Bob Flaws"],
        subject: "diet chinese medicine qi gong health herbs",
        pubmonth: 199903,
        category: "/health/alternative/chinese",
    },
    Book {
        isbn: "9780060812454",
        title: "Tao Te Ching",
        authors: &["Stephen Mitchell"],
        subject: "taoism",
        pubmonth: 200609,
        category: "/philosophy/eastern",
    },
];

/// Keyword fields are matched verbatim; everything else is standard-analyzed.
pub fn analyzer() -> Arc<dyn Analyzer> {
    let keyword: Arc<dyn Analyzer> = Arc::new(KeywordAnalyzer::new());
    Arc::new(
        PerFieldAnalyzer::new(Arc::new(StandardAnalyzer::new()))
            .with_analyzer("isbn", keyword.clone())
            .with_analyzer("title2", keyword.clone())
            .with_analyzer("category", keyword),
    )
}

pub fn book_document(book: &Book) -> Document {
    let mut builder = Document::builder()
        .add_keyword("isbn", book.isbn, Store::Yes)
        .add_keyword("category", book.category, Store::Yes)
        .add_text("title", book.title, Store::Yes)
        .add_keyword("title2", book.title.to_lowercase(), Store::No)
        .add_text("subject", book.subject, Store::Yes)
        .add_int("pubmonth", book.pubmonth, Store::Yes)
        .add_text("contents", book.title, Store::No)
        .add_text("contents", book.subject, Store::No);
    for author in book.authors {
        builder = builder
            .add_text("author", *author, Store::Yes)
            .add_text("contents", *author, Store::No);
    }
    builder.build()
}

pub fn memory_directory() -> Directory {
    Directory::new(Arc::new(MemoryStorage::default()))
}

/// The book corpus committed into `directory`.
pub fn index_books(directory: &Directory) -> Result<()> {
    let writer = IndexWriter::open(directory, IndexWriterConfig::new(analyzer()))?;
    for book in BOOKS {
        writer.add_document(book_document(book))?;
    }
    writer.close()
}

pub fn book_searcher() -> Result<IndexSearcher> {
    let directory = memory_directory();
    index_books(&directory)?;
    Ok(IndexSearcher::new(IndexReader::open(&directory)?))
}

pub fn titles(searcher: &IndexSearcher, top: &TopDocs) -> Result<Vec<String>> {
    top.docs()
        .map(|doc| {
            let stored = searcher.doc(doc)?;
            Ok(stored.get("title").unwrap_or_default().to_string())
        })
        .collect()
}
