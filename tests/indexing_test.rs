//! Writer lifecycle: adds, deletes, updates, merges and the write lock.

mod common;

use std::sync::Arc;

use strata::document::Field;
use strata::index::{LogMergePolicy, NoMergePolicy};
use strata::prelude::*;

fn config() -> IndexWriterConfig {
    IndexWriterConfig::new(Arc::new(StandardAnalyzer::new()))
}

fn doc(id: &str, city: &str) -> Document {
    Document::builder()
        .add_keyword("id", id, Store::Yes)
        .add_text("city", city, Store::Yes)
        .build()
}

fn hits(directory: &Directory, query: Query) -> Result<usize> {
    IndexSearcher::new(IndexReader::open(directory)?).count(&query)
}

#[test]
fn test_each_commit_adds_one_document() -> Result<()> {
    let directory = common::memory_directory();
    let writer = IndexWriter::open(&directory, config())?;

    for (i, city) in ["Amsterdam", "Venice", "Rome"].iter().enumerate() {
        writer.add_document(doc(&i.to_string(), city))?;
        writer.commit()?;

        let reader = IndexReader::open(&directory)?;
        assert_eq!(reader.num_docs(), i as u32 + 1);
        let searcher = IndexSearcher::new(reader);
        assert_eq!(searcher.count(&Query::term("id", i.to_string()))?, 1);
        assert_eq!(searcher.count(&Query::term("city", city.to_lowercase()))?, 1);
    }
    writer.close()
}

#[test]
fn test_delete_then_optimize() -> Result<()> {
    let directory = common::memory_directory();
    let writer = IndexWriter::open(&directory, config())?;
    writer.add_document(doc("1", "Amsterdam"))?;
    writer.add_document(doc("2", "Venice"))?;
    writer.commit()?;
    assert!(!writer.has_deletions());

    assert_eq!(writer.delete_documents(&Term::new("id", "1"))?, 1);
    assert_eq!(writer.delete_documents(&Term::new("id", "1"))?, 0);
    assert!(writer.has_deletions());
    writer.commit()?;

    let reader = IndexReader::open(&directory)?;
    assert_eq!(reader.num_docs(), 1);
    assert_eq!(reader.max_doc(), 2);
    assert!(reader.has_deletions());
    assert!(reader.is_deleted(0));
    assert!(reader.document(0).is_err());

    writer.optimize()?;
    assert_eq!(writer.max_doc(), 1);
    assert!(!writer.has_deletions());
    writer.commit()?;

    let reader = reader.reopen()?;
    assert_eq!(reader.max_doc(), reader.num_docs());
    assert_eq!(reader.segment_count(), 1);
    assert_eq!(reader.document(0)?.get("id"), Some("2"));
    writer.close()
}

#[test]
fn test_update_replaces_document() -> Result<()> {
    let directory = common::memory_directory();
    let writer = IndexWriter::open(&directory, config())?;
    writer.add_document(doc("1", "Den Haag"))?;
    writer.commit()?;

    writer.update_document(&Term::new("id", "1"), doc("1", "The Hague"))?;
    writer.commit()?;

    assert_eq!(hits(&directory, Query::term("city", "den"))?, 0);
    assert_eq!(hits(&directory, Query::term("city", "hague"))?, 1);
    assert_eq!(IndexReader::open(&directory)?.num_docs(), 1);

    // Buffered documents are replaced too.
    writer.add_document(doc("2", "Rome"))?;
    writer.update_document(&Term::new("id", "2"), doc("2", "Roma"))?;
    writer.commit()?;
    assert_eq!(hits(&directory, Query::term("city", "rome"))?, 0);
    assert_eq!(hits(&directory, Query::term("city", "roma"))?, 1);
    writer.close()
}

#[test]
fn test_delete_by_query() -> Result<()> {
    let directory = common::memory_directory();
    let writer = IndexWriter::open(&directory, config())?;
    for (id, city) in [("1", "Amsterdam"), ("2", "Rotterdam"), ("3", "Venice")] {
        writer.add_document(doc(id, city))?;
    }

    let query = strata::search::PrefixQuery::new("city", "r").into();
    assert_eq!(writer.delete_documents_by_query(&query)?, 1);
    writer.close()?;

    let reader = IndexReader::open(&directory)?;
    assert_eq!(reader.num_docs(), 2);
    Ok(())
}

#[test]
fn test_invalid_document_leaves_buffer_untouched() -> Result<()> {
    assert!(matches!(
        Field::int_from_str("pubmonth", "20x6", Store::Yes),
        Err(StrataError::InvalidFieldValue { .. })
    ));

    let directory = common::memory_directory();
    let writer = IndexWriter::open(&directory, config())?;
    writer.add_document(doc("1", "Amsterdam"))?;

    let bad = Document::builder()
        .add_keyword("id", "2", Store::Yes)
        .add_text("", "nameless", Store::No)
        .build();
    assert!(matches!(
        writer.add_document(bad),
        Err(StrataError::InvalidFieldValue { .. })
    ));
    assert_eq!(writer.num_docs(), 1);
    writer.close()
}

#[test]
fn test_write_lock() -> Result<()> {
    let directory = common::memory_directory();
    let first = IndexWriter::open(&directory, config())?;

    assert!(matches!(
        IndexWriter::open(&directory, config()),
        Err(StrataError::LockHeld(_))
    ));

    first.close()?;
    let second = IndexWriter::open(&directory, config().with_open_mode(OpenMode::Append))?;
    second.close()
}

#[test]
fn test_write_lock_on_disk() -> Result<()> {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let open = || {
        Directory::from_config(strata::storage::StorageConfig::File(
            strata::storage::file::FileStorageConfig::new(temp_dir.path()),
        ))
    };

    let first = IndexWriter::open(&open()?, config())?;
    assert!(temp_dir.path().join("write.lock").exists());
    assert!(matches!(
        IndexWriter::open(&open()?, config()),
        Err(StrataError::LockHeld(_))
    ));
    drop(first);
    assert!(!temp_dir.path().join("write.lock").exists());
    IndexWriter::open(&open()?, config())?.close()
}

#[test]
fn test_append_requires_existing_index() {
    let directory = common::memory_directory();
    assert!(matches!(
        IndexWriter::open(&directory, config().with_open_mode(OpenMode::Append)),
        Err(StrataError::IndexNotFound(_))
    ));
}

#[test]
fn test_rollback_discards_uncommitted_changes() -> Result<()> {
    let directory = common::memory_directory();
    let writer = IndexWriter::open(&directory, config())?;
    writer.add_document(doc("1", "Amsterdam"))?;
    writer.commit()?;

    writer.add_document(doc("2", "Venice"))?;
    writer.flush()?;
    writer.delete_documents(&Term::new("id", "1"))?;
    assert!(writer.has_uncommitted_changes());

    writer.rollback()?;
    assert!(!writer.has_uncommitted_changes());
    assert_eq!(writer.num_docs(), 1);
    assert!(!writer.has_deletions());

    writer.close()?;
    assert_eq!(IndexReader::open(&directory)?.num_docs(), 1);
    Ok(())
}

#[test]
fn test_merge_policy_bounds_segment_count() -> Result<()> {
    let directory = common::memory_directory();
    let writer = IndexWriter::open(
        &directory,
        config()
            .with_max_buffered_docs(1)
            .with_merge_policy(Arc::new(LogMergePolicy::new(3))),
    )?;
    for i in 0..9 {
        writer.add_document(doc(&i.to_string(), "Amsterdam"))?;
    }
    assert!(writer.segment_count() < 9);
    writer.close()?;

    let reader = IndexReader::open(&directory)?;
    assert_eq!(reader.num_docs(), 9);
    let ids: Vec<String> = (0..9)
        .map(|doc| Ok(reader.document(doc)?.get("id").unwrap_or_default().to_string()))
        .collect::<Result<_>>()?;
    assert_eq!(ids, (0..9).map(|i| i.to_string()).collect::<Vec<_>>());

    let unmerged = common::memory_directory();
    let writer = IndexWriter::open(
        &unmerged,
        config()
            .with_max_buffered_docs(1)
            .with_merge_policy(Arc::new(NoMergePolicy)),
    )?;
    for i in 0..5 {
        writer.add_document(doc(&i.to_string(), "Venice"))?;
    }
    assert_eq!(writer.segment_count(), 5);
    writer.close()
}
