//! Commit points: atomic publication, corruption detection and file cleanup.

mod common;

use std::sync::Arc;

use chrono::Utc;
use strata::index::commit::{CommitPoint, SEGMENTS_GEN};
use strata::index::SegmentInfo;
use strata::prelude::*;
use strata::storage::Storage;
use strata::storage::memory::MemoryStorage;

fn config() -> IndexWriterConfig {
    IndexWriterConfig::new(Arc::new(StandardAnalyzer::new()))
}

fn doc(id: &str) -> Document {
    Document::builder()
        .add_keyword("id", id, Store::Yes)
        .add_text("body", format!("document number {id}"), Store::No)
        .build()
}

fn storage_and_directory() -> (Arc<MemoryStorage>, Directory) {
    let storage = Arc::new(MemoryStorage::default());
    let directory = Directory::new(storage.clone());
    (storage, directory)
}

#[test]
fn test_unpublished_commit_is_invisible() -> Result<()> {
    let (storage, directory) = storage_and_directory();
    let writer = IndexWriter::open(&directory, config())?;
    writer.add_document(doc("1"))?;
    writer.close()?;

    let published = CommitPoint::read_current(storage.as_ref())?;

    // A commit written but never published, as after a crash mid-commit.
    let orphan = CommitPoint {
        generation: published.generation + 1,
        counter: published.counter + 1,
        segments: vec![SegmentInfo::new("segment_999999", 5, false)],
        timestamp: Utc::now(),
    };
    orphan.write(storage.as_ref())?;
    storage.replace_file("segments.gen.tmp", b"partial".to_vec());

    let reader = IndexReader::open(&directory)?;
    assert_eq!(reader.generation(), published.generation);
    assert_eq!(reader.num_docs(), 1);

    // The next writer clears the leftovers.
    IndexWriter::open(&directory, config())?.close()?;
    assert!(!storage.file_exists(&orphan.file_name()));
    assert!(!storage.file_exists("segments.gen.tmp"));
    assert_eq!(IndexReader::open(&directory)?.num_docs(), 1);
    Ok(())
}

#[test]
fn test_corrupt_segment_is_detected() -> Result<()> {
    let (storage, directory) = storage_and_directory();
    let writer = IndexWriter::open(&directory, config())?;
    writer.add_document(doc("1"))?;
    writer.add_document(doc("2"))?;
    writer.close()?;

    let postings = directory
        .list_segment_files()?
        .into_iter()
        .find(|file| file.ends_with(".post"))
        .unwrap();
    let mut data = storage.read_file(&postings)?;
    let middle = data.len() / 2;
    data[middle] ^= 0xFF;
    storage.replace_file(&postings, data);

    let fresh = Directory::new(storage.clone());
    assert!(matches!(
        IndexReader::open(&fresh),
        Err(StrataError::CorruptSegment(_))
    ));
    Ok(())
}

#[test]
fn test_corrupt_commit_is_detected() -> Result<()> {
    let (storage, directory) = storage_and_directory();
    IndexWriter::open(&directory, config())?.close()?;

    let commit = CommitPoint::read_current(storage.as_ref())?;
    let mut data = storage.read_file(&commit.file_name())?;
    data.truncate(data.len() - 1);
    storage.replace_file(&commit.file_name(), data);

    assert!(matches!(
        IndexReader::open(&directory),
        Err(StrataError::CorruptSegment(_))
    ));

    storage.replace_file(SEGMENTS_GEN, b"garbage".to_vec());
    assert!(matches!(
        IndexReader::open(&directory),
        Err(StrataError::CorruptSegment(_))
    ));
    Ok(())
}

#[test]
fn test_merged_segments_wait_for_readers() -> Result<()> {
    let (_storage, directory) = storage_and_directory();
    let writer = IndexWriter::open(&directory, config().with_max_buffered_docs(1))?;
    for id in ["1", "2", "3"] {
        writer.add_document(doc(id))?;
    }
    writer.commit()?;

    let reader = IndexReader::open(&directory)?;
    assert_eq!(reader.segment_count(), 3);
    let before = directory.list_segment_files()?;

    writer.optimize()?;
    writer.commit()?;

    // The old reader still works on the replaced segments.
    assert_eq!(reader.document(2)?.get("id"), Some("3"));
    let during = directory.list_segment_files()?;
    assert!(before.iter().all(|file| during.contains(file)));

    drop(reader);
    let after = directory.list_segment_files()?;
    assert!(before.iter().all(|file| !after.contains(file)));
    assert_eq!(IndexReader::open(&directory)?.segment_count(), 1);
    writer.close()
}

#[test]
fn test_create_mode_starts_empty_without_reusing_names() -> Result<()> {
    let (_storage, directory) = storage_and_directory();
    let writer = IndexWriter::open(&directory, config())?;
    writer.add_document(doc("1"))?;
    writer.close()?;
    let old_files = directory.list_segment_files()?;

    let writer = IndexWriter::open(&directory, config().with_open_mode(OpenMode::Create))?;
    assert_eq!(writer.num_docs(), 0);
    writer.add_document(doc("2"))?;
    writer.close()?;

    let reader = IndexReader::open(&directory)?;
    assert_eq!(reader.num_docs(), 1);
    assert_eq!(reader.document(0)?.get("id"), Some("2"));
    let new_files = directory.list_segment_files()?;
    assert!(new_files.iter().all(|file| !old_files.contains(file)));
    Ok(())
}

#[test]
fn test_drop_commits_pending_changes() -> Result<()> {
    let (_storage, directory) = storage_and_directory();
    {
        let writer = IndexWriter::open(&directory, config())?;
        writer.add_document(doc("1"))?;
    }
    assert_eq!(IndexReader::open(&directory)?.num_docs(), 1);
    IndexWriter::open(&directory, config())?.close()
}
