//! The single writer of an index.
//!
//! The writer owns the index's write lock for its whole lifetime. Added
//! documents are analyzed and buffered, flushed into new segments, and made
//! durable and visible to [`IndexReader::open`] only by [`IndexWriter::commit`].
//! Deletions are resolved immediately against flushed segments by marking a
//! copy-on-write deletion bitmap; readers holding the previous bitmap are
//! unaffected.
//!
//! Writer state sits behind a mutex so that near-real-time readers obtained
//! from [`IndexWriter::get_reader`] can reopen through it.

use std::collections::BTreeSet;
use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use chrono::Utc;
use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::document::Document;
use crate::error::{Result, StrataError};
use crate::index::commit::{
    CommitPoint, SEGMENTS_GEN, WRITE_LOCK, generation_of_file,
};
use crate::index::config::{IndexWriterConfig, OpenMode};
use crate::index::deletes::DeletionBitmap;
use crate::index::directory::Directory;
use crate::index::merge::{MergeSource, merge_segments};
use crate::index::reader::{IndexReader, ReaderSource, SegmentView};
use crate::index::segment::{SegmentInfo, core_file_names, segment_name, segment_of_file};
use crate::index::segment_reader::SegmentReader;
use crate::index::segment_writer::{DocumentAnalyzer, SegmentWriter};
use crate::index::term::Term;
use crate::search::{IndexSearcher, Query};
use crate::storage::StorageLock;

/// A flushed segment as the writer sees it.
#[derive(Debug, Clone)]
struct SegmentState {
    /// Commit entry; `del_gen`/`del_count` describe the last written deletions.
    info: SegmentInfo,
    reader: Arc<SegmentReader>,
    deletes: Option<Arc<DeletionBitmap>>,
    /// Deletions changed since they were last written.
    deletes_dirty: bool,
}

impl SegmentState {
    fn open(directory: &Directory, info: &SegmentInfo) -> Result<Self> {
        let reader = directory.open_segment(info)?;
        let deletes = match info.deletes_file() {
            Some(file) => Some(Arc::new(DeletionBitmap::read(
                directory.storage().as_ref(),
                &file,
                info.doc_count,
            )?)),
            None => None,
        };
        Ok(SegmentState {
            info: info.clone(),
            reader,
            deletes,
            deletes_dirty: false,
        })
    }

    fn fresh(info: SegmentInfo, reader: Arc<SegmentReader>) -> Self {
        SegmentState {
            info,
            reader,
            deletes: None,
            deletes_dirty: false,
        }
    }

    fn deleted_count(&self) -> u32 {
        self.deletes.as_ref().map_or(0, |d| d.deleted_count())
    }

    fn live_docs(&self) -> u32 {
        self.info.doc_count - self.deleted_count()
    }

    /// The commit entry with in-memory deletions counted.
    fn current_info(&self) -> SegmentInfo {
        SegmentInfo {
            del_count: self.deleted_count(),
            ..self.info.clone()
        }
    }

    fn delete(&mut self, doc_id: u32) -> Result<bool> {
        let doc_count = self.info.doc_count;
        let bitmap = Arc::make_mut(
            self.deletes
                .get_or_insert_with(|| Arc::new(DeletionBitmap::new(doc_count))),
        );
        let deleted = bitmap.delete(doc_id)?;
        self.deletes_dirty |= deleted;
        Ok(deleted)
    }

    fn view(&self) -> SegmentView {
        SegmentView::new(self.current_info(), self.reader.clone(), self.deletes.clone())
    }

    fn merge_source(&self) -> MergeSource {
        MergeSource {
            reader: self.reader.clone(),
            deletes: self.deletes.clone(),
        }
    }
}

/// Mutable writer state, shared with near-real-time readers.
#[derive(Debug)]
pub struct WriterInner {
    directory: Directory,
    config: IndexWriterConfig,
    analyzer: DocumentAnalyzer,
    lock: Option<Box<dyn StorageLock>>,
    buffer: SegmentWriter,
    segments: Vec<SegmentState>,
    /// Next segment-name counter; never reused within an index.
    counter: u64,
    last_commit: CommitPoint,
    /// Bumped by every change; near-real-time readers compare against it.
    version: u64,
    /// Changes not yet committed.
    dirty: bool,
    closed: bool,
}

impl WriterInner {
    pub(crate) fn is_open(&self) -> bool {
        !self.closed
    }

    pub(crate) fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn buffered_docs(&self) -> usize {
        self.buffer.len()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(StrataError::index("IndexWriter is closed"))
        } else {
            Ok(())
        }
    }

    fn touch(&mut self) {
        self.version += 1;
        self.dirty = true;
    }

    fn next_segment_name(&mut self) -> String {
        let name = segment_name(&self.config.segment_prefix, self.counter);
        self.counter += 1;
        name
    }

    fn add_document(&mut self, doc: &Document) -> Result<()> {
        self.ensure_open()?;
        let analyzed = self.analyzer.analyze(doc)?;
        self.buffer.add_document(analyzed);
        self.touch();
        self.maybe_flush_buffer()
    }

    /// Flush once the buffer reaches its document or memory limit.
    fn maybe_flush_buffer(&mut self) -> Result<()> {
        if self.buffer.len() >= self.config.max_buffered_docs.max(1)
            || self.buffer.ram_bytes_used() >= self.config.max_buffer_memory
        {
            self.flush()?;
        }
        Ok(())
    }

    fn delete_term(&mut self, term: &Term) -> Result<u32> {
        self.ensure_open()?;
        let mut deleted = self.buffer.delete_term(term) as u32;

        for state in &mut self.segments {
            let Some(postings) = state.reader.term_postings(&term.field, &term.text)? else {
                continue;
            };
            for posting in postings.iter() {
                if state.delete(posting.doc_id)? {
                    deleted += 1;
                }
            }
        }

        self.touch();
        debug!("deleted {deleted} documents matching {term}");
        Ok(deleted)
    }

    fn delete_query(&mut self, query: &Query) -> Result<u32> {
        self.ensure_open()?;
        self.flush()?;

        let snapshot = Arc::new(self.snapshot(ReaderSource::Commit));
        let matches = IndexSearcher::new(snapshot).matching_segment_docs(query)?;

        let mut deleted = 0;
        for (state, docs) in self.segments.iter_mut().zip(matches) {
            for doc in docs {
                if state.delete(doc)? {
                    deleted += 1;
                }
            }
        }

        self.touch();
        debug!("deleted {deleted} documents matching {query}");
        Ok(deleted)
    }

    /// Write the buffer as a new segment, then apply the merge policy.
    fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let name = self.next_segment_name();
        let storage = self.directory.storage().clone();
        if let Some(info) = self.buffer.flush(storage.as_ref(), &name)? {
            debug!("flushed segment {} with {} docs", info.name, info.doc_count);
            let reader = self.directory.open_segment(&info)?;
            self.segments.push(SegmentState::fresh(info, reader));
            self.version += 1;
        }

        self.maybe_merge()
    }

    fn maybe_merge(&mut self) -> Result<()> {
        let infos: Vec<SegmentInfo> = self.segments.iter().map(SegmentState::current_info).collect();
        let merges = self.config.merge_policy.find_merges(&infos);

        // Back to front so earlier ranges stay valid.
        for range in merges.into_iter().rev() {
            if range.end > self.segments.len() || range.len() < 2 {
                continue;
            }
            self.merge_range(range.start, range.end)?;
        }
        Ok(())
    }

    /// Replace `segments[start..end]` with one merged segment.
    fn merge_range(&mut self, start: usize, end: usize) -> Result<()> {
        let sources: Vec<MergeSource> = self.segments[start..end]
            .iter()
            .map(SegmentState::merge_source)
            .collect();
        let live: u32 = self.segments[start..end].iter().map(SegmentState::live_docs).sum();

        if live == 0 {
            self.segments.drain(start..end);
        } else {
            let name = self.next_segment_name();
            let info = merge_segments(self.directory.storage().as_ref(), &name, &sources)?;
            let reader = self.directory.open_segment(&info)?;
            self.segments
                .splice(start..end, [SegmentState::fresh(info, reader)]);
        }

        self.touch();
        Ok(())
    }

    fn optimize(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.flush()?;

        let needs_merge =
            self.segments.len() > 1 || self.segments.iter().any(|s| s.deleted_count() > 0);
        if needs_merge {
            let count = self.segments.len();
            self.merge_range(0, count)?;
            info!(
                "optimized {count} segments into {} ({} docs)",
                self.segments.len(),
                self.segments.iter().map(SegmentState::live_docs).sum::<u32>()
            );
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.ensure_open()?;
        if !self.dirty && self.buffer.is_empty() {
            debug!("nothing to commit since generation {}", self.last_commit.generation);
            return Ok(());
        }
        self.flush()?;

        let storage = self.directory.storage().clone();
        for state in &mut self.segments {
            if !state.deletes_dirty {
                continue;
            }
            if let Some(bitmap) = &state.deletes {
                let mut info = state.current_info();
                info.del_gen += 1;
                let file = info.deletes_file().unwrap_or_default();
                bitmap.write(storage.as_ref(), &file)?;
                state.info = info;
            }
            state.deletes_dirty = false;
        }

        let commit = CommitPoint {
            generation: CommitPoint::next_generation(storage.as_ref(), self.last_commit.generation)?,
            counter: self.counter,
            segments: self.segments.iter().map(|s| s.info.clone()).collect(),
            timestamp: Utc::now(),
        };
        commit.write(storage.as_ref())?;
        commit.publish(storage.as_ref())?;

        info!(
            "committed generation {} ({} segments, {} docs)",
            commit.generation,
            commit.segments.len(),
            commit.num_docs()
        );
        self.last_commit = commit;
        self.dirty = false;
        self.version += 1;

        if let Err(e) = self.delete_unreferenced_files() {
            warn!("could not remove obsolete files: {e}");
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.buffer.clear();

        let mut segments = Vec::with_capacity(self.last_commit.segments.len());
        for info in &self.last_commit.segments {
            segments.push(SegmentState::open(&self.directory, info)?);
        }
        self.segments = segments;
        self.counter = self.counter.max(self.last_commit.counter);
        self.dirty = false;
        self.version += 1;

        info!("rolled back to generation {}", self.last_commit.generation);
        self.delete_unreferenced_files()
    }

    /// Remove files that neither the last commit nor the writer references.
    ///
    /// Segment files still held by an open reader are handed to the segment
    /// pool, which deletes them once the last holder is gone.
    fn delete_unreferenced_files(&self) -> Result<()> {
        let storage = self.directory.storage();
        let mut keep: AHashSet<String> = self.last_commit.files().into_iter().collect();
        keep.insert(SEGMENTS_GEN.to_string());
        keep.insert(WRITE_LOCK.to_string());
        let mut live_segments: AHashSet<&str> =
            self.last_commit.segments.iter().map(|s| s.name.as_str()).collect();
        for state in &self.segments {
            keep.extend(state.info.files());
            live_segments.insert(state.info.name.as_str());
        }

        let mut retired: AHashMap<String, BTreeSet<String>> = AHashMap::new();
        for file in storage.list_files()? {
            if keep.contains(&file) {
                continue;
            }
            match segment_of_file(&file) {
                Some(segment) if !live_segments.contains(segment) => {
                    retired
                        .entry(segment.to_string())
                        .or_default()
                        .insert(file.clone());
                }
                Some(_) => storage.delete_file(&file)?,
                None if generation_of_file(&file).is_some() || file.ends_with(".tmp") => {
                    storage.delete_file(&file)?
                }
                None => {}
            }
        }

        for (segment, files) in retired {
            let mut files: Vec<String> = files.into_iter().collect();
            for core in core_file_names(&segment) {
                if !files.contains(&core) && storage.file_exists(&core) {
                    files.push(core);
                }
            }
            self.directory.pool().retire(&segment, files);
        }
        Ok(())
    }

    fn snapshot(&self, source: ReaderSource) -> IndexReader {
        IndexReader::new(
            self.directory.clone(),
            self.segments.iter().map(SegmentState::view).collect(),
            self.last_commit.generation,
            source,
        )
    }

    /// Flush and snapshot the writer's current segments.
    pub(crate) fn near_real_time_reader(&mut self, handle: &Arc<Mutex<WriterInner>>) -> Result<IndexReader> {
        self.ensure_open()?;
        self.flush()?;
        Ok(self.snapshot(ReaderSource::NearRealTime {
            writer: Arc::downgrade(handle),
            version: self.version,
        }))
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.commit()?;
        self.closed = true;
        if let Some(mut lock) = self.lock.take() {
            lock.release()?;
        }
        info!("closed index writer");
        Ok(())
    }
}

/// Adds, updates and deletes documents of one index.
///
/// At most one writer may be open on an index; a second
/// [`IndexWriter::open`] fails with [`StrataError::LockHeld`] instead of
/// waiting.
#[derive(Debug)]
pub struct IndexWriter {
    inner: Arc<Mutex<WriterInner>>,
}

impl IndexWriter {
    /// Open a writer, taking the index's write lock.
    pub fn open(directory: &Directory, config: IndexWriterConfig) -> Result<Self> {
        let storage = directory.storage().clone();
        let lock = storage
            .try_acquire_lock(WRITE_LOCK)?
            .ok_or_else(|| StrataError::lock_held(format!("{WRITE_LOCK} is held by another writer")))?;

        let create = match config.open_mode {
            OpenMode::Create => true,
            OpenMode::Append => false,
            OpenMode::CreateOrAppend => !directory.index_exists(),
        };

        let (last_commit, segments) = if create {
            // Carry the old counter forward so segment names are never reused.
            let previous = CommitPoint::read_current(storage.as_ref()).ok();
            let last = previous.as_ref().map_or(0, |c| c.generation);
            let commit = CommitPoint {
                generation: CommitPoint::next_generation(storage.as_ref(), last)?,
                counter: previous.as_ref().map_or(0, |c| c.counter),
                segments: Vec::new(),
                timestamp: Utc::now(),
            };
            commit.write(storage.as_ref())?;
            commit.publish(storage.as_ref())?;
            info!("created index at generation {}", commit.generation);
            (commit, Vec::new())
        } else {
            let commit = CommitPoint::read_current(storage.as_ref())?;
            let mut segments = Vec::with_capacity(commit.segments.len());
            for info in &commit.segments {
                segments.push(SegmentState::open(directory, info)?);
            }
            debug!(
                "opened index at generation {} ({} segments)",
                commit.generation,
                segments.len()
            );
            (commit, segments)
        };

        let inner = WriterInner {
            directory: directory.clone(),
            analyzer: DocumentAnalyzer::new(&config),
            buffer: SegmentWriter::new(config.store_offsets),
            counter: last_commit.counter,
            config,
            lock: Some(lock),
            segments,
            last_commit,
            version: 0,
            dirty: false,
            closed: false,
        };
        inner.delete_unreferenced_files()?;

        Ok(IndexWriter {
            inner: Arc::new(Mutex::new(inner)),
        })
    }

    /// Analyze and buffer a document.
    ///
    /// Analysis completes before the buffer is touched, so a failure leaves
    /// the writer unchanged.
    pub fn add_document(&self, doc: Document) -> Result<()> {
        self.inner.lock().add_document(&doc)
    }

    /// Delete every document containing `term`, then add `doc`.
    pub fn update_document(&self, term: &Term, doc: Document) -> Result<()> {
        let mut inner = self.inner.lock();
        // Analyze first so a bad document leaves the old one in place.
        let analyzed = inner.analyzer.analyze(&doc)?;
        inner.delete_term(term)?;
        inner.buffer.add_document(analyzed);
        inner.touch();
        inner.maybe_flush_buffer()
    }

    /// Delete every document containing `term`; returns how many were live.
    pub fn delete_documents(&self, term: &Term) -> Result<u32> {
        self.inner.lock().delete_term(term)
    }

    /// Delete every live document matching `query`.
    pub fn delete_documents_by_query(&self, query: &Query) -> Result<u32> {
        self.inner.lock().delete_query(query)
    }

    /// Flush buffered documents into a new segment without committing.
    pub fn flush(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.ensure_open()?;
        inner.flush()
    }

    /// Make all changes durable and visible to newly opened readers.
    pub fn commit(&self) -> Result<()> {
        self.inner.lock().commit()
    }

    /// Merge all segments into one, dropping deleted documents.
    pub fn optimize(&self) -> Result<()> {
        self.inner.lock().optimize()
    }

    /// Apply the merge policy to the current segments.
    pub fn maybe_merge(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.ensure_open()?;
        inner.maybe_merge()
    }

    /// Discard every change since the last commit. The writer stays open.
    pub fn rollback(&self) -> Result<()> {
        self.inner.lock().rollback()
    }

    /// Whether any flushed document is marked deleted.
    pub fn has_deletions(&self) -> bool {
        self.inner
            .lock()
            .segments
            .iter()
            .any(|s| s.deleted_count() > 0)
    }

    /// Live documents, buffered ones included.
    pub fn num_docs(&self) -> u32 {
        let inner = self.inner.lock();
        inner.segments.iter().map(SegmentState::live_docs).sum::<u32>() + inner.buffer.len() as u32
    }

    /// All documents, deleted and buffered ones included.
    pub fn max_doc(&self) -> u32 {
        let inner = self.inner.lock();
        inner.segments.iter().map(|s| s.info.doc_count).sum::<u32>() + inner.buffer.len() as u32
    }

    pub fn segment_count(&self) -> usize {
        self.inner.lock().segments.len()
    }

    /// Whether there are changes not yet committed.
    pub fn has_uncommitted_changes(&self) -> bool {
        self.inner.lock().dirty
    }

    /// A near-real-time reader over everything added so far, committed or not.
    pub fn get_reader(&self) -> Result<Arc<IndexReader>> {
        let mut inner = self.inner.lock();
        inner.near_real_time_reader(&self.inner).map(Arc::new)
    }

    /// Commit pending changes and release the write lock.
    pub fn close(self) -> Result<()> {
        self.inner.lock().close()
    }
}

impl Drop for IndexWriter {
    fn drop(&mut self) {
        if let Err(e) = self.inner.lock().close() {
            warn!("failed to close index writer on drop: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::WhitespaceAnalyzer;
    use crate::document::{Field, Store};
    use crate::index::merge_policy::{LogMergePolicy, NoMergePolicy};
    use crate::storage::memory::MemoryStorage;

    fn directory() -> Directory {
        Directory::new(Arc::new(MemoryStorage::default()))
    }

    fn config() -> IndexWriterConfig {
        IndexWriterConfig::new(Arc::new(WhitespaceAnalyzer::new())).with_open_mode(OpenMode::Create)
    }

    fn doc(id: &str, body: &str) -> Document {
        Document::builder()
            .add_keyword("id", id, Store::Yes)
            .add_text("body", body, Store::Yes)
            .build()
    }

    #[test]
    fn test_second_writer_fails_with_lock_held() {
        let directory = directory();
        let writer = IndexWriter::open(&directory, config()).unwrap();
        assert!(matches!(
            IndexWriter::open(&directory, config()),
            Err(StrataError::LockHeld(_))
        ));

        writer.close().unwrap();
        let second = IndexWriter::open(&directory, config().with_open_mode(OpenMode::Append)).unwrap();
        second.close().unwrap();
    }

    #[test]
    fn test_append_requires_index() {
        let directory = directory();
        let result = IndexWriter::open(&directory, config().with_open_mode(OpenMode::Append));
        assert!(matches!(result, Err(StrataError::IndexNotFound(_))));
        // The failed open released the lock.
        IndexWriter::open(&directory, config()).unwrap().close().unwrap();
    }

    #[test]
    fn test_counts_include_buffer() {
        let directory = directory();
        let writer = IndexWriter::open(&directory, config()).unwrap();
        writer.add_document(doc("1", "a b")).unwrap();
        writer.add_document(doc("2", "b c")).unwrap();
        assert_eq!(writer.num_docs(), 2);
        assert_eq!(writer.max_doc(), 2);
        assert!(writer.has_uncommitted_changes());

        writer.commit().unwrap();
        assert!(!writer.has_uncommitted_changes());
        assert_eq!(writer.delete_documents(&Term::new("body", "b")).unwrap(), 2);
        assert_eq!(writer.num_docs(), 0);
        assert_eq!(writer.max_doc(), 2);
        assert!(writer.has_deletions());

        writer.optimize().unwrap();
        assert_eq!(writer.max_doc(), 0);
        assert_eq!(writer.segment_count(), 0);
        writer.close().unwrap();
    }

    #[test]
    fn test_invalid_document_leaves_buffer_unchanged() {
        let directory = directory();
        let writer = IndexWriter::open(&directory, config()).unwrap();
        writer.add_document(doc("1", "a")).unwrap();

        let bad = Document::builder()
            .add_text("body", "fine", Store::No)
            .add_field(Field::text("", "nameless", Store::No))
            .build();
        assert!(writer.add_document(bad).is_err());
        assert_eq!(writer.num_docs(), 1);
        writer.close().unwrap();
    }

    #[test]
    fn test_rollback_discards_changes() {
        let directory = directory();
        let writer = IndexWriter::open(&directory, config()).unwrap();
        writer.add_document(doc("1", "a")).unwrap();
        writer.commit().unwrap();

        writer.add_document(doc("2", "b")).unwrap();
        writer.flush().unwrap();
        writer.delete_documents(&Term::new("id", "1")).unwrap();
        assert_eq!(writer.num_docs(), 1);

        writer.rollback().unwrap();
        assert_eq!(writer.num_docs(), 1);
        assert!(!writer.has_deletions());
        assert_eq!(directory.list_segment_files().unwrap().len(), 4);
        writer.close().unwrap();
    }

    #[test]
    fn test_commit_without_changes_keeps_generation() {
        let directory = directory();
        let storage = directory.storage().clone();
        let writer = IndexWriter::open(&directory, config()).unwrap();
        writer.add_document(doc("1", "a")).unwrap();
        writer.commit().unwrap();
        let generation = CommitPoint::current_generation(storage.as_ref()).unwrap();

        writer.commit().unwrap();
        writer.close().unwrap();
        assert_eq!(CommitPoint::current_generation(storage.as_ref()).unwrap(), generation);
        assert!(!storage.file_exists(&crate::index::commit::commit_file_name(generation + 1)));
    }

    #[test]
    fn test_commit_skips_leftover_generations() {
        let directory = directory();
        let storage = directory.storage().clone();
        IndexWriter::open(&directory, config()).unwrap().close().unwrap();
        let published = CommitPoint::read_current(storage.as_ref()).unwrap();

        // Written but never published.
        let leftover = CommitPoint {
            generation: published.generation + 1,
            ..CommitPoint::empty()
        };
        leftover.write(storage.as_ref()).unwrap();

        let writer = IndexWriter::open(&directory, config()).unwrap();
        assert_eq!(
            CommitPoint::current_generation(storage.as_ref()).unwrap(),
            leftover.generation + 1
        );
        assert!(!storage.file_exists(&leftover.file_name()));
        writer.close().unwrap();
    }

    #[test]
    fn test_update_flushes_on_memory_limit() {
        let directory = directory();
        let writer = IndexWriter::open(
            &directory,
            config()
                .with_max_buffer_memory(1)
                .with_merge_policy(Arc::new(NoMergePolicy)),
        )
        .unwrap();
        writer.update_document(&Term::new("id", "1"), doc("1", "a")).unwrap();
        assert_eq!(writer.segment_count(), 1);

        writer.update_document(&Term::new("id", "1"), doc("1", "b")).unwrap();
        assert_eq!(writer.segment_count(), 2);
        assert_eq!(writer.num_docs(), 1);
        writer.close().unwrap();
    }

    #[test]
    fn test_merge_policy_runs_after_flush() {
        let directory = directory();
        let writer = IndexWriter::open(
            &directory,
            config()
                .with_max_buffered_docs(1)
                .with_merge_policy(Arc::new(LogMergePolicy::new(3))),
        )
        .unwrap();
        for i in 0..3 {
            writer.add_document(doc(&i.to_string(), "x")).unwrap();
        }
        assert_eq!(writer.segment_count(), 1);
        assert_eq!(writer.num_docs(), 3);
        writer.close().unwrap();

        let files = directory.list_segment_files().unwrap();
        assert_eq!(files.len(), 4, "merged-away segments are removed: {files:?}");
    }

    #[test]
    fn test_drop_commits() {
        let directory = directory();
        {
            let writer = IndexWriter::open(
                &directory,
                config().with_merge_policy(Arc::new(NoMergePolicy)),
            )
            .unwrap();
            writer.add_document(doc("1", "a")).unwrap();
        }
        let reader = IndexReader::open(&directory).unwrap();
        assert_eq!(reader.num_docs(), 1);
        assert!(!directory.storage().file_exists(WRITE_LOCK));
    }
}
