//! Point-in-time views over a set of segments.
//!
//! An [`IndexReader`] is an immutable snapshot: either of a published commit
//! or, for near-real-time readers, of the writer's current segments. Readers
//! are used as `Arc<IndexReader>`; [`IndexReader::reopen`] hands back the same
//! `Arc` when nothing changed and otherwise builds a new snapshot that shares
//! every unchanged segment and deletion bitmap with the old one.

use std::sync::{Arc, Weak};

use ahash::AHashMap;
use log::debug;
use parking_lot::Mutex;

use crate::document::StoredDocument;
use crate::error::{Result, StrataError};
use crate::index::commit::{CommitPoint, open_current};
use crate::index::deletes::DeletionBitmap;
use crate::index::directory::Directory;
use crate::index::segment::SegmentInfo;
use crate::index::segment_reader::SegmentReader;
use crate::index::writer::WriterInner;

/// One segment as seen by a reader: the shared core plus a deletion snapshot.
#[derive(Debug, Clone)]
pub struct SegmentView {
    info: SegmentInfo,
    reader: Arc<SegmentReader>,
    deletes: Option<Arc<DeletionBitmap>>,
}

impl SegmentView {
    pub(crate) fn new(
        info: SegmentInfo,
        reader: Arc<SegmentReader>,
        deletes: Option<Arc<DeletionBitmap>>,
    ) -> Self {
        SegmentView {
            info,
            reader,
            deletes,
        }
    }

    /// Open a segment of a commit, reusing `previous` when it is unchanged.
    ///
    /// Deletions of `previous` are reused only when they were read from the
    /// same committed `.del` generation; otherwise they are read again.
    fn open(
        directory: &Directory,
        info: &SegmentInfo,
        previous: Option<&SegmentView>,
        committed_deletes: bool,
    ) -> Result<Self> {
        if let Some(previous) = previous
            && committed_deletes
            && previous.info.del_gen == info.del_gen
        {
            return Ok(SegmentView {
                info: info.clone(),
                ..previous.clone()
            });
        }

        let reader = match previous {
            Some(previous) => previous.reader.clone(),
            None => directory.open_segment(info)?,
        };
        let deletes = match info.deletes_file() {
            Some(file) => Some(Arc::new(DeletionBitmap::read(
                directory.storage().as_ref(),
                &file,
                info.doc_count,
            )?)),
            None => None,
        };
        Ok(SegmentView::new(info.clone(), reader, deletes))
    }

    pub fn info(&self) -> &SegmentInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        self.reader.name()
    }

    pub fn reader(&self) -> &Arc<SegmentReader> {
        &self.reader
    }

    pub fn deletes(&self) -> Option<&Arc<DeletionBitmap>> {
        self.deletes.as_ref()
    }

    pub fn max_doc(&self) -> u32 {
        self.reader.doc_count()
    }

    pub fn deleted_count(&self) -> u32 {
        self.deletes.as_ref().map_or(0, |d| d.deleted_count())
    }

    pub fn num_docs(&self) -> u32 {
        self.max_doc() - self.deleted_count()
    }

    pub fn is_deleted(&self, doc_id: u32) -> bool {
        self.deletes.as_ref().is_some_and(|d| d.is_deleted(doc_id))
    }
}

/// Where a reader's snapshot came from, and so how it reopens.
#[derive(Debug, Clone)]
pub(crate) enum ReaderSource {
    Commit,
    NearRealTime {
        writer: Weak<Mutex<WriterInner>>,
        version: u64,
    },
}

/// A consistent read-only view of an index.
#[derive(Debug)]
pub struct IndexReader {
    directory: Directory,
    segments: Vec<SegmentView>,
    doc_bases: Vec<u32>,
    max_doc: u32,
    num_docs: u32,
    generation: u64,
    source: ReaderSource,
}

impl IndexReader {
    /// Open the index's current commit.
    pub fn open(directory: &Directory) -> Result<Arc<IndexReader>> {
        Self::open_commit(directory, None).map(Arc::new)
    }

    fn open_commit(directory: &Directory, previous: Option<&IndexReader>) -> Result<IndexReader> {
        let storage = directory.storage().clone();
        open_current(storage.as_ref(), |commit| {
            Self::from_commit(directory, &commit, previous)
        })
    }

    fn from_commit(
        directory: &Directory,
        commit: &CommitPoint,
        previous: Option<&IndexReader>,
    ) -> Result<IndexReader> {
        let reusable: AHashMap<&str, &SegmentView> = previous
            .map(|reader| reader.segments.iter().map(|view| (view.name(), view)).collect())
            .unwrap_or_default();
        // Near-real-time views may carry deletions that were never committed.
        let committed_deletes =
            previous.is_some_and(|reader| matches!(reader.source, ReaderSource::Commit));

        let mut segments = Vec::with_capacity(commit.segments.len());
        for info in &commit.segments {
            let previous = reusable.get(info.name.as_str()).copied();
            segments.push(SegmentView::open(directory, info, previous, committed_deletes)?);
        }

        debug!(
            "opened reader on commit {} ({} segments)",
            commit.generation,
            segments.len()
        );
        Ok(Self::new(
            directory.clone(),
            segments,
            commit.generation,
            ReaderSource::Commit,
        ))
    }

    pub(crate) fn new(
        directory: Directory,
        segments: Vec<SegmentView>,
        generation: u64,
        source: ReaderSource,
    ) -> Self {
        let mut doc_bases = Vec::with_capacity(segments.len());
        let mut max_doc = 0u32;
        let mut num_docs = 0u32;
        for view in &segments {
            doc_bases.push(max_doc);
            max_doc += view.max_doc();
            num_docs += view.num_docs();
        }

        IndexReader {
            directory,
            segments,
            doc_bases,
            max_doc,
            num_docs,
            generation,
            source,
        }
    }

    /// A reader reflecting the latest state, or `self` if nothing changed.
    ///
    /// Near-real-time readers reopen through their writer while it is open
    /// and against the latest commit once it is closed.
    pub fn reopen(self: &Arc<Self>) -> Result<Arc<IndexReader>> {
        if let ReaderSource::NearRealTime { writer, version } = &self.source
            && let Some(writer) = writer.upgrade()
        {
            let mut inner = writer.lock();
            if inner.is_open() {
                if inner.version() == *version && inner.buffered_docs() == 0 {
                    return Ok(self.clone());
                }
                return inner.near_real_time_reader(&writer).map(Arc::new);
            }
        }

        if matches!(self.source, ReaderSource::Commit) {
            let generation = CommitPoint::current_generation(self.directory.storage().as_ref())?;
            if generation == self.generation {
                return Ok(self.clone());
            }
        }

        let reader = Self::open_commit(&self.directory, Some(self))?;
        debug!(
            "reopened reader: generation {} -> {}",
            self.generation, reader.generation
        );
        Ok(Arc::new(reader))
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Live documents.
    pub fn num_docs(&self) -> u32 {
        self.num_docs
    }

    /// One greater than the largest document id, deleted documents included.
    pub fn max_doc(&self) -> u32 {
        self.max_doc
    }

    pub fn has_deletions(&self) -> bool {
        self.num_docs < self.max_doc
    }

    /// Commit generation this reader was opened on.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn segments(&self) -> &[SegmentView] {
        &self.segments
    }

    pub fn doc_base(&self, segment: usize) -> u32 {
        self.doc_bases.get(segment).copied().unwrap_or(self.max_doc)
    }

    /// Resolve a global document id to `(segment index, local id)`.
    pub fn locate(&self, doc: u32) -> Option<(usize, u32)> {
        if doc >= self.max_doc {
            return None;
        }
        let segment = self.doc_bases.partition_point(|&base| base <= doc) - 1;
        Some((segment, doc - self.doc_bases[segment]))
    }

    pub fn is_deleted(&self, doc: u32) -> bool {
        self.locate(doc)
            .is_some_and(|(segment, local)| self.segments[segment].is_deleted(local))
    }

    /// Stored fields of a live document.
    pub fn document(&self, doc: u32) -> Result<StoredDocument> {
        let (segment, local) = self
            .locate(doc)
            .ok_or_else(|| StrataError::index(format!("document {doc} out of range (max_doc {})", self.max_doc)))?;
        let view = &self.segments[segment];
        if view.is_deleted(local) {
            return Err(StrataError::index(format!("document {doc} is deleted")));
        }
        view.reader().document(local)
    }

    /// Documents containing `field:term`, deleted ones included.
    pub fn doc_freq(&self, field: &str, term: &str) -> u32 {
        self.segments
            .iter()
            .filter_map(|view| view.reader().term_info(field, term))
            .map(|info| info.doc_freq)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::WhitespaceAnalyzer;
    use crate::document::{Document, Store};
    use crate::index::config::{IndexWriterConfig, OpenMode};
    use crate::index::term::Term;
    use crate::index::writer::IndexWriter;
    use crate::storage::memory::MemoryStorage;

    fn directory() -> Directory {
        Directory::new(Arc::new(MemoryStorage::default()))
    }

    fn config() -> IndexWriterConfig {
        IndexWriterConfig::new(Arc::new(WhitespaceAnalyzer::new())).with_open_mode(OpenMode::Create)
    }

    fn doc(id: &str) -> Document {
        Document::builder()
            .add_keyword("id", id, Store::Yes)
            .add_text("body", format!("text of {id}"), Store::No)
            .build()
    }

    #[test]
    fn test_open_missing_index() {
        assert!(matches!(
            IndexReader::open(&directory()),
            Err(StrataError::IndexNotFound(_))
        ));
    }

    #[test]
    fn test_reopen_sees_commits_and_shares_segments() {
        let directory = directory();
        let writer = IndexWriter::open(&directory, config()).unwrap();
        writer.add_document(doc("1")).unwrap();
        writer.commit().unwrap();

        let reader = IndexReader::open(&directory).unwrap();
        assert_eq!(reader.num_docs(), 1);
        assert!(Arc::ptr_eq(&reader, &reader.reopen().unwrap()));

        writer.add_document(doc("2")).unwrap();
        writer.commit().unwrap();
        let reopened = reader.reopen().unwrap();
        assert_eq!(reader.num_docs(), 1);
        assert_eq!(reopened.num_docs(), 2);
        assert!(reopened.generation() > reader.generation());
        assert!(Arc::ptr_eq(
            reader.segments()[0].reader(),
            reopened.segments()[0].reader()
        ));

        writer.delete_documents(&Term::new("id", "1")).unwrap();
        writer.commit().unwrap();
        let after_delete = reopened.reopen().unwrap();
        assert_eq!(after_delete.num_docs(), 1);
        assert_eq!(after_delete.max_doc(), 2);
        assert!(after_delete.has_deletions());
        assert!(after_delete.is_deleted(0));
        assert!(after_delete.document(0).is_err());
        assert_eq!(after_delete.document(1).unwrap().get("id"), Some("2"));
        writer.close().unwrap();
    }

    #[test]
    fn test_locate() {
        let directory = directory();
        let writer = IndexWriter::open(&directory, config().with_max_buffered_docs(2)).unwrap();
        for id in ["a", "b", "c"] {
            writer.add_document(doc(id)).unwrap();
        }
        writer.close().unwrap();

        let reader = IndexReader::open(&directory).unwrap();
        assert_eq!(reader.segment_count(), 2);
        assert_eq!(reader.locate(1), Some((0, 1)));
        assert_eq!(reader.locate(2), Some((1, 0)));
        assert_eq!(reader.locate(3), None);
        assert_eq!(reader.doc_freq("body", "text"), 3);
        assert_eq!(reader.doc_freq("body", "missing"), 0);
    }
}
