//! The index-level directory handle and its segment pool.
//!
//! A [`Directory`] pairs a [`Storage`] backend with a [`SegmentPool`] that
//! shares open [`SegmentReader`]s between index readers and the writer. Files
//! of a segment that left the index are deleted only once the last reader
//! holding that segment is dropped.

use std::sync::{Arc, Weak};

use ahash::AHashMap;
use log::{debug, warn};
use parking_lot::Mutex;

use crate::error::Result;
use crate::index::commit::SEGMENTS_GEN;
use crate::index::segment::{SegmentInfo, segment_of_file};
use crate::index::segment_reader::SegmentReader;
use crate::storage::{Storage, StorageConfig, StorageFactory};

/// Handle to one index's files. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Directory {
    storage: Arc<dyn Storage>,
    pool: Arc<SegmentPool>,
}

impl Directory {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let pool = Arc::new(SegmentPool::new(storage.clone()));
        Directory { storage, pool }
    }

    /// Create the storage described by `config` and wrap it.
    pub fn from_config(config: StorageConfig) -> Result<Self> {
        Ok(Directory::new(StorageFactory::create(config)?))
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub(crate) fn pool(&self) -> &Arc<SegmentPool> {
        &self.pool
    }

    /// Files that belong to some segment, sorted.
    pub fn list_segment_files(&self) -> Result<Vec<String>> {
        Ok(self
            .storage
            .list_files()?
            .into_iter()
            .filter(|file| segment_of_file(file).is_some())
            .collect())
    }

    /// Whether a commit has ever been published here.
    pub fn index_exists(&self) -> bool {
        self.storage.file_exists(SEGMENTS_GEN)
    }

    /// Open a segment, sharing an already open reader when there is one.
    pub fn open_segment(&self, info: &SegmentInfo) -> Result<Arc<SegmentReader>> {
        self.pool.get_or_open(info)
    }
}

#[derive(Debug, Default)]
struct PoolState {
    open: AHashMap<String, Weak<SegmentReader>>,
    /// Segments no longer in the index whose files wait for their readers.
    retired: AHashMap<String, Vec<String>>,
}

/// Reference-counted registry of open segments.
#[derive(Debug)]
pub struct SegmentPool {
    storage: Arc<dyn Storage>,
    state: Mutex<PoolState>,
}

impl SegmentPool {
    fn new(storage: Arc<dyn Storage>) -> Self {
        SegmentPool {
            storage,
            state: Mutex::new(PoolState::default()),
        }
    }

    /// Return the live reader of `info`, opening it if necessary.
    pub fn get_or_open(self: &Arc<Self>, info: &SegmentInfo) -> Result<Arc<SegmentReader>> {
        if let Some(reader) = self.lookup(&info.name) {
            return Ok(reader);
        }

        // Opening does I/O; keep it outside the lock.
        let opened = Arc::new(SegmentReader::open(
            self.storage.as_ref(),
            info,
            Arc::downgrade(self),
        )?);

        let existing = {
            let mut state = self.state.lock();
            match state.open.get(&info.name).and_then(Weak::upgrade) {
                Some(existing) => Some(existing),
                None => {
                    state.open.insert(info.name.clone(), Arc::downgrade(&opened));
                    None
                }
            }
        };

        // A racing open won; ours is dropped here, outside the lock.
        Ok(existing.unwrap_or(opened))
    }

    fn lookup(&self, name: &str) -> Option<Arc<SegmentReader>> {
        self.state.lock().open.get(name).and_then(Weak::upgrade)
    }

    /// Whether a reader of `name` is currently open.
    pub fn is_open(&self, name: &str) -> bool {
        self.state
            .lock()
            .open
            .get(name)
            .is_some_and(|weak| weak.strong_count() > 0)
    }

    /// Mark a segment as gone from the index; its files are deleted as soon
    /// as no reader holds it.
    pub fn retire(&self, name: &str, files: Vec<String>) {
        let deletable = {
            let mut state = self.state.lock();
            let in_use = state
                .open
                .get(name)
                .is_some_and(|weak| weak.strong_count() > 0);
            if in_use {
                debug!("deferring deletion of segment {name}: still referenced");
                state.retired.insert(name.to_string(), files);
                None
            } else {
                state.open.remove(name);
                Some(files)
            }
        };

        if let Some(files) = deletable {
            self.delete_files(&files);
        }
    }

    /// Called when a segment reader is dropped.
    pub(crate) fn release(&self, name: &str) {
        let deletable = {
            let mut state = self.state.lock();
            let dead = state
                .open
                .get(name)
                .is_none_or(|weak| weak.strong_count() == 0);
            if dead {
                state.open.remove(name);
                state.retired.remove(name)
            } else {
                None
            }
        };

        if let Some(files) = deletable {
            debug!("deleting retired segment {name}");
            self.delete_files(&files);
        }
    }

    /// Segments whose deletion is still pending.
    pub fn pending_deletions(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state.lock().retired.keys().cloned().collect();
        names.sort();
        names
    }

    fn delete_files(&self, files: &[String]) {
        for file in files {
            if let Err(e) = self.storage.delete_file(file) {
                warn!("could not delete {file}: {e}");
            }
        }
    }
}
