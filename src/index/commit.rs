//! Commit points and the atomic publication protocol.
//!
//! A commit is written as `segments_<gen>` (checksummed JSON) and becomes
//! current only when the `segments.gen` pointer is atomically replaced to
//! name it. Readers trust nothing but the pointer, so a crash at any earlier
//! step leaves the previous commit current and intact.

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StrataError};
use crate::index::segment::SegmentInfo;
use crate::storage::Storage;
use crate::storage::structured::{StructReader, StructWriter};

/// Prefix of commit files; the generation follows.
pub const SEGMENTS_PREFIX: &str = "segments_";
/// The commit pointer.
pub const SEGMENTS_GEN: &str = "segments.gen";
const SEGMENTS_GEN_TMP: &str = "segments.gen.tmp";
/// The writer's exclusive lock.
pub const WRITE_LOCK: &str = "write.lock";

/// Magic number of commit files ("COMT").
const COMMIT_MAGIC: u32 = 0x434F_4D54;
/// Magic number of the pointer file ("SGEN").
const GEN_MAGIC: u32 = 0x5347_454E;
const COMMIT_VERSION: u32 = 1;

/// How often a reader retries when the commit it loads is superseded.
const MAX_OPEN_ATTEMPTS: usize = 10;

pub fn commit_file_name(generation: u64) -> String {
    format!("{SEGMENTS_PREFIX}{generation}")
}

/// Generation of a commit file name, if it is one.
pub fn generation_of_file(file: &str) -> Option<u64> {
    file.strip_prefix(SEGMENTS_PREFIX)?.parse().ok()
}

/// A durable description of the live segment set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitPoint {
    /// Monotonic commit number.
    pub generation: u64,
    /// Next segment-name counter.
    pub counter: u64,
    /// Segments in document order.
    pub segments: Vec<SegmentInfo>,
    pub timestamp: DateTime<Utc>,
}

impl CommitPoint {
    /// The commit of a freshly created index.
    pub fn empty() -> Self {
        CommitPoint {
            generation: 0,
            counter: 0,
            segments: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn file_name(&self) -> String {
        commit_file_name(self.generation)
    }

    pub fn max_doc(&self) -> u32 {
        self.segments.iter().map(|s| s.doc_count).sum()
    }

    pub fn num_docs(&self) -> u32 {
        self.segments.iter().map(SegmentInfo::live_docs).sum()
    }

    /// The commit file plus every file its segments reference.
    pub fn files(&self) -> Vec<String> {
        let mut files = vec![self.file_name()];
        for segment in &self.segments {
            files.extend(segment.files());
        }
        files
    }

    /// Write and sync `segments_<generation>`. Does not publish it.
    pub fn write(&self, storage: &dyn Storage) -> Result<()> {
        let name = self.file_name();
        let output = storage.create_output(&name)?;
        let mut writer = StructWriter::with_header(output, COMMIT_MAGIC, COMMIT_VERSION)?;
        writer.write_bytes(&serde_json::to_vec(self)?)?;
        writer.close()?;
        storage.sync(&[name])
    }

    /// Read a commit file.
    pub fn read(storage: &dyn Storage, generation: u64) -> Result<Self> {
        let name = commit_file_name(generation);
        let data = storage.read_file(&name)?;
        let mut reader = StructReader::open(&name, &data, COMMIT_MAGIC, COMMIT_VERSION)?;
        let commit: CommitPoint = serde_json::from_slice(&reader.read_bytes()?)
            .map_err(|e| StrataError::corrupt(format!("{name}: {e}")))?;

        if commit.generation != generation {
            return Err(StrataError::corrupt(format!(
                "{name}: records generation {}",
                commit.generation
            )));
        }
        Ok(commit)
    }

    /// Atomically point `segments.gen` at this commit.
    pub fn publish(&self, storage: &dyn Storage) -> Result<()> {
        let output = storage.create_output(SEGMENTS_GEN_TMP)?;
        let mut writer = StructWriter::with_header(output, GEN_MAGIC, COMMIT_VERSION)?;
        writer.write_u64(self.generation)?;
        writer.write_u64(self.generation)?;
        writer.close()?;
        storage.sync(&[SEGMENTS_GEN_TMP.to_string()])?;
        storage.rename_file(SEGMENTS_GEN_TMP, SEGMENTS_GEN)?;

        debug!("published commit generation {}", self.generation);
        Ok(())
    }

    /// Generation named by the pointer.
    pub fn current_generation(storage: &dyn Storage) -> Result<u64> {
        let data = match storage.read_file(SEGMENTS_GEN) {
            Ok(data) => data,
            Err(e) if e.is_not_found() => {
                return Err(StrataError::index_not_found(
                    "no commit point (segments.gen missing)",
                ));
            }
            Err(e) => return Err(e),
        };

        let mut reader = StructReader::open(SEGMENTS_GEN, &data, GEN_MAGIC, COMMIT_VERSION)?;
        let first = reader.read_u64()?;
        let second = reader.read_u64()?;
        if first != second {
            return Err(StrataError::corrupt(format!(
                "{SEGMENTS_GEN}: generations disagree ({first} vs {second})"
            )));
        }
        Ok(first)
    }

    /// The generation a new commit should take: past both `last` and any
    /// `segments_<gen>` left on disk by an unpublished commit.
    pub fn next_generation(storage: &dyn Storage, last: u64) -> Result<u64> {
        let on_disk = storage
            .list_files()?
            .iter()
            .filter_map(|file| generation_of_file(file))
            .max()
            .unwrap_or(0);
        Ok(last.max(on_disk) + 1)
    }

    /// Load the current commit.
    pub fn read_current(storage: &dyn Storage) -> Result<Self> {
        open_current(storage, Ok)
    }
}

/// Run `open` against the current commit, retrying when that commit is
/// superseded and its files vanish mid-open.
pub fn open_current<T, F>(storage: &dyn Storage, mut open: F) -> Result<T>
where
    F: FnMut(CommitPoint) -> Result<T>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        let generation = CommitPoint::current_generation(storage)?;
        let result = CommitPoint::read(storage, generation).and_then(&mut open);

        match result {
            Err(e) if e.is_not_found() && attempt < MAX_OPEN_ATTEMPTS => {
                let now = CommitPoint::current_generation(storage)?;
                if now == generation {
                    return Err(e);
                }
                debug!("commit {generation} superseded by {now} while opening; retrying");
            }
            other => return other,
        }
    }
}
