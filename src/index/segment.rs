//! Segment metadata and file naming.
//!
//! A segment named `seg_000003` owns the files `seg_000003.dict` (term
//! dictionary), `.post` (postings), `.docs` (stored fields) and `.lens` (field
//! lengths), plus at most one live deletions file `seg_000003_<gen>.del`.

use serde::{Deserialize, Serialize};

/// Term dictionary file extension.
pub const DICTIONARY_EXTENSION: &str = "dict";
/// Postings file extension.
pub const POSTINGS_EXTENSION: &str = "post";
/// Stored fields file extension.
pub const STORED_EXTENSION: &str = "docs";
/// Field lengths file extension.
pub const LENGTHS_EXTENSION: &str = "lens";
/// Deletions file extension.
pub const DELETES_EXTENSION: &str = "del";

const CORE_EXTENSIONS: [&str; 4] = [
    DICTIONARY_EXTENSION,
    POSTINGS_EXTENSION,
    STORED_EXTENSION,
    LENGTHS_EXTENSION,
];

/// Per-segment entry of a commit point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentInfo {
    /// Segment name, unique within the index.
    pub name: String,

    /// Number of documents in the segment, deleted ones included.
    pub doc_count: u32,

    /// Generation of the deletions file; 0 means no deletions were written.
    #[serde(default)]
    pub del_gen: u64,

    /// Number of deleted documents recorded in the deletions file.
    #[serde(default)]
    pub del_count: u32,

    /// Whether postings carry character offsets.
    #[serde(default)]
    pub has_offsets: bool,
}

impl SegmentInfo {
    pub fn new<S: Into<String>>(name: S, doc_count: u32, has_offsets: bool) -> Self {
        SegmentInfo {
            name: name.into(),
            doc_count,
            del_gen: 0,
            del_count: 0,
            has_offsets,
        }
    }

    /// Documents not marked deleted.
    pub fn live_docs(&self) -> u32 {
        self.doc_count.saturating_sub(self.del_count)
    }

    pub fn has_deletions(&self) -> bool {
        self.del_count > 0
    }

    /// Name of the current deletions file, if any.
    pub fn deletes_file(&self) -> Option<String> {
        (self.del_gen > 0).then(|| deletes_file_name(&self.name, self.del_gen))
    }

    /// Files that never change after flush.
    pub fn core_files(&self) -> Vec<String> {
        core_file_names(&self.name)
    }

    /// Every file this segment currently references.
    pub fn files(&self) -> Vec<String> {
        let mut files = self.core_files();
        files.extend(self.deletes_file());
        files
    }
}

/// Build a segment name from a prefix and counter.
pub fn segment_name(prefix: &str, counter: u64) -> String {
    format!("{prefix}_{counter:06}")
}

pub fn segment_file_name(segment: &str, extension: &str) -> String {
    format!("{segment}.{extension}")
}

pub fn deletes_file_name(segment: &str, del_gen: u64) -> String {
    format!("{segment}_{del_gen}.{DELETES_EXTENSION}")
}

pub fn core_file_names(segment: &str) -> Vec<String> {
    CORE_EXTENSIONS
        .iter()
        .map(|ext| segment_file_name(segment, ext))
        .collect()
}

/// The segment a file belongs to, for files with a segment extension.
pub fn segment_of_file(file: &str) -> Option<&str> {
    let (stem, extension) = file.rsplit_once('.')?;
    if extension == DELETES_EXTENSION {
        let (segment, del_gen) = stem.rsplit_once('_')?;
        del_gen.parse::<u64>().ok()?;
        Some(segment)
    } else if CORE_EXTENSIONS.contains(&extension) {
        Some(stem)
    } else {
        None
    }
}
