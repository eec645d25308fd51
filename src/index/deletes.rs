//! Per-segment deletion bitmaps.
//!
//! Deleting never rewrites a segment. The writer marks bits in a copy of the
//! segment's bitmap and commit persists it as a new `<segment>_<gen>.del`
//! generation; readers holding the previous bitmap keep seeing their snapshot.

use bit_vec::BitVec;

use crate::error::{Result, StrataError};
use crate::storage::Storage;
use crate::storage::structured::{StructReader, StructWriter};

/// Magic number of `.del` files ("DELB").
pub const DELETES_MAGIC: u32 = 0x4445_4C42;
pub const DELETES_VERSION: u32 = 1;

/// Bitmap of deleted documents in one segment (bit set = deleted).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionBitmap {
    deleted_docs: BitVec,
    deleted_count: u32,
}

impl DeletionBitmap {
    /// An empty bitmap for a segment of `doc_count` documents.
    pub fn new(doc_count: u32) -> Self {
        DeletionBitmap {
            deleted_docs: BitVec::from_elem(doc_count as usize, false),
            deleted_count: 0,
        }
    }

    /// Mark a document deleted; returns `true` when it was live before.
    pub fn delete(&mut self, doc_id: u32) -> Result<bool> {
        let idx = doc_id as usize;
        match self.deleted_docs.get(idx) {
            None => Err(StrataError::index(format!(
                "document {doc_id} out of range for segment of {} documents",
                self.deleted_docs.len()
            ))),
            Some(true) => Ok(false),
            Some(false) => {
                self.deleted_docs.set(idx, true);
                self.deleted_count += 1;
                Ok(true)
            }
        }
    }

    /// Whether a document is deleted. Out-of-range ids are reported live.
    pub fn is_deleted(&self, doc_id: u32) -> bool {
        self.deleted_docs.get(doc_id as usize).unwrap_or(false)
    }

    pub fn deleted_count(&self) -> u32 {
        self.deleted_count
    }

    pub fn doc_count(&self) -> u32 {
        self.deleted_docs.len() as u32
    }

    pub fn live_count(&self) -> u32 {
        self.doc_count() - self.deleted_count
    }

    /// Write the bitmap as a complete `.del` file.
    pub fn write(&self, storage: &dyn Storage, name: &str) -> Result<()> {
        let output = storage.create_output(name)?;
        let mut writer = StructWriter::with_header(output, DELETES_MAGIC, DELETES_VERSION)?;
        writer.write_u32(self.doc_count())?;
        writer.write_u32(self.deleted_count)?;
        writer.write_bytes(&self.deleted_docs.to_bytes())?;
        writer.close()
    }

    /// Read a `.del` file, checking it against the segment's document count.
    pub fn read(storage: &dyn Storage, name: &str, doc_count: u32) -> Result<Self> {
        let data = storage.read_file(name)?;
        let mut reader = StructReader::open(name, &data, DELETES_MAGIC, DELETES_VERSION)?;

        let stored_docs = reader.read_u32()?;
        if stored_docs != doc_count {
            return Err(StrataError::corrupt(format!(
                "{name}: covers {stored_docs} documents, segment has {doc_count}"
            )));
        }
        let deleted_count = reader.read_u32()?;
        let bytes = reader.read_bytes()?;

        let mut deleted_docs = BitVec::from_bytes(&bytes);
        if deleted_docs.len() < doc_count as usize {
            return Err(StrataError::corrupt(format!("{name}: bitmap too short")));
        }
        deleted_docs.truncate(doc_count as usize);

        let actual = deleted_docs.iter().filter(|deleted| *deleted).count() as u32;
        if actual != deleted_count {
            return Err(StrataError::corrupt(format!(
                "{name}: header says {deleted_count} deletions, bitmap has {actual}"
            )));
        }

        Ok(DeletionBitmap {
            deleted_docs,
            deleted_count,
        })
    }
}
