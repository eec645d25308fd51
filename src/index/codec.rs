//! Writing the files of an immutable segment.
//!
//! Flush and merge both produce a [`SegmentData`] and hand it to
//! [`write_segment`]; the matching decode side lives in
//! [`crate::index::segment_reader`].

use std::collections::BTreeMap;

use log::debug;

use crate::document::StoredValue;
use crate::error::Result;
use crate::index::dictionary::{
    DICTIONARY_MAGIC, DICTIONARY_VERSION, FieldDictionary, TermDictionary, TermInfo,
};
use crate::index::posting::PostingList;
use crate::index::segment::{
    DICTIONARY_EXTENSION, LENGTHS_EXTENSION, POSTINGS_EXTENSION, STORED_EXTENSION, SegmentInfo,
    segment_file_name,
};
use crate::storage::Storage;
use crate::storage::structured::StructWriter;

/// Magic number of `.post` files ("POST").
pub const POSTINGS_MAGIC: u32 = 0x504F_5354;
/// Magic number of `.docs` files ("DOCS").
pub const STORED_MAGIC: u32 = 0x444F_4353;
/// Magic number of `.lens` files ("LENS").
pub const LENGTHS_MAGIC: u32 = 0x4C45_4E53;
pub const SEGMENT_VERSION: u32 = 1;

pub(crate) const STORED_TEXT: u8 = 0;
pub(crate) const STORED_INT: u8 = 1;

/// Everything needed to write one segment.
#[derive(Debug, Clone, Default)]
pub struct SegmentData {
    pub doc_count: u32,
    /// field -> term -> postings, both levels sorted.
    pub postings: BTreeMap<String, BTreeMap<String, PostingList>>,
    /// Stored values per document, in document order.
    pub stored: Vec<Vec<(String, StoredValue)>>,
    /// field -> per-document token count.
    pub lengths: BTreeMap<String, Vec<u32>>,
    pub has_offsets: bool,
}

/// Write `data` as segment `name` and return its commit entry.
pub fn write_segment(storage: &dyn Storage, name: &str, data: &SegmentData) -> Result<SegmentInfo> {
    let dictionary = write_postings(storage, name, data)?;
    write_dictionary(storage, name, data, &dictionary)?;
    write_stored(storage, name, data)?;
    write_lengths(storage, name, data)?;

    let info = SegmentInfo::new(name, data.doc_count, data.has_offsets);
    storage.sync(&info.core_files())?;

    debug!(
        "wrote segment {name}: {} docs, {} terms",
        data.doc_count,
        dictionary.term_count()
    );
    Ok(info)
}

fn write_postings(storage: &dyn Storage, name: &str, data: &SegmentData) -> Result<TermDictionary> {
    let output = storage.create_output(&segment_file_name(name, POSTINGS_EXTENSION))?;
    let mut writer = StructWriter::with_header(output, POSTINGS_MAGIC, SEGMENT_VERSION)?;
    let mut dictionary = TermDictionary::new();
    let mut buffer = Vec::new();

    for (field, terms) in &data.postings {
        let mut entries = Vec::with_capacity(terms.len());
        for (term, list) in terms {
            if list.is_empty() {
                continue;
            }
            buffer.clear();
            list.encode(&mut buffer, data.has_offsets);

            let offset = writer.position();
            writer.write_raw(&buffer)?;
            entries.push((
                term.clone(),
                TermInfo {
                    doc_freq: list.doc_freq(),
                    total_freq: list.total_freq(),
                    offset,
                    length: buffer.len() as u64,
                },
            ));
        }
        if !entries.is_empty() {
            dictionary.insert_field(field.clone(), FieldDictionary::from_sorted(entries));
        }
    }

    writer.close()?;
    Ok(dictionary)
}

fn write_dictionary(
    storage: &dyn Storage,
    name: &str,
    data: &SegmentData,
    dictionary: &TermDictionary,
) -> Result<()> {
    let output = storage.create_output(&segment_file_name(name, DICTIONARY_EXTENSION))?;
    let mut writer = StructWriter::with_header(output, DICTIONARY_MAGIC, DICTIONARY_VERSION)?;
    writer.write_u32(data.doc_count)?;
    writer.write_u8(data.has_offsets as u8)?;
    dictionary.write_to(&mut writer)?;
    writer.close()
}

fn write_stored(storage: &dyn Storage, name: &str, data: &SegmentData) -> Result<()> {
    let output = storage.create_output(&segment_file_name(name, STORED_EXTENSION))?;
    let mut writer = StructWriter::with_header(output, STORED_MAGIC, SEGMENT_VERSION)?;
    writer.write_u32(data.doc_count)?;

    for fields in &data.stored {
        writer.write_varint(fields.len() as u64)?;
        for (field, value) in fields {
            writer.write_string(field)?;
            match value {
                StoredValue::Text(text) => {
                    writer.write_u8(STORED_TEXT)?;
                    writer.write_string(text)?;
                }
                StoredValue::Int(value) => {
                    writer.write_u8(STORED_INT)?;
                    writer.write_i64(*value)?;
                }
            }
        }
    }

    writer.close()
}

fn write_lengths(storage: &dyn Storage, name: &str, data: &SegmentData) -> Result<()> {
    let output = storage.create_output(&segment_file_name(name, LENGTHS_EXTENSION))?;
    let mut writer = StructWriter::with_header(output, LENGTHS_MAGIC, SEGMENT_VERSION)?;
    writer.write_u32(data.doc_count)?;
    writer.write_varint(data.lengths.len() as u64)?;

    for (field, lengths) in &data.lengths {
        writer.write_string(field)?;
        for doc in 0..data.doc_count as usize {
            writer.write_varint(lengths.get(doc).copied().unwrap_or(0) as u64)?;
        }
    }

    writer.close()
}
