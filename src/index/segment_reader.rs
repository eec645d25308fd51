//! Read access to one immutable segment.
//!
//! Dictionary, stored fields and field lengths are decoded eagerly when the
//! segment is opened; posting lists are decoded on demand from the verified
//! postings image. Segment readers are shared between index readers through
//! the directory's segment pool.

use std::sync::Weak;

use ahash::AHashMap;
use log::debug;

use crate::document::{StoredDocument, StoredValue};
use crate::error::{Result, StrataError};
use crate::index::codec::{
    LENGTHS_MAGIC, POSTINGS_MAGIC, SEGMENT_VERSION, STORED_INT, STORED_MAGIC, STORED_TEXT,
};
use crate::index::dictionary::{
    DICTIONARY_MAGIC, DICTIONARY_VERSION, FieldDictionary, TermDictionary, TermInfo,
};
use crate::index::directory::SegmentPool;
use crate::index::posting::PostingList;
use crate::index::segment::{
    DICTIONARY_EXTENSION, LENGTHS_EXTENSION, POSTINGS_EXTENSION, STORED_EXTENSION, SegmentInfo,
    segment_file_name,
};
use crate::storage::Storage;
use crate::storage::structured::StructReader;

/// An open segment.
#[derive(Debug)]
pub struct SegmentReader {
    name: String,
    doc_count: u32,
    has_offsets: bool,
    dictionary: TermDictionary,
    postings: Vec<u8>,
    stored: Vec<StoredDocument>,
    lengths: AHashMap<String, Vec<u32>>,
    pool: Weak<SegmentPool>,
}

impl SegmentReader {
    /// Open and verify the core files of `info`.
    pub fn open(storage: &dyn Storage, info: &SegmentInfo, pool: Weak<SegmentPool>) -> Result<Self> {
        let name = info.name.as_str();

        let dict_file = segment_file_name(name, DICTIONARY_EXTENSION);
        let dict_data = storage.read_file(&dict_file)?;
        let mut reader =
            StructReader::open(&dict_file, &dict_data, DICTIONARY_MAGIC, DICTIONARY_VERSION)?;
        let doc_count = reader.read_u32()?;
        if doc_count != info.doc_count {
            return Err(StrataError::corrupt(format!(
                "{dict_file}: holds {doc_count} documents, commit says {}",
                info.doc_count
            )));
        }
        let has_offsets = reader.read_u8()? != 0;
        let dictionary = TermDictionary::read_from(&mut reader)?;

        let post_file = segment_file_name(name, POSTINGS_EXTENSION);
        let postings = storage.read_file(&post_file)?;
        let post_reader = StructReader::open(&post_file, &postings, POSTINGS_MAGIC, SEGMENT_VERSION)?;
        let post_len = post_reader.position() + post_reader.remaining() as u64;
        for field in dictionary.field_names() {
            let Some(terms) = dictionary.field(field) else {
                continue;
            };
            if let Some((term, _)) = terms
                .iter()
                .find(|(_, info)| info.offset.saturating_add(info.length) > post_len)
            {
                return Err(StrataError::corrupt(format!(
                    "{post_file}: postings of {field}:{term} run past end of file"
                )));
            }
        }

        let stored = read_stored(storage, name, doc_count)?;
        let lengths = read_lengths(storage, name, doc_count)?;

        debug!(
            "opened segment {name}: {doc_count} docs, {} terms",
            dictionary.term_count()
        );

        Ok(SegmentReader {
            name: name.to_string(),
            doc_count,
            has_offsets,
            dictionary,
            postings,
            stored,
            lengths,
            pool,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Documents in the segment, deleted ones included.
    pub fn doc_count(&self) -> u32 {
        self.doc_count
    }

    pub fn has_offsets(&self) -> bool {
        self.has_offsets
    }

    pub fn dictionary(&self) -> &TermDictionary {
        &self.dictionary
    }

    pub fn field(&self, field: &str) -> Option<&FieldDictionary> {
        self.dictionary.field(field)
    }

    pub fn term_info(&self, field: &str, term: &str) -> Option<&TermInfo> {
        self.dictionary.get(field, term)
    }

    /// Decode the posting list described by `info`.
    pub fn postings(&self, info: &TermInfo) -> Result<PostingList> {
        let start = info.offset as usize;
        let end = start.saturating_add(info.length as usize);
        let bytes = self.postings.get(start..end).ok_or_else(|| {
            StrataError::corrupt(format!("{}: postings range {start}..{end} out of bounds", self.name))
        })?;
        PostingList::decode(bytes, self.has_offsets)
    }

    /// Postings of `field:term`, if the term occurs in this segment.
    pub fn term_postings(&self, field: &str, term: &str) -> Result<Option<PostingList>> {
        self.term_info(field, term)
            .map(|info| self.postings(info))
            .transpose()
    }

    /// Stored fields of a segment-local document.
    pub fn document(&self, doc_id: u32) -> Result<StoredDocument> {
        self.stored.get(doc_id as usize).cloned().ok_or_else(|| {
            StrataError::index(format!(
                "document {doc_id} out of range for segment {} of {} documents",
                self.name, self.doc_count
            ))
        })
    }

    /// Number of tokens indexed for `field` in a document.
    pub fn field_length(&self, field: &str, doc_id: u32) -> u32 {
        self.lengths
            .get(field)
            .and_then(|lengths| lengths.get(doc_id as usize))
            .copied()
            .unwrap_or(0)
    }

    /// Per-document lengths of `field`.
    pub fn field_lengths(&self, field: &str) -> Option<&[u32]> {
        self.lengths.get(field).map(Vec::as_slice)
    }
}

impl Drop for SegmentReader {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.upgrade() {
            pool.release(&self.name);
        }
    }
}

fn read_stored(storage: &dyn Storage, name: &str, doc_count: u32) -> Result<Vec<StoredDocument>> {
    let file = segment_file_name(name, STORED_EXTENSION);
    let data = storage.read_file(&file)?;
    let mut reader = StructReader::open(&file, &data, STORED_MAGIC, SEGMENT_VERSION)?;

    if reader.read_u32()? != doc_count {
        return Err(StrataError::corrupt(format!("{file}: document count mismatch")));
    }

    let mut documents = Vec::with_capacity(doc_count as usize);
    for _ in 0..doc_count {
        let field_count = reader.read_varint()? as usize;
        let mut fields = Vec::with_capacity(field_count.min(reader.remaining()));
        for _ in 0..field_count {
            let field = reader.read_string()?;
            let value = match reader.read_u8()? {
                STORED_TEXT => StoredValue::Text(reader.read_string()?),
                STORED_INT => StoredValue::Int(reader.read_i64()?),
                tag => {
                    return Err(StrataError::corrupt(format!(
                        "{file}: unknown value tag {tag}"
                    )));
                }
            };
            fields.push((field, value));
        }
        documents.push(StoredDocument::new(fields));
    }

    if !reader.is_eof() {
        return Err(StrataError::corrupt(format!("{file}: trailing bytes")));
    }
    Ok(documents)
}

fn read_lengths(
    storage: &dyn Storage,
    name: &str,
    doc_count: u32,
) -> Result<AHashMap<String, Vec<u32>>> {
    let file = segment_file_name(name, LENGTHS_EXTENSION);
    let data = storage.read_file(&file)?;
    let mut reader = StructReader::open(&file, &data, LENGTHS_MAGIC, SEGMENT_VERSION)?;

    if reader.read_u32()? != doc_count {
        return Err(StrataError::corrupt(format!("{file}: document count mismatch")));
    }

    let field_count = reader.read_varint()? as usize;
    let mut lengths = AHashMap::with_capacity(field_count.min(reader.remaining()));
    for _ in 0..field_count {
        let field = reader.read_string()?;
        let mut values = Vec::with_capacity(doc_count as usize);
        for _ in 0..doc_count {
            values.push(reader.read_varint_u32()?);
        }
        lengths.insert(field, values);
    }

    Ok(lengths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::index::codec::{SegmentData, write_segment};
    use crate::storage::memory::MemoryStorage;

    fn sample_data() -> SegmentData {
        let mut title = BTreeMap::new();
        let mut lucene = PostingList::new();
        lucene.add_occurrence(0, 0, None);
        lucene.add_occurrence(1, 2, None);
        lucene.add_occurrence(1, 5, None);
        title.insert("lucene".to_string(), lucene);
        let mut action = PostingList::new();
        action.add_occurrence(1, 3, None);
        title.insert("action".to_string(), action);

        let mut postings = BTreeMap::new();
        postings.insert("title".to_string(), title);

        let mut lengths = BTreeMap::new();
        lengths.insert("title".to_string(), vec![1, 6]);

        SegmentData {
            doc_count: 2,
            postings,
            stored: vec![
                vec![("title".to_string(), StoredValue::from("Lucene"))],
                vec![
                    ("title".to_string(), StoredValue::from("Lucene in Action")),
                    ("pubmonth".to_string(), StoredValue::Int(200406)),
                ],
            ],
            lengths,
            has_offsets: false,
        }
    }

    #[test]
    fn test_write_and_open_segment() {
        let storage = MemoryStorage::default();
        let info = write_segment(&storage, "seg_000000", &sample_data()).unwrap();
        assert_eq!(info.doc_count, 2);
        assert_eq!(storage.list_files().unwrap().len(), 4);

        let reader = SegmentReader::open(&storage, &info, Weak::new()).unwrap();
        assert_eq!(reader.doc_count(), 2);

        let info = reader.term_info("title", "lucene").unwrap();
        assert_eq!(info.doc_freq, 2);
        assert_eq!(info.total_freq, 3);

        let postings = reader.term_postings("title", "lucene").unwrap().unwrap();
        assert_eq!(postings.find(1).unwrap().positions, vec![2, 5]);
        assert!(reader.term_postings("title", "solr").unwrap().is_none());

        let doc = reader.document(1).unwrap();
        assert_eq!(doc.get("title"), Some("Lucene in Action"));
        assert_eq!(doc.get_int("pubmonth"), Some(200406));
        assert_eq!(reader.field_length("title", 1), 6);
        assert_eq!(reader.field_length("author", 1), 0);
        assert!(reader.document(2).is_err());
    }

    #[test]
    fn test_corrupted_file_is_detected() {
        let storage = MemoryStorage::default();
        let info = write_segment(&storage, "seg_000000", &sample_data()).unwrap();

        let file = segment_file_name("seg_000000", POSTINGS_EXTENSION);
        let mut data = storage.read_file(&file).unwrap();
        let middle = data.len() / 2;
        data[middle] ^= 0xFF;
        storage.replace_file(&file, data);

        assert!(matches!(
            SegmentReader::open(&storage, &info, Weak::new()),
            Err(StrataError::CorruptSegment(_))
        ));
    }
}
