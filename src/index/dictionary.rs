//! Per-field sorted term dictionaries.
//!
//! Terms are kept sorted so that prefix, range and wildcard expansion become a
//! binary-search seek followed by a contiguous scan. On disk each field's terms
//! are prefix-compressed against their predecessor.

use std::collections::BTreeMap;
use std::ops::Bound;

use crate::error::{Result, StrataError};
use crate::storage::StorageOutput;
use crate::storage::structured::{StructReader, StructWriter};

/// Magic number of `.dict` files ("DICT").
pub const DICTIONARY_MAGIC: u32 = 0x4449_4354;
pub const DICTIONARY_VERSION: u32 = 1;

/// Statistics and postings location of one term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermInfo {
    /// Number of documents containing the term, deleted ones included.
    pub doc_freq: u32,
    /// Occurrences across all documents.
    pub total_freq: u64,
    /// Offset of the posting list within the postings payload.
    pub offset: u64,
    /// Encoded length of the posting list in bytes.
    pub length: u64,
}

/// Sorted terms of a single field.
#[derive(Debug, Clone, Default)]
pub struct FieldDictionary {
    terms: Vec<String>,
    infos: Vec<TermInfo>,
}

impl FieldDictionary {
    /// Build from terms already in ascending order.
    pub fn from_sorted(entries: Vec<(String, TermInfo)>) -> Self {
        let (terms, infos) = entries.into_iter().unzip();
        FieldDictionary { terms, infos }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Look up a term.
    pub fn get(&self, term: &str) -> Option<&TermInfo> {
        self.terms
            .binary_search_by(|probe| probe.as_str().cmp(term))
            .ok()
            .map(|idx| &self.infos[idx])
    }

    /// Index of the first term `>= term`.
    pub fn seek(&self, term: &str) -> usize {
        self.terms.partition_point(|probe| probe.as_str() < term)
    }

    /// All terms from `start` onwards.
    pub fn iter_from(&self, start: usize) -> impl Iterator<Item = (&str, &TermInfo)> + '_ {
        self.terms[start.min(self.terms.len())..]
            .iter()
            .zip(&self.infos[start.min(self.infos.len())..])
            .map(|(term, info)| (term.as_str(), info))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TermInfo)> + '_ {
        self.iter_from(0)
    }

    /// Terms starting with `prefix`, in order.
    pub fn prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, &'a TermInfo)> + 'a {
        self.iter_from(self.seek(prefix))
            .take_while(move |(term, _)| term.starts_with(prefix))
    }

    /// Terms within the given bounds, in order.
    pub fn range<'a>(
        &'a self,
        lower: Bound<&'a str>,
        upper: Bound<&'a str>,
    ) -> impl Iterator<Item = (&'a str, &'a TermInfo)> + 'a {
        let start = match lower {
            Bound::Included(term) => self.seek(term),
            Bound::Excluded(term) => self.terms.partition_point(|probe| probe.as_str() <= term),
            Bound::Unbounded => 0,
        };
        let end = match upper {
            Bound::Included(term) => self.terms.partition_point(|probe| probe.as_str() <= term),
            Bound::Excluded(term) => self.seek(term),
            Bound::Unbounded => self.terms.len(),
        };
        self.iter_from(start).take(end.saturating_sub(start))
    }
}

/// The term dictionaries of every field in a segment.
#[derive(Debug, Clone, Default)]
pub struct TermDictionary {
    fields: BTreeMap<String, FieldDictionary>,
}

impl TermDictionary {
    pub fn new() -> Self {
        TermDictionary::default()
    }

    pub fn insert_field<S: Into<String>>(&mut self, field: S, dictionary: FieldDictionary) {
        self.fields.insert(field.into(), dictionary);
    }

    pub fn field(&self, field: &str) -> Option<&FieldDictionary> {
        self.fields.get(field)
    }

    pub fn get(&self, field: &str, term: &str) -> Option<&TermInfo> {
        self.field(field)?.get(term)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Total number of terms across fields.
    pub fn term_count(&self) -> usize {
        self.fields.values().map(FieldDictionary::len).sum()
    }

    /// Serialize the dictionary body.
    pub fn write_to<W: StorageOutput>(&self, writer: &mut StructWriter<W>) -> Result<()> {
        writer.write_varint(self.fields.len() as u64)?;

        for (field, dictionary) in &self.fields {
            writer.write_string(field)?;
            writer.write_varint(dictionary.len() as u64)?;

            let mut previous = "";
            for (term, info) in dictionary.iter() {
                let shared = shared_prefix_len(previous, term);
                writer.write_varint(shared as u64)?;
                writer.write_string(&term[shared..])?;
                writer.write_varint(info.doc_freq as u64)?;
                writer.write_varint(info.total_freq)?;
                writer.write_varint(info.offset)?;
                writer.write_varint(info.length)?;
                previous = term;
            }
        }

        Ok(())
    }

    /// Deserialize a dictionary written by [`TermDictionary::write_to`].
    pub fn read_from(reader: &mut StructReader<'_>) -> Result<Self> {
        let field_count = reader.read_varint()? as usize;
        let mut fields = BTreeMap::new();

        for _ in 0..field_count {
            let field = reader.read_string()?;
            let term_count = reader.read_varint()? as usize;
            let mut entries: Vec<(String, TermInfo)> =
                Vec::with_capacity(term_count.min(reader.remaining()));

            for _ in 0..term_count {
                let shared = reader.read_varint()? as usize;
                let suffix = reader.read_string()?;
                let previous = entries.last().map(|(term, _)| term.as_str()).unwrap_or("");
                let prefix = previous.get(..shared).ok_or_else(|| {
                    StrataError::corrupt(format!(
                        "dictionary: shared prefix {shared} invalid for field '{field}'"
                    ))
                })?;
                let term = format!("{prefix}{suffix}");
                if !entries.is_empty() && previous >= term.as_str() {
                    return Err(StrataError::corrupt(format!(
                        "dictionary: terms out of order in field '{field}'"
                    )));
                }

                let info = TermInfo {
                    doc_freq: reader.read_varint_u32()?,
                    total_freq: reader.read_varint()?,
                    offset: reader.read_varint()?,
                    length: reader.read_varint()?,
                };
                entries.push((term, info));
            }

            fields.insert(field, FieldDictionary::from_sorted(entries));
        }

        Ok(TermDictionary { fields })
    }
}

/// Length in bytes of the common prefix, on a char boundary.
fn shared_prefix_len(a: &str, b: &str) -> usize {
    let mut len = a
        .bytes()
        .zip(b.bytes())
        .take_while(|(x, y)| x == y)
        .count();
    while !b.is_char_boundary(len) {
        len -= 1;
    }
    len
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use crate::storage::memory::MemoryStorage;

    fn info(doc_freq: u32) -> TermInfo {
        TermInfo {
            doc_freq,
            total_freq: doc_freq as u64,
            offset: 0,
            length: 0,
        }
    }

    fn words(terms: &[&str]) -> FieldDictionary {
        FieldDictionary::from_sorted(terms.iter().map(|t| (t.to_string(), info(1))).collect())
    }

    #[test]
    fn test_prefix_and_seek() {
        let dict = words(&["child", "mild", "mildew", "milk", "wild"]);
        let found: Vec<&str> = dict.prefix("mil").map(|(t, _)| t).collect();
        assert_eq!(found, vec!["mild", "mildew", "milk"]);
        assert_eq!(dict.seek("m"), 1);
        assert_eq!(dict.prefix("zz").count(), 0);
        assert!(dict.get("mild").is_some());
        assert!(dict.get("mi").is_none());
    }

    #[test]
    fn test_range_bounds() {
        let dict = words(&["a", "d", "f", "j", "k"]);
        let collect = |lower, upper| -> Vec<String> {
            dict.range(lower, upper).map(|(t, _)| t.to_string()).collect()
        };

        assert_eq!(collect(Bound::Included("d"), Bound::Included("j")), vec!["d", "f", "j"]);
        assert_eq!(collect(Bound::Excluded("d"), Bound::Excluded("j")), vec!["f"]);
        assert_eq!(collect(Bound::Unbounded, Bound::Excluded("d")), vec!["a"]);
        assert_eq!(collect(Bound::Included("k"), Bound::Unbounded), vec!["k"]);
        assert!(collect(Bound::Included("j"), Bound::Included("d")).is_empty());
    }

    #[test]
    fn test_write_read_prefix_compressed() {
        let storage = MemoryStorage::default();
        let mut dictionary = TermDictionary::new();
        dictionary.insert_field("title", words(&["junit", "jupiter", "über", "übung"]));
        dictionary.insert_field("isbn", words(&["1930110995"]));

        let output = storage.create_output("test.dict").unwrap();
        let mut writer = StructWriter::with_header(output, DICTIONARY_MAGIC, DICTIONARY_VERSION).unwrap();
        dictionary.write_to(&mut writer).unwrap();
        writer.close().unwrap();

        let data = storage.read_file("test.dict").unwrap();
        let mut reader =
            StructReader::open("test.dict", &data, DICTIONARY_MAGIC, DICTIONARY_VERSION).unwrap();
        let decoded = TermDictionary::read_from(&mut reader).unwrap();

        assert_eq!(decoded.term_count(), 5);
        let titles: Vec<&str> = decoded.field("title").unwrap().iter().map(|(t, _)| t).collect();
        assert_eq!(titles, vec!["junit", "jupiter", "über", "übung"]);
        assert!(decoded.get("isbn", "1930110995").is_some());
    }

    #[test]
    fn test_shared_prefix_respects_char_boundary() {
        assert_eq!(shared_prefix_len("über", "übung"), 3);
        assert_eq!(shared_prefix_len("é", "è"), 0);
        assert_eq!(shared_prefix_len("", "abc"), 0);
    }
}
