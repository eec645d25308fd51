//! Document analysis and the in-memory segment buffer.
//!
//! [`DocumentAnalyzer`] turns a [`Document`] into an [`AnalyzedDocument`]
//! without touching any shared state, so a failing field leaves the buffer
//! exactly as it was. [`SegmentWriter`] buffers analyzed documents and inverts
//! them into a segment on flush.

use std::collections::BTreeMap;
use std::sync::Arc;

use ahash::AHashMap;

use crate::analysis::Analyzer;
use crate::document::{Document, FieldKind, StoredValue};
use crate::error::{Result, StrataError};
use crate::index::codec::{SegmentData, write_segment};
use crate::index::config::{IndexWriterConfig, PositionGaps};
use crate::index::posting::PostingList;
use crate::index::segment::SegmentInfo;
use crate::index::term::Term;
use crate::storage::Storage;
use crate::util::numeric::trie_terms;

/// One indexed occurrence of a term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedToken {
    pub term: String,
    pub position: u32,
    pub offset: Option<(u32, u32)>,
}

/// All indexed occurrences of one field, repeated instances merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzedField {
    pub name: String,
    pub tokens: Vec<IndexedToken>,
    /// Token count used for length normalization.
    pub length: u32,
}

/// A document ready to be buffered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyzedDocument {
    pub fields: Vec<AnalyzedField>,
    pub stored: Vec<(String, StoredValue)>,
}

impl AnalyzedDocument {
    /// Whether the document indexes `term`.
    pub fn contains(&self, term: &Term) -> bool {
        self.fields
            .iter()
            .filter(|field| field.name == term.field)
            .any(|field| field.tokens.iter().any(|token| token.term == term.text))
    }

    /// Rough heap footprint in bytes.
    pub fn ram_bytes(&self) -> usize {
        let indexed: usize = self
            .fields
            .iter()
            .map(|field| {
                field.name.len()
                    + field
                        .tokens
                        .iter()
                        .map(|token| token.term.len() + std::mem::size_of::<IndexedToken>())
                        .sum::<usize>()
            })
            .sum();
        let stored: usize = self
            .stored
            .iter()
            .map(|(name, value)| name.len() + value.as_text().map_or(8, str::len))
            .sum();
        indexed + stored + std::mem::size_of::<Self>()
    }
}

#[derive(Debug, Default)]
struct FieldState {
    /// Last assigned position, -1 before the first token.
    position: i64,
    offset_base: u32,
    instances: u32,
    field_index: usize,
}

/// Converts documents into their indexed form.
#[derive(Debug, Clone)]
pub struct DocumentAnalyzer {
    analyzer: Arc<dyn Analyzer>,
    position_gaps: PositionGaps,
    precision_step: u32,
    store_offsets: bool,
}

impl DocumentAnalyzer {
    pub fn new(config: &IndexWriterConfig) -> Self {
        DocumentAnalyzer {
            analyzer: config.analyzer.clone(),
            position_gaps: config.position_gaps.clone(),
            precision_step: config.precision_step,
            store_offsets: config.store_offsets,
        }
    }

    pub fn analyzer(&self) -> &Arc<dyn Analyzer> {
        &self.analyzer
    }

    pub fn precision_step(&self) -> u32 {
        self.precision_step
    }

    /// Analyze every field of `doc`.
    pub fn analyze(&self, doc: &Document) -> Result<AnalyzedDocument> {
        let mut analyzed = AnalyzedDocument::default();
        let mut states: AHashMap<&str, FieldState> = AHashMap::new();

        for field in doc.fields() {
            let name = field.name();
            if name.is_empty() {
                return Err(StrataError::invalid_field_value(name, "field name is empty"));
            }
            if let Some(value) = field.stored_value() {
                analyzed.stored.push((name.to_string(), value));
            }
            if !field.is_indexed() {
                continue;
            }

            let state = states.entry(name).or_insert_with(|| {
                analyzed.fields.push(AnalyzedField {
                    name: name.to_string(),
                    tokens: Vec::new(),
                    length: 0,
                });
                FieldState {
                    position: -1,
                    field_index: analyzed.fields.len() - 1,
                    ..Default::default()
                }
            });
            if state.instances > 0 {
                state.position += self.position_gaps.gap_for(name) as i64;
            }
            state.instances += 1;

            let target = &mut analyzed.fields[state.field_index];
            match field.kind() {
                FieldKind::Text { value, .. } => {
                    let mut end = 0;
                    for token in self.analyzer.analyze_field(name, value)? {
                        state.position = (state.position + token.position_increment as i64).max(0);
                        let offset = self.store_offsets.then(|| {
                            (
                                state.offset_base + token.start_offset as u32,
                                state.offset_base + token.end_offset as u32,
                            )
                        });
                        end = end.max(token.end_offset as u32);
                        target.tokens.push(IndexedToken {
                            term: token.text,
                            position: state.position as u32,
                            offset,
                        });
                        target.length += 1;
                    }
                    state.offset_base += end.max(value.len() as u32);
                }
                FieldKind::Keyword { value, .. } => {
                    state.position += 1;
                    let offset = self
                        .store_offsets
                        .then(|| (state.offset_base, state.offset_base + value.len() as u32));
                    target.tokens.push(IndexedToken {
                        term: value.clone(),
                        position: state.position as u32,
                        offset,
                    });
                    target.length += 1;
                    state.offset_base += value.len() as u32;
                }
                FieldKind::Int { value, .. } => {
                    state.position += 1;
                    for term in trie_terms(*value, self.precision_step) {
                        target.tokens.push(IndexedToken {
                            term,
                            position: state.position as u32,
                            offset: None,
                        });
                    }
                    target.length += 1;
                }
                FieldKind::Stored(_) => {}
            }
        }

        Ok(analyzed)
    }
}

/// Buffer of analyzed documents not yet written to a segment.
#[derive(Debug, Default)]
pub struct SegmentWriter {
    docs: Vec<AnalyzedDocument>,
    ram_bytes: usize,
    store_offsets: bool,
}

impl SegmentWriter {
    pub fn new(store_offsets: bool) -> Self {
        SegmentWriter {
            store_offsets,
            ..Default::default()
        }
    }

    /// Buffer a document. No I/O happens here.
    pub fn add_document(&mut self, doc: AnalyzedDocument) {
        self.ram_bytes += doc.ram_bytes();
        self.docs.push(doc);
    }

    /// Drop buffered documents containing `term`; returns how many.
    pub fn delete_term(&mut self, term: &Term) -> usize {
        let before = self.docs.len();
        self.docs.retain(|doc| !doc.contains(term));
        let removed = before - self.docs.len();
        if removed > 0 {
            self.ram_bytes = self.docs.iter().map(AnalyzedDocument::ram_bytes).sum();
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn ram_bytes_used(&self) -> usize {
        self.ram_bytes
    }

    pub fn clear(&mut self) {
        self.docs.clear();
        self.ram_bytes = 0;
    }

    /// Invert the buffer into segment data.
    pub fn build(&self) -> SegmentData {
        let doc_count = self.docs.len() as u32;
        let mut postings: BTreeMap<String, BTreeMap<String, PostingList>> = BTreeMap::new();
        let mut lengths: BTreeMap<String, Vec<u32>> = BTreeMap::new();
        let mut stored = Vec::with_capacity(self.docs.len());

        for (doc_id, doc) in self.docs.iter().enumerate() {
            let doc_id = doc_id as u32;
            for field in &doc.fields {
                lengths
                    .entry(field.name.clone())
                    .or_insert_with(|| vec![0; doc_count as usize])[doc_id as usize] = field.length;

                let terms = postings.entry(field.name.clone()).or_default();
                let mut tokens: Vec<&IndexedToken> = field.tokens.iter().collect();
                tokens.sort_by_key(|token| token.position);
                for token in tokens {
                    let offset = if self.store_offsets {
                        Some(token.offset.unwrap_or((0, 0)))
                    } else {
                        None
                    };
                    terms
                        .entry(token.term.clone())
                        .or_default()
                        .add_occurrence(doc_id, token.position, offset);
                }
            }
            stored.push(doc.stored.clone());
        }

        SegmentData {
            doc_count,
            postings,
            stored,
            lengths,
            has_offsets: self.store_offsets,
        }
    }

    /// Write the buffer as segment `name` and clear it.
    pub fn flush(&mut self, storage: &dyn Storage, name: &str) -> Result<Option<SegmentInfo>> {
        if self.docs.is_empty() {
            return Ok(None);
        }
        let info = write_segment(storage, name, &self.build())?;
        self.clear();
        Ok(Some(info))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::WhitespaceAnalyzer;
    use crate::document::{Field, Store};

    fn analyzer(gap: u32) -> DocumentAnalyzer {
        let config = IndexWriterConfig::new(Arc::new(WhitespaceAnalyzer::new()))
            .with_position_gaps(PositionGaps::uniform(gap))
            .with_store_offsets(true);
        DocumentAnalyzer::new(&config)
    }

    fn positions(doc: &AnalyzedDocument, field: &str, term: &str) -> Vec<u32> {
        doc.fields
            .iter()
            .filter(|f| f.name == field)
            .flat_map(|f| f.tokens.iter())
            .filter(|t| t.term == term)
            .map(|t| t.position)
            .collect()
    }

    #[test]
    fn test_positions_and_gap() {
        let doc = Document::builder()
            .add_text("contents", "quick brown fox", Store::No)
            .add_text("contents", "lazy dog", Store::Yes)
            .build();

        let analyzed = analyzer(100).analyze(&doc).unwrap();
        assert_eq!(analyzed.fields.len(), 1);
        assert_eq!(analyzed.fields[0].length, 5);
        assert_eq!(positions(&analyzed, "contents", "quick"), vec![0]);
        assert_eq!(positions(&analyzed, "contents", "fox"), vec![2]);
        assert_eq!(positions(&analyzed, "contents", "lazy"), vec![103]);
        assert_eq!(analyzed.stored.len(), 1);

        let lazy = &analyzed.fields[0].tokens[3];
        assert_eq!(lazy.offset, Some((15, 19)));
    }

    #[test]
    fn test_keyword_and_int_fields() {
        let doc = Document::builder()
            .add_keyword("city", "Den Haag", Store::Yes)
            .add_int("pubmonth", 200605, Store::Yes)
            .build();

        let analyzed = analyzer(0).analyze(&doc).unwrap();
        assert_eq!(positions(&analyzed, "city", "Den Haag"), vec![0]);
        let pubmonth = analyzed.fields.iter().find(|f| f.name == "pubmonth").unwrap();
        assert_eq!(pubmonth.length, 1);
        assert_eq!(pubmonth.tokens.len(), 16);
        assert_eq!(analyzed.stored.len(), 2);
    }

    #[test]
    fn test_empty_field_name_rejected() {
        let doc = Document::builder().add_text("", "text", Store::No).build();
        assert!(matches!(
            analyzer(0).analyze(&doc),
            Err(StrataError::InvalidFieldValue { .. })
        ));
    }

    #[test]
    fn test_build_and_delete_term() {
        let analyzer = analyzer(0);
        let mut writer = SegmentWriter::new(false);
        for text in ["a b a", "b c", "c"] {
            let doc = Document::builder().add_text("f", text, Store::Yes).build();
            writer.add_document(analyzer.analyze(&doc).unwrap());
        }
        assert!(writer.ram_bytes_used() > 0);

        let data = writer.build();
        assert_eq!(data.doc_count, 3);
        let a = &data.postings["f"]["a"];
        assert_eq!(a.find(0).unwrap().positions, vec![0, 2]);
        assert_eq!(data.lengths["f"], vec![3, 2, 1]);

        assert_eq!(writer.delete_term(&Term::new("f", "b")), 2);
        assert_eq!(writer.len(), 1);
        assert_eq!(writer.build().postings["f"]["c"].doc_freq(), 1);
    }
}
