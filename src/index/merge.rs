//! Merging segments into one.
//!
//! Deleted documents are dropped and the survivors renumbered in order, so
//! global document order is preserved.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;

use crate::error::Result;
use crate::index::codec::{SegmentData, write_segment};
use crate::index::deletes::DeletionBitmap;
use crate::index::posting::{Posting, PostingList};
use crate::index::segment::SegmentInfo;
use crate::index::segment_reader::SegmentReader;
use crate::storage::Storage;

/// A segment participating in a merge, with the deletions to apply.
#[derive(Debug, Clone)]
pub struct MergeSource {
    pub reader: Arc<SegmentReader>,
    pub deletes: Option<Arc<DeletionBitmap>>,
}

impl MergeSource {
    fn is_deleted(&self, doc_id: u32) -> bool {
        self.deletes.as_ref().is_some_and(|d| d.is_deleted(doc_id))
    }

    /// Old local id -> new id relative to this source's base, `None` if deleted.
    fn doc_map(&self) -> (Vec<Option<u32>>, u32) {
        let mut next = 0u32;
        let map = (0..self.reader.doc_count())
            .map(|doc| {
                if self.is_deleted(doc) {
                    None
                } else {
                    next += 1;
                    Some(next - 1)
                }
            })
            .collect();
        (map, next)
    }
}

/// Build the merged segment data without writing it.
pub fn merge_data(sources: &[MergeSource]) -> Result<SegmentData> {
    let mut data = SegmentData::default();
    let mut maps = Vec::with_capacity(sources.len());
    let mut bases = Vec::with_capacity(sources.len());

    for source in sources {
        let (map, live) = source.doc_map();
        bases.push(data.doc_count);
        data.doc_count += live;
        data.has_offsets |= source.reader.has_offsets();
        maps.push(map);
    }

    for ((source, map), &base) in sources.iter().zip(&maps).zip(&bases) {
        let reader = &source.reader;

        for field in reader.dictionary().field_names() {
            let Some(terms) = reader.field(field) else {
                continue;
            };
            let merged_terms = data.postings.entry(field.to_string()).or_default();

            for (term, info) in terms.iter() {
                let list = reader.postings(info)?;
                let remapped: Vec<Posting> = list
                    .postings
                    .into_iter()
                    .filter_map(|mut posting| {
                        let new_id = map.get(posting.doc_id as usize).copied().flatten()?;
                        posting.doc_id = base + new_id;
                        if data.has_offsets && posting.offsets.is_none() {
                            posting.offsets = Some(vec![(0, 0); posting.positions.len()]);
                        }
                        Some(posting)
                    })
                    .collect();
                if remapped.is_empty() {
                    continue;
                }
                merged_terms
                    .entry(term.to_string())
                    .or_insert_with(PostingList::new)
                    .postings
                    .extend(remapped);
            }

            if let Some(lengths) = reader.field_lengths(field) {
                let merged = data
                    .lengths
                    .entry(field.to_string())
                    .or_insert_with(Vec::new);
                merged.resize(data.doc_count as usize, 0);
                for (old, new_id) in map.iter().enumerate() {
                    if let Some(new_id) = new_id {
                        merged[(base + new_id) as usize] = lengths.get(old).copied().unwrap_or(0);
                    }
                }
            }
        }

        for (old, new_id) in map.iter().enumerate() {
            if new_id.is_some() {
                data.stored.push(reader.document(old as u32)?.fields().to_vec());
            }
        }
    }

    data.postings.retain(|_, terms: &mut BTreeMap<String, PostingList>| !terms.is_empty());
    Ok(data)
}

/// Merge `sources` into the new segment `name`.
pub fn merge_segments(
    storage: &dyn Storage,
    name: &str,
    sources: &[MergeSource],
) -> Result<SegmentInfo> {
    let data = merge_data(sources)?;
    let info = write_segment(storage, name, &data)?;
    debug!(
        "merged {} segments into {name} ({} live docs)",
        sources.len(),
        info.doc_count
    );
    Ok(info)
}
