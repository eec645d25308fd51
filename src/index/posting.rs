//! Positional posting lists and their on-disk encoding.
//!
//! A list is encoded as a document count followed by, per posting, the doc id
//! delta, the frequency and the position deltas, all varints. When offsets are
//! enabled every position is followed by its start delta and token length.

use crate::error::{Result, StrataError};
use crate::util::varint::{decode_u64, encode_u64};

/// A single posting: one document's occurrences of a term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    /// Segment-local document id.
    pub doc_id: u32,
    /// Ascending positions of the term in the field.
    pub positions: Vec<u32>,
    /// Character offsets `(start, end)`, parallel to `positions`, when recorded.
    pub offsets: Option<Vec<(u32, u32)>>,
}

impl Posting {
    /// Create a posting with positions only.
    pub fn with_positions(doc_id: u32, positions: Vec<u32>) -> Self {
        Posting {
            doc_id,
            positions,
            offsets: None,
        }
    }

    /// Term frequency in the document.
    pub fn frequency(&self) -> u32 {
        self.positions.len() as u32
    }
}

/// Postings of one term, sorted by document id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingList {
    pub postings: Vec<Posting>,
}

impl PostingList {
    pub fn new() -> Self {
        PostingList::default()
    }

    /// Record one occurrence. Documents must arrive in ascending order.
    pub fn add_occurrence(&mut self, doc_id: u32, position: u32, offset: Option<(u32, u32)>) {
        match self.postings.last_mut() {
            Some(last) if last.doc_id == doc_id => {
                last.positions.push(position);
                if let (Some(offsets), Some(offset)) = (last.offsets.as_mut(), offset) {
                    offsets.push(offset);
                }
            }
            _ => self.postings.push(Posting {
                doc_id,
                positions: vec![position],
                offsets: offset.map(|o| vec![o]),
            }),
        }
    }

    /// Number of documents containing the term.
    pub fn doc_freq(&self) -> u32 {
        self.postings.len() as u32
    }

    /// Total occurrences across documents.
    pub fn total_freq(&self) -> u64 {
        self.postings.iter().map(|p| p.frequency() as u64).sum()
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Posting> {
        self.postings.iter()
    }

    /// Posting for `doc_id`, if present.
    pub fn find(&self, doc_id: u32) -> Option<&Posting> {
        self.postings
            .binary_search_by_key(&doc_id, |p| p.doc_id)
            .ok()
            .map(|idx| &self.postings[idx])
    }

    /// Append the encoded form of this list to `out`.
    pub fn encode(&self, out: &mut Vec<u8>, with_offsets: bool) {
        out.extend(encode_u64(self.postings.len() as u64));

        let mut previous_doc = 0u32;
        for posting in &self.postings {
            out.extend(encode_u64((posting.doc_id - previous_doc) as u64));
            previous_doc = posting.doc_id;
            out.extend(encode_u64(posting.positions.len() as u64));

            let mut previous_position = 0u32;
            let mut previous_start = 0u32;
            for (i, &position) in posting.positions.iter().enumerate() {
                out.extend(encode_u64(position.saturating_sub(previous_position) as u64));
                previous_position = position;

                if with_offsets {
                    let (start, end) = posting
                        .offsets
                        .as_ref()
                        .and_then(|offsets| offsets.get(i).copied())
                        .unwrap_or((previous_start, previous_start));
                    out.extend(encode_u64(start.saturating_sub(previous_start) as u64));
                    out.extend(encode_u64(end.saturating_sub(start) as u64));
                    previous_start = start;
                }
            }
        }
    }

    /// Decode a list produced by [`PostingList::encode`].
    pub fn decode(bytes: &[u8], with_offsets: bool) -> Result<Self> {
        let mut cursor = 0usize;
        let mut next = |what: &str| -> Result<u32> {
            let (value, used) = decode_u64(&bytes[cursor.min(bytes.len())..])?;
            cursor += used;
            u32::try_from(value)
                .map_err(|_| StrataError::corrupt(format!("postings: {what} {value} out of range")))
        };

        let count = next("count")? as usize;
        let mut postings = Vec::with_capacity(count.min(bytes.len()));
        let mut doc_id = 0u32;

        for i in 0..count {
            let delta = next("doc delta")?;
            if i > 0 && delta == 0 {
                return Err(StrataError::corrupt("postings: documents out of order"));
            }
            doc_id = doc_id
                .checked_add(delta)
                .ok_or_else(|| StrataError::corrupt("postings: doc id overflow"))?;

            let freq = next("frequency")? as usize;
            let mut positions = Vec::with_capacity(freq.min(bytes.len()));
            let mut offsets = with_offsets.then(|| Vec::with_capacity(freq.min(bytes.len())));
            let mut position = 0u32;
            let mut start = 0u32;

            for _ in 0..freq {
                position = position.saturating_add(next("position delta")?);
                positions.push(position);
                if let Some(offsets) = offsets.as_mut() {
                    start = start.saturating_add(next("offset delta")?);
                    let length = next("offset length")?;
                    offsets.push((start, start.saturating_add(length)));
                }
            }

            postings.push(Posting {
                doc_id,
                positions,
                offsets,
            });
        }

        Ok(PostingList { postings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_occurrence_groups_by_doc() {
        let mut list = PostingList::new();
        list.add_occurrence(0, 1, None);
        list.add_occurrence(0, 6, None);
        list.add_occurrence(3, 0, None);

        assert_eq!(list.doc_freq(), 2);
        assert_eq!(list.total_freq(), 3);
        assert_eq!(list.find(0).unwrap().positions, vec![1, 6]);
        assert!(list.find(1).is_none());
    }

    #[test]
    fn test_encode_decode_with_offsets() {
        let mut list = PostingList::new();
        list.add_occurrence(2, 0, Some((0, 3)));
        list.add_occurrence(2, 4, Some((10, 15)));
        list.add_occurrence(9, 7, Some((40, 44)));

        let mut bytes = Vec::new();
        list.encode(&mut bytes, true);
        assert_eq!(PostingList::decode(&bytes, true).unwrap(), list);

        let mut plain = Vec::new();
        list.encode(&mut plain, false);
        let decoded = PostingList::decode(&plain, false).unwrap();
        assert_eq!(decoded.find(9).unwrap().positions, vec![7]);
        assert!(decoded.find(9).unwrap().offsets.is_none());
    }

    #[test]
    fn test_truncated_postings_are_corrupt() {
        let mut list = PostingList::new();
        list.add_occurrence(5, 3, None);
        let mut bytes = Vec::new();
        list.encode(&mut bytes, false);
        bytes.pop();
        assert!(matches!(
            PostingList::decode(&bytes, false),
            Err(StrataError::CorruptSegment(_))
        ));
    }
}
