//! Policies deciding which segments to merge after a flush.

use std::ops::Range;

use crate::index::segment::SegmentInfo;

/// Chooses contiguous runs of segments to merge.
///
/// Runs must be contiguous so that merging preserves global document order.
pub trait MergePolicy: Send + Sync + std::fmt::Debug {
    /// Non-overlapping ranges into `segments`, in ascending order.
    fn find_merges(&self, segments: &[SegmentInfo]) -> Vec<Range<usize>>;

    fn name(&self) -> &str;
}

/// Never merges; only `optimize` reduces the segment count.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMergePolicy;

impl MergePolicy for NoMergePolicy {
    fn find_merges(&self, _segments: &[SegmentInfo]) -> Vec<Range<usize>> {
        Vec::new()
    }

    fn name(&self) -> &str {
        "no_merge"
    }
}

/// Groups segments into logarithmic levels by document count and merges
/// `merge_factor` adjacent segments of the same level.
#[derive(Debug, Clone, Copy)]
pub struct LogMergePolicy {
    pub merge_factor: usize,
    /// Segments smaller than this all count as level 0.
    pub min_merge_docs: u32,
}

impl Default for LogMergePolicy {
    fn default() -> Self {
        LogMergePolicy {
            merge_factor: 10,
            min_merge_docs: 10,
        }
    }
}

impl LogMergePolicy {
    pub fn new(merge_factor: usize) -> Self {
        LogMergePolicy {
            merge_factor,
            ..Default::default()
        }
    }

    fn level(&self, doc_count: u32) -> u32 {
        let factor = self.merge_factor.max(2) as f64;
        let scaled = doc_count.max(self.min_merge_docs.max(1)) as f64 / self.min_merge_docs.max(1) as f64;
        (scaled.ln() / factor.ln()).floor() as u32
    }
}

impl MergePolicy for LogMergePolicy {
    fn find_merges(&self, segments: &[SegmentInfo]) -> Vec<Range<usize>> {
        let factor = self.merge_factor.max(2);
        let levels: Vec<u32> = segments.iter().map(|s| self.level(s.live_docs())).collect();
        let mut merges = Vec::new();

        let mut start = 0;
        while start < levels.len() {
            let mut end = start + 1;
            while end < levels.len() && levels[end] == levels[start] {
                end += 1;
            }

            let mut run = start;
            while end - run >= factor {
                merges.push(run..run + factor);
                run += factor;
            }
            start = end;
        }

        merges
    }

    fn name(&self) -> &str {
        "log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(doc_counts: &[u32]) -> Vec<SegmentInfo> {
        doc_counts
            .iter()
            .enumerate()
            .map(|(i, &docs)| SegmentInfo::new(format!("seg_{i:06}"), docs, false))
            .collect()
    }

    #[test]
    fn test_merges_full_level() {
        let policy = LogMergePolicy::new(3);
        assert!(policy.find_merges(&segments(&[5, 5])).is_empty());
        assert_eq!(policy.find_merges(&segments(&[5, 5, 5])), vec![0..3]);
        assert_eq!(policy.find_merges(&segments(&[5, 5, 5, 5])), vec![0..3]);
    }

    #[test]
    fn test_levels_are_separated() {
        let policy = LogMergePolicy::new(3);
        // 100 docs sits on a higher level than the small segments.
        assert_eq!(policy.find_merges(&segments(&[100, 2, 3, 4])), vec![1..4]);
        assert!(policy.find_merges(&segments(&[2, 100, 3, 4])).is_empty());
    }

    #[test]
    fn test_no_merge_policy() {
        assert!(NoMergePolicy.find_merges(&segments(&[1; 20])).is_empty());
    }
}
