//! Top-K hit collection.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A scored document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreDoc {
    /// Global document id within the searched reader.
    pub doc: u32,
    pub score: f32,
}

impl ScoreDoc {
    /// Result order: higher score first, then lower doc id.
    fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.doc.cmp(&other.doc))
    }
}

/// The result of a search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopDocs {
    /// Number of matching documents, not just those returned.
    pub total_hits: usize,
    /// The best hits, in result order.
    pub score_docs: Vec<ScoreDoc>,
}

impl TopDocs {
    pub fn max_score(&self) -> Option<f32> {
        self.score_docs.first().map(|hit| hit.score)
    }

    pub fn len(&self) -> usize {
        self.score_docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.score_docs.is_empty()
    }

    pub fn docs(&self) -> impl Iterator<Item = u32> + '_ {
        self.score_docs.iter().map(|hit| hit.doc)
    }
}

/// Heap entry ordered so that the worst hit is on top.
#[derive(Debug, Clone, Copy)]
struct WorstFirst(ScoreDoc);

impl PartialEq for WorstFirst {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for WorstFirst {}

impl PartialOrd for WorstFirst {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WorstFirst {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.rank_cmp(&other.0)
    }
}

/// Keeps the `k` best hits seen so far.
#[derive(Debug)]
pub struct TopDocsCollector {
    k: usize,
    heap: BinaryHeap<WorstFirst>,
    total_hits: usize,
}

impl TopDocsCollector {
    pub fn new(k: usize) -> Self {
        TopDocsCollector {
            k,
            heap: BinaryHeap::with_capacity(k.min(1024)),
            total_hits: 0,
        }
    }

    pub fn collect(&mut self, doc: u32, score: f32) {
        self.total_hits += 1;
        if self.k == 0 {
            return;
        }

        let hit = WorstFirst(ScoreDoc { doc, score });
        if self.heap.len() < self.k {
            self.heap.push(hit);
        } else if let Some(worst) = self.heap.peek()
            && hit < *worst
        {
            self.heap.pop();
            self.heap.push(hit);
        }
    }

    pub fn total_hits(&self) -> usize {
        self.total_hits
    }

    pub fn into_top_docs(self) -> TopDocs {
        let mut score_docs: Vec<ScoreDoc> = self.heap.into_iter().map(|hit| hit.0).collect();
        score_docs.sort_by(ScoreDoc::rank_cmp);
        TopDocs {
            total_hits: self.total_hits,
            score_docs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_best_and_breaks_ties_by_doc() {
        let mut collector = TopDocsCollector::new(3);
        for (doc, score) in [(5, 1.0), (1, 2.0), (3, 1.0), (2, 1.0), (4, 0.5)] {
            collector.collect(doc, score);
        }

        let top = collector.into_top_docs();
        assert_eq!(top.total_hits, 5);
        assert_eq!(top.docs().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(top.max_score(), Some(2.0));
    }

    #[test]
    fn test_zero_k_only_counts() {
        let mut collector = TopDocsCollector::new(0);
        collector.collect(0, 1.0);
        let top = collector.into_top_docs();
        assert_eq!(top.total_hits, 1);
        assert!(top.is_empty());
    }
}
