//! Searching a point-in-time view of the index.

use std::sync::Arc;

use log::debug;
use rayon::prelude::*;

use crate::document::StoredDocument;
use crate::error::{Result, StrataError};
use crate::index::reader::IndexReader;
use crate::search::collector::{TopDocs, TopDocsCollector};
use crate::search::explanation::Explanation;
use crate::search::query::Query;
use crate::search::weight::{SegmentHits, Weight};

/// Runs queries against one [`IndexReader`].
///
/// Results are stable for the searcher's lifetime: later commits are only
/// visible through a reopened reader.
#[derive(Debug, Clone)]
pub struct IndexSearcher {
    reader: Arc<IndexReader>,
    parallel: bool,
}

impl IndexSearcher {
    pub fn new(reader: Arc<IndexReader>) -> Self {
        IndexSearcher {
            reader,
            parallel: true,
        }
    }

    /// Whether segments are scored on the rayon pool.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn reader(&self) -> &Arc<IndexReader> {
        &self.reader
    }

    /// The `k` best documents for `query`, best first.
    ///
    /// Ties in score are broken by ascending document id.
    pub fn search(&self, query: &Query, k: usize) -> Result<TopDocs> {
        let hits = self.segment_hits(query)?;

        let mut collector = TopDocsCollector::new(k);
        for (segment, segment_hits) in hits.into_iter().enumerate() {
            let base = self.reader.doc_base(segment);
            for (doc, score) in segment_hits {
                collector.collect(base + doc, score);
            }
        }

        let top = collector.into_top_docs();
        debug!("query {query} matched {} documents", top.total_hits);
        Ok(top)
    }

    /// Number of live documents matching `query`.
    pub fn count(&self, query: &Query) -> Result<usize> {
        Ok(self.segment_hits(query)?.iter().map(Vec::len).sum())
    }

    /// How `doc` scores against `query`.
    ///
    /// The value equals the score [`search`](Self::search) reports for the
    /// document, or 0 with `is_match() == false` when it does not match.
    pub fn explain(&self, query: &Query, doc: u32) -> Result<Explanation> {
        let (segment, local) = self.reader.locate(doc).ok_or_else(|| {
            StrataError::invalid_argument(format!(
                "document {doc} is out of range (max_doc {})",
                self.reader.max_doc()
            ))
        })?;
        let weight = Weight::new(query, &self.reader)?;
        weight.explain(&self.reader.segments()[segment], local)
    }

    /// The stored fields of `doc`.
    pub fn doc(&self, doc: u32) -> Result<StoredDocument> {
        self.reader.document(doc)
    }

    /// Segment-local ids of the live documents matching `query`, per segment.
    pub(crate) fn matching_segment_docs(&self, query: &Query) -> Result<Vec<Vec<u32>>> {
        Ok(self
            .segment_hits(query)?
            .into_iter()
            .map(|hits| hits.into_iter().map(|(doc, _)| doc).collect())
            .collect())
    }

    fn segment_hits(&self, query: &Query) -> Result<Vec<SegmentHits>> {
        let weight = Weight::new(query, &self.reader)?;
        let segments = self.reader.segments();

        if self.parallel && segments.len() > 1 {
            segments
                .par_iter()
                .map(|segment| weight.scores(segment))
                .collect()
        } else {
            segments.iter().map(|segment| weight.scores(segment)).collect()
        }
    }
}
