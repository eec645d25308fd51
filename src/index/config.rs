//! Index writer configuration.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::{Analyzer, StandardAnalyzer};
use crate::index::merge_policy::{LogMergePolicy, MergePolicy};
use crate::util::numeric::DEFAULT_PRECISION_STEP;

/// How [`IndexWriter::open`](crate::index::IndexWriter::open) treats existing data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenMode {
    /// Start a new, empty index, discarding any existing one.
    Create,
    /// Open an existing index; fail if there is none.
    Append,
    /// Append when an index exists, create otherwise.
    #[default]
    CreateOrAppend,
}

/// Position gap inserted between repeated instances of a field.
///
/// A gap larger than any phrase slop keeps phrases from matching across
/// instance boundaries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionGaps {
    #[serde(default)]
    pub default: u32,
    #[serde(default)]
    pub per_field: HashMap<String, u32>,
}

impl PositionGaps {
    /// The same gap for every field.
    pub fn uniform(gap: u32) -> Self {
        PositionGaps {
            default: gap,
            per_field: HashMap::new(),
        }
    }

    pub fn with_field<S: Into<String>>(mut self, field: S, gap: u32) -> Self {
        self.per_field.insert(field.into(), gap);
        self
    }

    pub fn gap_for(&self, field: &str) -> u32 {
        self.per_field.get(field).copied().unwrap_or(self.default)
    }
}

/// Configuration for [`IndexWriter`](crate::index::IndexWriter).
#[derive(Clone)]
pub struct IndexWriterConfig {
    /// Analyzer for text fields (can be a PerFieldAnalyzer).
    pub analyzer: Arc<dyn Analyzer>,

    pub open_mode: OpenMode,

    /// Maximum number of documents to buffer before flushing a segment.
    pub max_buffered_docs: usize,

    /// Maximum estimated buffer size in bytes before flushing.
    pub max_buffer_memory: usize,

    /// Segment name prefix.
    pub segment_prefix: String,

    pub position_gaps: PositionGaps,

    /// Whether postings record character offsets.
    pub store_offsets: bool,

    /// Bits per trie level for numeric fields.
    pub precision_step: u32,

    pub merge_policy: Arc<dyn MergePolicy>,
}

impl IndexWriterConfig {
    pub fn new(analyzer: Arc<dyn Analyzer>) -> Self {
        IndexWriterConfig {
            analyzer,
            ..Default::default()
        }
    }

    pub fn with_open_mode(mut self, open_mode: OpenMode) -> Self {
        self.open_mode = open_mode;
        self
    }

    pub fn with_max_buffered_docs(mut self, max_buffered_docs: usize) -> Self {
        self.max_buffered_docs = max_buffered_docs;
        self
    }

    pub fn with_max_buffer_memory(mut self, max_buffer_memory: usize) -> Self {
        self.max_buffer_memory = max_buffer_memory;
        self
    }

    pub fn with_position_gaps(mut self, position_gaps: PositionGaps) -> Self {
        self.position_gaps = position_gaps;
        self
    }

    pub fn with_merge_policy(mut self, merge_policy: Arc<dyn MergePolicy>) -> Self {
        self.merge_policy = merge_policy;
        self
    }

    pub fn with_store_offsets(mut self, store_offsets: bool) -> Self {
        self.store_offsets = store_offsets;
        self
    }
}

impl std::fmt::Debug for IndexWriterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexWriterConfig")
            .field("analyzer", &self.analyzer.name())
            .field("open_mode", &self.open_mode)
            .field("max_buffered_docs", &self.max_buffered_docs)
            .field("max_buffer_memory", &self.max_buffer_memory)
            .field("segment_prefix", &self.segment_prefix)
            .field("position_gaps", &self.position_gaps)
            .field("store_offsets", &self.store_offsets)
            .field("precision_step", &self.precision_step)
            .field("merge_policy", &self.merge_policy.name())
            .finish()
    }
}

impl Default for IndexWriterConfig {
    fn default() -> Self {
        IndexWriterConfig {
            analyzer: Arc::new(StandardAnalyzer::new()),
            open_mode: OpenMode::default(),
            max_buffered_docs: 10000,
            max_buffer_memory: 64 * 1024 * 1024, // 64MB
            segment_prefix: "segment".to_string(),
            position_gaps: PositionGaps::default(),
            store_offsets: false,
            precision_step: DEFAULT_PRECISION_STEP,
            merge_policy: Arc::new(LogMergePolicy::default()),
        }
    }
}
