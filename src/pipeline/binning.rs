//! Policyholder age buckets
//!
//! Edges are the lower bounds of consecutive buckets. With edges
//! `[18, 26, 36]` the buckets are `<18`, `18-25`, `26-35`, `36+` and a
//! trailing `Unknown` bucket for records without an age, so every record
//! lands in exactly one bucket.

use serde::Serialize;

use super::config::UNKNOWN;
use super::error::ConfigError;

/// A single age bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgeBucket {
    /// Position in bucket order; used for sorting segment keys
    pub index: usize,
    pub label: String,
    /// Inclusive lower bound, `None` for the underflow and unknown buckets
    pub lower: Option<u32>,
    /// Inclusive upper bound, `None` for the overflow and unknown buckets
    pub upper: Option<u32>,
}

/// Ordered partition of ages into labelled buckets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgeBuckets {
    edges: Vec<u32>,
    buckets: Vec<AgeBucket>,
}

impl AgeBuckets {
    /// Build buckets from strictly increasing lower edges.
    pub fn new(edges: &[u32]) -> Result<Self, ConfigError> {
        if edges.is_empty() {
            return Err(ConfigError::EmptyBucketEdges);
        }
        if edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::UnorderedBucketEdges(edges.to_vec()));
        }
        Ok(Self::from_checked_edges(edges))
    }

    /// Caller guarantees `edges` is non-empty and strictly increasing.
    fn from_checked_edges(edges: &[u32]) -> Self {
        let mut buckets = Vec::with_capacity(edges.len() + 2);
        let mut push = |label: String, lower: Option<u32>, upper: Option<u32>| {
            let index = buckets.len();
            buckets.push(AgeBucket { index, label, lower, upper });
        };

        if edges[0] > 0 {
            push(format!("<{}", edges[0]), None, Some(edges[0] - 1));
        }
        for pair in edges.windows(2) {
            let (lo, hi) = (pair[0], pair[1] - 1);
            let label = if lo == hi {
                lo.to_string()
            } else {
                format!("{}-{}", lo, hi)
            };
            push(label, Some(lo), Some(hi));
        }
        let last = edges[edges.len() - 1];
        push(format!("{}+", last), Some(last), None);
        push(UNKNOWN.to_string(), None, None);

        Self {
            edges: edges.to_vec(),
            buckets,
        }
    }

    pub fn edges(&self) -> &[u32] {
        &self.edges
    }

    /// All buckets in order, `Unknown` last
    pub fn buckets(&self) -> &[AgeBucket] {
        &self.buckets
    }

    pub fn labels(&self) -> Vec<&str> {
        self.buckets.iter().map(|b| b.label.as_str()).collect()
    }

    /// Bucket for an age; a missing age maps to `Unknown`.
    pub fn bucket_for(&self, age: Option<u32>) -> &AgeBucket {
        let unknown = self.buckets.len() - 1;
        let Some(age) = age else {
            return &self.buckets[unknown];
        };

        // Number of edges <= age; the underflow bucket shifts indices by one
        let passed = self.edges.partition_point(|&edge| edge <= age);
        let offset = usize::from(self.edges[0] > 0);
        let index = if passed == 0 { 0 } else { passed - 1 + offset };
        &self.buckets[index]
    }
}

impl Default for AgeBuckets {
    fn default() -> Self {
        Self::from_checked_edges(&super::config::DEFAULT_AGE_BUCKET_EDGES)
    }
}
