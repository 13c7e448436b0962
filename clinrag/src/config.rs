//! Configuration for the retrieval pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Configuration parameters for the retrieval pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    /// Maximum fragment size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive fragments.
    pub chunk_overlap: usize,
    /// Number of candidates requested from vector search.
    pub top_k: usize,
    /// Minimum similarity score for a hit; results at or below are dropped.
    pub hit_threshold: f32,
    /// Message-count bound that ends the refinement loop.
    pub round_limit: usize,
    /// Deadline for each external gateway call, in seconds.
    pub gateway_timeout_secs: u64,
    /// Number of retries after a failed gateway call.
    pub gateway_retries: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 3,
            hit_threshold: 0.60,
            round_limit: 6,
            gateway_timeout_secs: 30,
            gateway_retries: 2,
        }
    }
}

impl PipelineConfig {
    /// Create a new builder for constructing a [`PipelineConfig`].
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// The gateway deadline as a [`Duration`].
    pub fn gateway_timeout(&self) -> Duration {
        Duration::from_secs(self.gateway_timeout_secs)
    }
}

/// Builder for constructing a validated [`PipelineConfig`].
#[derive(Debug, Clone, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Set the maximum fragment size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive fragments in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of candidates requested from vector search.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the minimum similarity score for accepting a hit.
    pub fn hit_threshold(mut self, threshold: f32) -> Self {
        self.config.hit_threshold = threshold;
        self
    }

    /// Set the message-count bound for the refinement loop.
    pub fn round_limit(mut self, limit: usize) -> Self {
        self.config.round_limit = limit;
        self
    }

    /// Set the per-call gateway deadline in seconds.
    pub fn gateway_timeout_secs(mut self, secs: u64) -> Self {
        self.config.gateway_timeout_secs = secs;
        self
    }

    /// Set the number of retries after a failed gateway call.
    pub fn gateway_retries(mut self, retries: u32) -> Self {
        self.config.gateway_retries = retries;
        self
    }

    /// Build the [`PipelineConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Configuration`] if:
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    /// - `hit_threshold` is outside `[-1, 1]`
    /// - `round_limit == 0`
    pub fn build(self) -> Result<PipelineConfig> {
        let c = &self.config;
        if c.chunk_overlap >= c.chunk_size {
            return Err(RagError::Configuration(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                c.chunk_overlap, c.chunk_size
            )));
        }
        if c.top_k == 0 {
            return Err(RagError::Configuration("top_k must be greater than zero".to_string()));
        }
        if !(-1.0..=1.0).contains(&c.hit_threshold) {
            return Err(RagError::Configuration(format!(
                "hit_threshold ({}) must lie in [-1, 1]",
                c.hit_threshold
            )));
        }
        if c.round_limit == 0 {
            return Err(RagError::Configuration(
                "round_limit must be greater than zero".to_string(),
            ));
        }
        Ok(self.config)
    }
}
