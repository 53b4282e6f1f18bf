//! Search request types and the recognized configuration surface.

use serde::{Deserialize, Serialize};

use crate::error::{RiptideError, RiptideResult};
use crate::search::FusionConfig;

/// Which retrieval channels a search uses.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Default,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SearchType {
    /// Vector similarity search only.
    #[default]
    Vector,
    /// Full-text match search only.
    Fulltext,
    /// Both channels, merged by the configured fusion method.
    Hybrid,
}

/// The search input: query text and/or a precomputed query vector.
///
/// The fulltext channel and the reranker need the text form; the vector
/// channel accepts either (embedding is the channel implementation's
/// concern, not the pipeline's).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: Option<String>,
    pub vector: Option<Vec<f32>>,
}

impl SearchQuery {
    /// Query by text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            vector: None,
        }
    }

    /// Query by a precomputed vector.
    pub fn vector(vector: Vec<f32>) -> Self {
        Self {
            text: None,
            vector: Some(vector),
        }
    }

    /// Query by text with a precomputed vector alongside.
    pub fn with_vector(mut self, vector: Vec<f32>) -> Self {
        self.vector = Some(vector);
        self
    }
}

/// Configuration for a single search invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Which channels to query.
    pub search_type: SearchType,
    /// Fusion method and parameters (hybrid search only).
    pub fusion: FusionConfig,
    /// Maximum number of results to return. Applied last, after fusion and
    /// reranking. Must be at least 1.
    pub limit: usize,
    /// Per-channel candidate pool size fetched before fusion.
    /// Defaults to `limit`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_candidates: Option<usize>,
    /// Channel-local pre-fusion filter: drop vector rows whose distance
    /// exceeds this value. Changes which keys fusion sees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_threshold: Option<f64>,
    /// Channel-local pre-fusion filter: drop fulltext rows whose match score
    /// falls below this value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_score_threshold: Option<f64>,
    /// Escape hatch for hybrid search: when set, a single failed channel is
    /// logged and the surviving channel's results are used alone instead of
    /// aborting. Off by default - silently degrading to single-channel
    /// search changes result quality, so callers must opt in.
    #[serde(default)]
    pub allow_degraded: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            search_type: SearchType::Vector,
            fusion: FusionConfig::default(),
            limit: 10,
            num_candidates: None,
            distance_threshold: None,
            match_score_threshold: None,
            allow_degraded: false,
        }
    }
}

impl SearchOptions {
    /// Create options for the given search type with defaults.
    pub fn new(search_type: SearchType) -> Self {
        Self {
            search_type,
            ..Default::default()
        }
    }

    /// Options for hybrid search with default RRF fusion.
    pub fn hybrid() -> Self {
        Self::new(SearchType::Hybrid)
    }

    /// Set the result limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set the fusion method.
    pub fn with_fusion(mut self, fusion: FusionConfig) -> Self {
        self.fusion = fusion;
        self
    }

    /// Set the per-channel candidate pool size.
    pub fn with_num_candidates(mut self, num_candidates: usize) -> Self {
        self.num_candidates = Some(num_candidates);
        self
    }

    /// Set the vector-channel distance threshold.
    pub fn with_distance_threshold(mut self, threshold: f64) -> Self {
        self.distance_threshold = Some(threshold);
        self
    }

    /// Set the fulltext-channel match score threshold.
    pub fn with_match_score_threshold(mut self, threshold: f64) -> Self {
        self.match_score_threshold = Some(threshold);
        self
    }

    /// Opt in to degraded hybrid results when one channel fails.
    pub fn with_allow_degraded(mut self, allow: bool) -> Self {
        self.allow_degraded = allow;
        self
    }

    /// Per-channel fetch size: the configured candidate pool, or `limit`.
    pub fn candidate_pool(&self) -> usize {
        self.num_candidates.unwrap_or(self.limit)
    }

    /// Fail fast on malformed request parameters, before any I/O.
    pub fn validate(&self) -> RiptideResult<()> {
        if self.limit == 0 {
            return Err(RiptideError::invalid_argument(
                "limit must be a positive integer",
            ));
        }
        if let Some(num_candidates) = self.num_candidates {
            if num_candidates < self.limit {
                return Err(RiptideError::invalid_argument(format!(
                    "num_candidates ({}) must be at least limit ({})",
                    num_candidates, self.limit
                )));
            }
        }
        if self.search_type == SearchType::Hybrid {
            self.fusion.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_limit_rejected() {
        let err = SearchOptions::hybrid().with_limit(0).validate().unwrap_err();
        assert!(matches!(err, RiptideError::InvalidArgument(_)));
    }

    #[test]
    fn test_invalid_fusion_rejected_before_io() {
        let err = SearchOptions::hybrid()
            .with_fusion(FusionConfig::Rrf { k: 0.0 })
            .validate()
            .unwrap_err();
        assert!(matches!(err, RiptideError::InvalidConfiguration(_)));

        // Fusion parameters are not checked for single-channel search.
        let options = SearchOptions::new(SearchType::Vector)
            .with_fusion(FusionConfig::Rrf { k: 0.0 });
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_candidate_pool_defaults_to_limit() {
        let options = SearchOptions::hybrid().with_limit(5);
        assert_eq!(options.candidate_pool(), 5);

        let options = options.with_num_candidates(50);
        assert_eq!(options.candidate_pool(), 50);

        let bad = SearchOptions::hybrid().with_limit(10).with_num_candidates(3);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_search_type_parse_and_display() {
        use std::str::FromStr;
        assert_eq!(SearchType::from_str("hybrid").unwrap(), SearchType::Hybrid);
        assert_eq!(SearchType::Fulltext.to_string(), "fulltext");
        assert!(SearchType::from_str("graph").is_err());
    }
}
