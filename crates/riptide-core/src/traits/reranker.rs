//! Reranker trait and related types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RiptideResult;
use crate::types::RowKey;

/// A candidate handed to the reranker: the row identity plus the text field
/// the relevance model scores against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankCandidate {
    pub key: RowKey,
    pub text: String,
}

/// A reranker verdict for one candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankedItem {
    pub key: RowKey,
    pub score: f64,
}

/// Core Reranker trait - all reranker providers implement this.
///
/// Providers may return a strict subset of the candidates; the pipeline
/// drops the missing ones from the final output. The returned order is the
/// tie-break when scores are equal.
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Rerank candidates by relevance to the query.
    async fn rerank(
        &self,
        query: &str,
        candidates: Vec<RerankCandidate>,
        limit: Option<usize>,
    ) -> RiptideResult<Vec<RerankedItem>>;

    /// Get the model name.
    fn model_name(&self) -> &str;
}

/// Reranker provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankerConfig {
    /// Model name/identifier.
    pub model: String,
    /// API key (if not using the provider's environment variable).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Override the provider endpoint base URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Top-N results to request from the provider.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_top_n() -> usize {
    10
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            api_key: None,
            base_url: None,
            top_n: default_top_n(),
        }
    }
}
