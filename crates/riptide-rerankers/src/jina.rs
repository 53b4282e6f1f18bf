//! Jina reranker implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use riptide_core::error::{RiptideError, RiptideResult};
use riptide_core::traits::{RerankCandidate, RerankedItem, Reranker, RerankerConfig};

const DEFAULT_BASE_URL: &str = "https://api.jina.ai";
const DEFAULT_MODEL: &str = "jina-reranker-v2-base-multilingual";

/// Jina reranker implementation.
pub struct JinaReranker {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct JinaRerankRequest {
    model: String,
    query: String,
    documents: Vec<String>,
    top_n: Option<usize>,
    return_documents: bool,
}

#[derive(Debug, Deserialize)]
struct JinaRerankResponse {
    results: Vec<JinaRerankResult>,
}

#[derive(Debug, Deserialize)]
struct JinaRerankResult {
    index: usize,
    relevance_score: f64,
}

impl JinaReranker {
    /// Create a new Jina reranker.
    pub fn new(config: RerankerConfig) -> RiptideResult<Self> {
        let api_key = config
            .api_key
            .or_else(|| std::env::var("JINA_API_KEY").ok())
            .ok_or_else(|| {
                RiptideError::invalid_configuration(
                    "Jina API key required. Set JINA_API_KEY or provide api_key.",
                )
            })?;

        let model = if config.model.is_empty() {
            DEFAULT_MODEL.to_string()
        } else {
            config.model
        };
        let base_url = config
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            client: Client::new(),
            api_key,
            base_url,
            model,
        })
    }
}

#[async_trait]
impl Reranker for JinaReranker {
    async fn rerank(
        &self,
        query: &str,
        candidates: Vec<RerankCandidate>,
        limit: Option<usize>,
    ) -> RiptideResult<Vec<RerankedItem>> {
        if candidates.is_empty() {
            return Ok(vec![]);
        }

        let documents: Vec<String> = candidates.iter().map(|c| c.text.clone()).collect();

        let request = JinaRerankRequest {
            model: self.model.clone(),
            query: query.to_string(),
            documents,
            top_n: limit,
            return_documents: false,
        };

        let response = self
            .client
            .post(format!("{}/v1/rerank", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| RiptideError::reranker_with_source("Failed to call Jina API", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error = response.text().await.unwrap_or_default();
            return Err(RiptideError::reranker(format!(
                "Jina API error ({}): {}",
                status, error
            )));
        }

        let result: JinaRerankResponse = response
            .json()
            .await
            .map_err(|e| RiptideError::reranker_with_source("Failed to parse Jina response", e))?;

        Ok(result
            .results
            .into_iter()
            .filter_map(|r| {
                candidates.get(r.index).map(|c| RerankedItem {
                    key: c.key.clone(),
                    score: r.relevance_score,
                })
            })
            .collect())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
