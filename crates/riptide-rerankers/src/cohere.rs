//! Cohere reranker implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use riptide_core::error::{RiptideError, RiptideResult};
use riptide_core::traits::{RerankCandidate, RerankedItem, Reranker, RerankerConfig};

const DEFAULT_BASE_URL: &str = "https://api.cohere.ai";
const DEFAULT_MODEL: &str = "rerank-v3.5";

/// Cohere reranker implementation.
pub struct CohereReranker {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct CohereRerankRequest {
    model: String,
    query: String,
    documents: Vec<String>,
    top_n: Option<usize>,
    return_documents: bool,
}

#[derive(Debug, Deserialize)]
struct CohereRerankResponse {
    results: Vec<CohereRerankResult>,
}

#[derive(Debug, Deserialize)]
struct CohereRerankResult {
    index: usize,
    relevance_score: f64,
}

impl CohereReranker {
    /// Create a new Cohere reranker.
    pub fn new(config: RerankerConfig) -> RiptideResult<Self> {
        let api_key = config
            .api_key
            .or_else(|| std::env::var("COHERE_API_KEY").ok())
            .ok_or_else(|| {
                RiptideError::invalid_configuration(
                    "Cohere API key required. Set COHERE_API_KEY or provide api_key.",
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
impl Reranker for CohereReranker {
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

        let request = CohereRerankRequest {
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
            .map_err(|e| RiptideError::reranker_with_source("Failed to call Cohere API", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error = response.text().await.unwrap_or_default();
            return Err(RiptideError::reranker(format!(
                "Cohere API error ({}): {}",
                status, error
            )));
        }

        let result: CohereRerankResponse = response
            .json()
            .await
            .map_err(|e| RiptideError::reranker_with_source("Failed to parse Cohere response", e))?;

        // Cohere returns results sorted by relevance; map indices back to
        // candidate keys and drop out-of-range indices.
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
