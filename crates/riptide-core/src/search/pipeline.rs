//! Search pipeline orchestration.
//!
//! A pipeline invocation is stateless: channel queries run, their ranked
//! lists join, fusion and the optional rerank pass run synchronously on the
//! in-memory lists, and the limit is applied last. The only suspension
//! points are the two channel calls and the reranker call; dropping the
//! `search` future cancels whatever is in flight.

use std::collections::HashMap;
use std::sync::Arc;

use ordered_float::OrderedFloat;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{RiptideError, RiptideResult};
use crate::search::{SearchOptions, SearchQuery, SearchType};
use crate::traits::{FulltextChannel, RerankCandidate, Reranker, VectorChannel};
use crate::types::{Channel, FusedRow, RankedList, RowKey, SearchHit};

/// Orchestrates channel queries, fusion, reranking, and the result limit.
///
/// Channels and the reranker are injected; the pipeline owns no resources
/// beyond those handles and holds no state across invocations, so one
/// pipeline can serve concurrent searches.
#[derive(Default, Clone)]
pub struct SearchPipeline {
    vector: Option<Arc<dyn VectorChannel>>,
    fulltext: Option<Arc<dyn FulltextChannel>>,
    reranker: Option<Arc<dyn Reranker>>,
    rerank_field: Option<String>,
}

impl SearchPipeline {
    /// Create an empty pipeline; attach channels with the `with_*` builders.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the vector similarity channel.
    pub fn with_vector(mut self, channel: Arc<dyn VectorChannel>) -> Self {
        self.vector = Some(channel);
        self
    }

    /// Attach the full-text match channel.
    pub fn with_fulltext(mut self, channel: Arc<dyn FulltextChannel>) -> Self {
        self.fulltext = Some(channel);
        self
    }

    /// Attach a reranker. `rerank_field` names the payload column whose text
    /// is handed to the relevance model.
    pub fn with_reranker(
        mut self,
        reranker: Arc<dyn Reranker>,
        rerank_field: impl Into<String>,
    ) -> Self {
        self.reranker = Some(reranker);
        self.rerank_field = Some(rerank_field.into());
        self
    }

    /// Run a search and return the final ordered results.
    pub async fn search(
        &self,
        query: &SearchQuery,
        options: &SearchOptions,
    ) -> RiptideResult<Vec<SearchHit>> {
        options.validate()?;

        let fused = match options.search_type {
            SearchType::Vector => self.search_vector(query, options).await?,
            SearchType::Fulltext => self.search_fulltext(query, options).await?,
            SearchType::Hybrid => self.search_hybrid(query, options).await?,
        };

        let mut rows = match &self.reranker {
            Some(reranker) => {
                self.rerank_rows(reranker.as_ref(), query, fused, options)
                    .await?
            }
            None => fused,
        };

        rows.truncate(options.limit);
        debug!(results = rows.len(), "search complete");
        Ok(rows.into_iter().map(SearchHit::from).collect())
    }

    /// Vector-only search. Hits surface `score = 1 - distance`.
    async fn search_vector(
        &self,
        query: &SearchQuery,
        options: &SearchOptions,
    ) -> RiptideResult<Vec<FusedRow>> {
        let list = self.query_vector_list(query, options).await?;
        Ok(list
            .rows()
            .iter()
            .enumerate()
            .map(|(index, row)| FusedRow {
                key: row.key.clone(),
                vector_rank: Some(index + 1),
                fulltext_rank: None,
                distance: Some(row.score),
                match_score: None,
                score: 1.0 - row.score,
                payload: row.payload.clone(),
            })
            .collect())
    }

    /// Fulltext-only search. Hits surface the match score directly.
    async fn search_fulltext(
        &self,
        query: &SearchQuery,
        options: &SearchOptions,
    ) -> RiptideResult<Vec<FusedRow>> {
        let list = self.query_fulltext_list(query, options).await?;
        Ok(list
            .rows()
            .iter()
            .enumerate()
            .map(|(index, row)| FusedRow {
                key: row.key.clone(),
                vector_rank: None,
                fulltext_rank: Some(index + 1),
                distance: None,
                match_score: Some(row.score),
                score: row.score,
                payload: row.payload.clone(),
            })
            .collect())
    }

    /// Hybrid search: both channels concurrently, join, then fuse.
    async fn search_hybrid(
        &self,
        query: &SearchQuery,
        options: &SearchOptions,
    ) -> RiptideResult<Vec<FusedRow>> {
        // Both channels must be configured and the fulltext channel needs
        // query text; check before issuing any I/O.
        self.require_vector()?;
        self.require_fulltext()?;
        require_text(query)?;

        let (vector, fulltext) = tokio::join!(
            self.query_vector_list(query, options),
            self.query_fulltext_list(query, options),
        );

        // A failed channel aborts the search: partial hybrid results would
        // silently change relevance semantics. `allow_degraded` is the
        // explicit opt-in; with both channels failed it still aborts.
        let (vector, fulltext) = match (vector, fulltext) {
            (Ok(vector), Ok(fulltext)) => (vector, fulltext),
            (Ok(vector), Err(err)) if options.allow_degraded => {
                warn!(error = %err, "fulltext channel failed, degrading to vector-only results");
                (vector, RankedList::empty(Channel::Fulltext))
            }
            (Err(err), Ok(fulltext)) if options.allow_degraded => {
                warn!(error = %err, "vector channel failed, degrading to fulltext-only results");
                (RankedList::empty(Channel::Vector), fulltext)
            }
            (Err(err), _) | (_, Err(err)) => return Err(err),
        };

        debug!(
            vector_rows = vector.len(),
            fulltext_rows = fulltext.len(),
            "channel queries complete"
        );

        let strategy = options.fusion.strategy()?;
        let fused = strategy.fuse(&vector, &fulltext)?;
        debug!(fused_rows = fused.len(), "fusion complete");
        Ok(fused)
    }

    async fn query_vector_list(
        &self,
        query: &SearchQuery,
        options: &SearchOptions,
    ) -> RiptideResult<RankedList> {
        let channel = self.require_vector()?;
        let rows = channel.query_vector(query, options.candidate_pool()).await?;
        let list = RankedList::from_rows(Channel::Vector, rows);
        Ok(match options.distance_threshold {
            Some(threshold) => list.filtered(|distance| distance <= threshold),
            None => list,
        })
    }

    async fn query_fulltext_list(
        &self,
        query: &SearchQuery,
        options: &SearchOptions,
    ) -> RiptideResult<RankedList> {
        let channel = self.require_fulltext()?;
        let text = require_text(query)?;
        let rows = channel
            .query_fulltext(text, options.candidate_pool())
            .await?;
        let list = RankedList::from_rows(Channel::Fulltext, rows);
        Ok(match options.match_score_threshold {
            Some(threshold) => list.filtered(|score| score >= threshold),
            None => list,
        })
    }

    /// Hand the candidate set to the reranker and adopt its scores.
    ///
    /// Candidates the reranker leaves out are dropped from the final output.
    /// The stable sort keeps the reranker's returned order as the tie-break
    /// for equal scores.
    async fn rerank_rows(
        &self,
        reranker: &dyn Reranker,
        query: &SearchQuery,
        rows: Vec<FusedRow>,
        options: &SearchOptions,
    ) -> RiptideResult<Vec<FusedRow>> {
        if rows.is_empty() {
            return Ok(rows);
        }

        let field = self.rerank_field.as_deref().ok_or_else(|| {
            RiptideError::invalid_configuration("reranker configured without a rerank field")
        })?;
        let text = require_text(query)?;

        let candidates = rows
            .iter()
            .map(|row| {
                let value = row.payload.get(field).and_then(Value::as_str).ok_or_else(|| {
                    RiptideError::invalid_argument(format!(
                        "rerank field '{}' is missing or not a string in row {}",
                        field, row.key
                    ))
                })?;
                Ok(RerankCandidate {
                    key: row.key.clone(),
                    text: value.to_string(),
                })
            })
            .collect::<RiptideResult<Vec<_>>>()?;

        let items = reranker
            .rerank(text, candidates, Some(options.limit))
            .await?;
        debug!(
            model = reranker.model_name(),
            candidates = rows.len(),
            returned = items.len(),
            "rerank complete"
        );

        let mut by_key: HashMap<RowKey, FusedRow> =
            rows.into_iter().map(|row| (row.key.clone(), row)).collect();

        let mut reranked: Vec<FusedRow> = items
            .into_iter()
            .filter_map(|item| {
                by_key.remove(&item.key).map(|mut row| {
                    row.score = item.score;
                    row
                })
            })
            .collect();
        reranked.sort_by_key(|row| std::cmp::Reverse(OrderedFloat(row.score)));
        Ok(reranked)
    }

    fn require_vector(&self) -> RiptideResult<&Arc<dyn VectorChannel>> {
        self.vector.as_ref().ok_or_else(|| {
            RiptideError::invalid_configuration("no vector channel configured for this pipeline")
        })
    }

    fn require_fulltext(&self) -> RiptideResult<&Arc<dyn FulltextChannel>> {
        self.fulltext.as_ref().ok_or_else(|| {
            RiptideError::invalid_configuration("no fulltext channel configured for this pipeline")
        })
    }
}

fn require_text(query: &SearchQuery) -> RiptideResult<&str> {
    query.text.as_deref().ok_or_else(|| {
        RiptideError::invalid_argument("query text is required for this operation")
    })
}
