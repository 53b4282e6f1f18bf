//! Retrieval channel traits.
//!
//! The channels are external collaborators (the database client); the fusion
//! core only consumes their already-scored, best-first ordered rows. Channel
//! failures surface unmodified as `ChannelQuery` errors - retries, if any,
//! belong to the implementing client, not here.

use async_trait::async_trait;

use crate::error::RiptideResult;
use crate::search::SearchQuery;
use crate::types::ScoredRow;

/// Vector similarity search backend.
#[async_trait]
pub trait VectorChannel: Send + Sync {
    /// Run a vector similarity query.
    ///
    /// Returns rows ordered by ascending distance (best first), each carrying
    /// its distance as the channel score.
    async fn query_vector(
        &self,
        query: &SearchQuery,
        limit: usize,
    ) -> RiptideResult<Vec<ScoredRow>>;
}

/// Full-text match search backend.
#[async_trait]
pub trait FulltextChannel: Send + Sync {
    /// Run a full-text match query.
    ///
    /// Returns rows ordered by descending match score (best first), each
    /// carrying its match score as the channel score.
    async fn query_fulltext(&self, text: &str, limit: usize) -> RiptideResult<Vec<ScoredRow>>;
}
