//! riptide-core - Hybrid search result fusion and ranking.
//!
//! This crate combines heterogeneous ranked result sets (vector-similarity
//! hits and full-text matches) into a single ordered list, optionally
//! followed by a reranking pass. The retrieval channels themselves are
//! external collaborators consumed behind traits; this crate owns the
//! fusion math, the error taxonomy, and the pipeline orchestration.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use riptide_core::{SearchOptions, SearchPipeline, SearchQuery};
//!
//! let pipeline = SearchPipeline::new()
//!     .with_vector(vector_channel)
//!     .with_fulltext(fulltext_channel);
//!
//! let hits = pipeline
//!     .search(
//!         &SearchQuery::text("rust fusion"),
//!         &SearchOptions::hybrid().with_limit(10),
//!     )
//!     .await?;
//! ```

pub mod error;
pub mod search;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{RiptideError, RiptideResult};
pub use search::{
    FusionConfig, FusionStrategy, RrfFusion, SearchOptions, SearchPipeline, SearchQuery,
    SearchType, WeightedFusion,
};
pub use traits::{
    FulltextChannel, RerankCandidate, RerankedItem, Reranker, RerankerConfig, VectorChannel,
};
pub use types::{Channel, FusedRow, RankedList, RowKey, ScoredRow, SearchHit};
