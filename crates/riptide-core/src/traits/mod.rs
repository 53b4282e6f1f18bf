//! Collaborator contracts consumed by the search pipeline.

mod channel;
mod reranker;

pub use channel::{FulltextChannel, VectorChannel};
pub use reranker::{RerankCandidate, RerankedItem, Reranker, RerankerConfig};
