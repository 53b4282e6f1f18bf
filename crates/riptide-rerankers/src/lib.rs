//! riptide-rerankers - Reranker providers for riptide.
//!
//! This crate provides HTTP reranker implementations for reordering search
//! results by model-scored relevance, plus an explicit registry for
//! selecting a provider by name at startup.
//!
//! # Supported Backends
//!
//! - **Cohere** (feature: `cohere`) - Cohere Rerank API
//! - **Jina** (feature: `jina`) - Jina Reranker API

mod registry;

#[cfg(feature = "cohere")]
mod cohere;

#[cfg(feature = "jina")]
mod jina;

pub use registry::RerankerRegistry;

#[cfg(feature = "cohere")]
pub use cohere::CohereReranker;

#[cfg(feature = "jina")]
pub use jina::JinaReranker;

// Re-export core types
pub use riptide_core::traits::{RerankCandidate, RerankedItem, Reranker, RerankerConfig};
