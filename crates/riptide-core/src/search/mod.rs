//! Hybrid search: fusion strategies, request options, and the pipeline.
//!
//! The flow for a hybrid search: issue the vector and fulltext channel
//! queries concurrently, wrap their rows into per-channel ranked lists,
//! apply the channel-local score thresholds, fuse into a single ranking,
//! optionally rerank, then apply the result limit.

mod fusion;
mod options;
mod pipeline;

pub use fusion::{FusionConfig, FusionStrategy, RrfFusion, WeightedFusion};
pub use options::{SearchOptions, SearchQuery, SearchType};
pub use pipeline::SearchPipeline;
