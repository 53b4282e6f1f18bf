//! Core data types for the fusion pipeline.

mod key;
mod row;

pub use key::RowKey;
pub use row::{Channel, FusedRow, RankedList, ScoredRow, SearchHit};
