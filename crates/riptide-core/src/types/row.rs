//! Scored rows, per-channel ranked lists, and fused output rows.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::RowKey;

/// One retrieval method producing an independently ordered candidate list.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Channel {
    /// Vector similarity search. Native score is a distance, lower is better.
    Vector,
    /// Full-text match search. Native score is a match score, higher is better.
    Fulltext,
}

/// A row produced by one retrieval channel.
///
/// `score` carries the channel's native meaning: a distance for the vector
/// channel, a match score for the fulltext channel. `payload` is the full row
/// data and passes through fusion untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredRow {
    pub key: RowKey,
    pub score: f64,
    pub payload: Map<String, Value>,
}

impl ScoredRow {
    /// Create a row without payload columns (enough for fusion itself).
    pub fn new(key: impl Into<RowKey>, score: f64) -> Self {
        Self {
            key: key.into(),
            score,
            payload: Map::new(),
        }
    }

    /// Create a row carrying its full column payload.
    pub fn with_payload(key: impl Into<RowKey>, score: f64, payload: Map<String, Value>) -> Self {
        Self {
            key: key.into(),
            score,
            payload,
        }
    }
}

/// An ordered candidate list from a single channel, best-first per that
/// channel's native convention.
///
/// Built fresh per search invocation and never mutated afterwards; fusion and
/// threshold filtering produce new values instead. Duplicate keys keep the
/// first (best-ranked) occurrence so ranks stay well-defined.
#[derive(Debug, Clone)]
pub struct RankedList {
    channel: Channel,
    rows: Vec<ScoredRow>,
}

impl RankedList {
    /// Create an empty list for a channel.
    pub fn empty(channel: Channel) -> Self {
        Self {
            channel,
            rows: Vec::new(),
        }
    }

    /// Wrap raw channel output, preserving its best-first order.
    pub fn from_rows(channel: Channel, rows: Vec<ScoredRow>) -> Self {
        let mut seen = std::collections::HashSet::new();
        let rows = rows
            .into_iter()
            .filter(|row| seen.insert(row.key.clone()))
            .collect();
        Self { channel, rows }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn rows(&self) -> &[ScoredRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Channel-local pre-filter: keep rows whose raw score passes `keep`,
    /// preserving order. Ranks are reassigned by position in the result, so
    /// filtering happens before fusion ever sees the list.
    pub fn filtered(&self, keep: impl Fn(f64) -> bool) -> RankedList {
        RankedList {
            channel: self.channel,
            rows: self
                .rows
                .iter()
                .filter(|row| keep(row.score))
                .cloned()
                .collect(),
        }
    }
}

/// A row after fusion, carrying per-channel provenance and the unified score.
#[derive(Debug, Clone, Serialize)]
pub struct FusedRow {
    pub key: RowKey,
    /// 1-based rank in the vector channel, absent if the key did not appear.
    pub vector_rank: Option<usize>,
    /// 1-based rank in the fulltext channel, absent if the key did not appear.
    pub fulltext_rank: Option<usize>,
    /// Raw vector-channel distance, passed through for observability.
    pub distance: Option<f64>,
    /// Raw fulltext-channel match score, passed through for observability.
    pub match_score: Option<f64>,
    /// The fused relevance score; meaning is strategy-specific.
    pub score: f64,
    pub payload: Map<String, Value>,
}

/// A final search result row.
///
/// The `_distance`, `_match_score`, and `_score` field names are part of the
/// observable contract consumers rely on; payload columns are flattened
/// alongside them.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub payload: Map<String, Value>,
    #[serde(rename = "_distance")]
    pub distance: Option<f64>,
    #[serde(rename = "_match_score")]
    pub match_score: Option<f64>,
    #[serde(rename = "_score")]
    pub score: f64,
    #[serde(skip)]
    pub key: RowKey,
}

impl From<FusedRow> for SearchHit {
    fn from(row: FusedRow) -> Self {
        Self {
            payload: row.payload,
            distance: row.distance,
            match_score: row.match_score,
            score: row.score,
            key: row.key,
        }
    }
}
