//! Score fusion strategies for hybrid retrieval.
//!
//! Combines the vector and fulltext ranked lists into a single ranking.
//! Supports Reciprocal Rank Fusion (RRF) for robust fusion without tuning,
//! and weighted score fusion for tunable, per-channel combination.
//!
//! Ties on the fused score are broken deterministically: by vector-channel
//! rank first (present before absent, lower rank first), then by key
//! ascending. Output order never depends on input iteration order.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::error::{RiptideError, RiptideResult};
use crate::types::{FusedRow, RankedList, RowKey};

/// A fusion strategy combines the two channel lists, keyed by row identity,
/// into one fused list sorted by descending unified score.
pub trait FusionStrategy: Send + Sync {
    /// Fuse the vector and fulltext ranked lists.
    fn fuse(&self, vector: &RankedList, fulltext: &RankedList) -> RiptideResult<Vec<FusedRow>>;
}

/// Reciprocal Rank Fusion for combining ranked lists.
///
/// Formula: `score(d) = sum(1 / (k + rank_i(d)))` over the channels in which
/// `d` appears, with 1-based ranks. Robust to score scale mismatches between
/// channels.
///
/// Reference: Cormack, Clarke & Buettcher (2009)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RrfFusion {
    /// k dampens the influence of low ranks and keeps rank 1 from dominating.
    /// Default: 60 (standard value from the literature). Must be > 0.
    pub k: f64,
}

impl Default for RrfFusion {
    fn default() -> Self {
        Self { k: 60.0 }
    }
}

impl RrfFusion {
    /// Create RRF fusion with a custom k value.
    pub fn new(k: f64) -> Self {
        Self { k }
    }

    /// Validate the fusion constant.
    pub fn validate(&self) -> RiptideResult<()> {
        if self.k <= 0.0 {
            return Err(RiptideError::invalid_configuration(format!(
                "rrf k must be greater than zero, got {}",
                self.k
            )));
        }
        Ok(())
    }
}

impl FusionStrategy for RrfFusion {
    fn fuse(&self, vector: &RankedList, fulltext: &RankedList) -> RiptideResult<Vec<FusedRow>> {
        self.validate()?;

        let mut fused = collect_rows(vector, fulltext);
        for row in fused.values_mut() {
            let mut score = 0.0;
            if let Some(rank) = row.vector_rank {
                score += 1.0 / (self.k + rank as f64);
            }
            if let Some(rank) = row.fulltext_rank {
                score += 1.0 / (self.k + rank as f64);
            }
            row.score = score;
        }

        Ok(into_ranked(fused))
    }
}

/// Weighted score fusion for combining normalized channel scores.
///
/// Vector distances are mapped to similarities with the reciprocal transform
/// `1 / (1 + distance)`, which handles unbounded distances. Fulltext match
/// scores are min-max normalized within the query's own result list, so
/// normalization is query-local and stable. The fused score is the weighted
/// sum of the normalized channel scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightedFusion {
    /// Weight for the vector channel. Must be non-negative.
    pub vector_weight: f64,
    /// Weight for the fulltext channel. Must be non-negative.
    pub fulltext_weight: f64,
}

impl Default for WeightedFusion {
    fn default() -> Self {
        Self {
            vector_weight: 0.5,
            fulltext_weight: 0.5,
        }
    }
}

impl WeightedFusion {
    /// Create weighted fusion with custom channel weights.
    pub fn new(vector_weight: f64, fulltext_weight: f64) -> Self {
        Self {
            vector_weight,
            fulltext_weight,
        }
    }

    /// Validate the channel weights.
    ///
    /// All-zero weights are rejected rather than silently producing an
    /// arbitrary ordering where every key scores 0.
    pub fn validate(&self) -> RiptideResult<()> {
        if self.vector_weight < 0.0 || self.fulltext_weight < 0.0 {
            return Err(RiptideError::invalid_configuration(format!(
                "fusion weights must be non-negative, got vector={} fulltext={}",
                self.vector_weight, self.fulltext_weight
            )));
        }
        if self.vector_weight == 0.0 && self.fulltext_weight == 0.0 {
            return Err(RiptideError::invalid_configuration(
                "fusion weights must not all be zero",
            ));
        }
        Ok(())
    }
}

impl FusionStrategy for WeightedFusion {
    fn fuse(&self, vector: &RankedList, fulltext: &RankedList) -> RiptideResult<Vec<FusedRow>> {
        self.validate()?;

        // Min-max bounds for the fulltext list, computed per query.
        let (fts_min, fts_max) = fulltext
            .rows()
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), row| {
                (min.min(row.score), max.max(row.score))
            });

        let mut fused = collect_rows(vector, fulltext);
        for row in fused.values_mut() {
            let mut score = 0.0;
            if let Some(distance) = row.distance {
                score += self.vector_weight * (1.0 / (1.0 + distance));
            }
            if let Some(match_score) = row.match_score {
                let normalized = if fts_max > fts_min {
                    (match_score - fts_min) / (fts_max - fts_min)
                } else {
                    // Single row or all-equal scores: every match is a full match.
                    1.0
                };
                score += self.fulltext_weight * normalized;
            }
            row.score = score;
        }

        Ok(into_ranked(fused))
    }
}

/// Union the two lists into per-key fused rows with ranks and raw scores
/// recorded, scores left at zero. BTreeMap keeps key iteration deterministic.
fn collect_rows(vector: &RankedList, fulltext: &RankedList) -> BTreeMap<RowKey, FusedRow> {
    let mut fused: BTreeMap<RowKey, FusedRow> = BTreeMap::new();

    for (index, row) in vector.rows().iter().enumerate() {
        fused.insert(
            row.key.clone(),
            FusedRow {
                key: row.key.clone(),
                vector_rank: Some(index + 1),
                fulltext_rank: None,
                distance: Some(row.score),
                match_score: None,
                score: 0.0,
                payload: row.payload.clone(),
            },
        );
    }

    for (index, row) in fulltext.rows().iter().enumerate() {
        let entry = fused.entry(row.key.clone()).or_insert_with(|| FusedRow {
            key: row.key.clone(),
            vector_rank: None,
            fulltext_rank: None,
            distance: None,
            match_score: None,
            score: 0.0,
            payload: row.payload.clone(),
        });
        entry.fulltext_rank = Some(index + 1);
        entry.match_score = Some(row.score);
    }

    fused
}

/// Sort fused rows into the final order: score descending, then the
/// deterministic tie-break.
fn into_ranked(fused: BTreeMap<RowKey, FusedRow>) -> Vec<FusedRow> {
    let mut rows: Vec<_> = fused.into_values().collect();
    rows.sort_by(|a, b| {
        OrderedFloat(b.score)
            .cmp(&OrderedFloat(a.score))
            .then_with(|| compare_ranks(a.vector_rank, b.vector_rank))
            .then_with(|| a.key.cmp(&b.key))
    });
    rows
}

fn compare_ranks(a: Option<usize>, b: Option<usize>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Fusion method selection and parameters, as recognized on the
/// configuration surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum FusionConfig {
    /// Reciprocal Rank Fusion with constant `k`.
    Rrf {
        #[serde(default = "default_rrf_k")]
        k: f64,
    },
    /// Weighted score fusion with per-channel weights.
    Weighted {
        #[serde(default = "default_weight")]
        vector_weight: f64,
        #[serde(default = "default_weight")]
        fulltext_weight: f64,
    },
}

fn default_rrf_k() -> f64 {
    60.0
}

fn default_weight() -> f64 {
    0.5
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self::Rrf { k: default_rrf_k() }
    }
}

impl FusionConfig {
    /// Validate the fusion parameters without constructing a strategy.
    pub fn validate(&self) -> RiptideResult<()> {
        match *self {
            Self::Rrf { k } => RrfFusion::new(k).validate(),
            Self::Weighted {
                vector_weight,
                fulltext_weight,
            } => WeightedFusion::new(vector_weight, fulltext_weight).validate(),
        }
    }

    /// Build the configured strategy.
    pub fn strategy(&self) -> RiptideResult<Box<dyn FusionStrategy>> {
        self.validate()?;
        Ok(match *self {
            Self::Rrf { k } => Box::new(RrfFusion::new(k)),
            Self::Weighted {
                vector_weight,
                fulltext_weight,
            } => Box::new(WeightedFusion::new(vector_weight, fulltext_weight)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Channel, ScoredRow};

    fn vector_list(keys: &[&str]) -> RankedList {
        RankedList::from_rows(
            Channel::Vector,
            keys.iter()
                .enumerate()
                .map(|(i, key)| ScoredRow::new(*key, 0.1 * (i as f64 + 1.0)))
                .collect(),
        )
    }

    fn fulltext_list(keys: &[&str]) -> RankedList {
        RankedList::from_rows(
            Channel::Fulltext,
            keys.iter()
                .enumerate()
                .map(|(i, key)| ScoredRow::new(*key, 3.0 - i as f64 * 0.5))
                .collect(),
        )
    }

    #[test]
    fn test_rrf_worked_example() {
        // vector [A, B, C], fulltext [C, A], k = 60:
        //   score(A) = 1/61 + 1/62, score(C) = 1/63 + 1/61, score(B) = 1/62
        let rrf = RrfFusion::default();
        let fused = rrf
            .fuse(&vector_list(&["A", "B", "C"]), &fulltext_list(&["C", "A"]))
            .unwrap();

        let order: Vec<_> = fused.iter().map(|r| r.key.to_string()).collect();
        assert_eq!(order, vec!["A", "C", "B"]);

        assert!((fused[0].score - (1.0 / 61.0 + 1.0 / 62.0)).abs() < 1e-9);
        assert!((fused[1].score - (1.0 / 63.0 + 1.0 / 61.0)).abs() < 1e-9);
        assert!((fused[2].score - 1.0 / 62.0).abs() < 1e-9);

        assert_eq!(fused[0].vector_rank, Some(1));
        assert_eq!(fused[0].fulltext_rank, Some(2));
        assert_eq!(fused[2].fulltext_rank, None);
    }

    #[test]
    fn test_rrf_disjoint_keys_union() {
        let rrf = RrfFusion::default();
        let fused = rrf
            .fuse(&vector_list(&["a", "b"]), &fulltext_list(&["c", "d"]))
            .unwrap();

        assert_eq!(fused.len(), 4);
        for row in &fused {
            // Exactly one channel contributes to each score.
            let single = match (row.vector_rank, row.fulltext_rank) {
                (Some(rank), None) | (None, Some(rank)) => 1.0 / (60.0 + rank as f64),
                _ => panic!("key should appear in exactly one channel"),
            };
            assert!((row.score - single).abs() < 1e-9);
        }
    }

    #[test]
    fn test_rrf_both_channels_beats_single_terms() {
        let rrf = RrfFusion::default();
        let fused = rrf
            .fuse(&vector_list(&["a", "b"]), &fulltext_list(&["b", "c"]))
            .unwrap();

        let b = fused.iter().find(|r| r.key == "b".into()).unwrap();
        let expected = 1.0 / 62.0 + 1.0 / 61.0;
        assert!((b.score - expected).abs() < 1e-9);
        assert!(b.score > 1.0 / 62.0);
        assert!(b.score > 1.0 / 61.0);
    }

    #[test]
    fn test_rrf_output_sorted_descending() {
        let rrf = RrfFusion::default();
        let fused = rrf
            .fuse(
                &vector_list(&["a", "b", "c", "d"]),
                &fulltext_list(&["d", "e", "a"]),
            )
            .unwrap();

        for pair in fused.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_rrf_deterministic() {
        let rrf = RrfFusion::default();
        let vector = vector_list(&["a", "b", "c"]);
        let fulltext = fulltext_list(&["c", "d"]);

        let first = rrf.fuse(&vector, &fulltext).unwrap();
        let second = rrf.fuse(&vector, &fulltext).unwrap();

        let keys = |rows: &[FusedRow]| rows.iter().map(|r| r.key.clone()).collect::<Vec<_>>();
        assert_eq!(keys(&first), keys(&second));
    }

    #[test]
    fn test_rrf_tie_break_prefers_vector_rank_then_key() {
        // "x" at vector rank 2 and "y" at fulltext rank 2 score identically;
        // vector presence wins. "a"/"b" both at rank 1 of their own channel
        // tie as well; vector presence puts "a" first.
        let rrf = RrfFusion::default();
        let fused = rrf
            .fuse(&vector_list(&["a", "x"]), &fulltext_list(&["b", "y"]))
            .unwrap();

        let order: Vec<_> = fused.iter().map(|r| r.key.to_string()).collect();
        assert_eq!(order, vec!["a", "b", "x", "y"]);
    }

    #[test]
    fn test_rrf_empty_inputs() {
        let rrf = RrfFusion::default();

        let fused = rrf
            .fuse(&vector_list(&["a", "b"]), &fulltext_list(&[]))
            .unwrap();
        assert_eq!(fused.len(), 2);
        assert!((fused[0].score - 1.0 / 61.0).abs() < 1e-9);

        let fused = rrf
            .fuse(&vector_list(&[]), &fulltext_list(&[]))
            .unwrap();
        assert!(fused.is_empty());
    }

    #[test]
    fn test_rrf_rejects_non_positive_k() {
        let err = RrfFusion::new(0.0)
            .fuse(&vector_list(&["a"]), &fulltext_list(&[]))
            .unwrap_err();
        assert!(matches!(err, RiptideError::InvalidConfiguration(_)));

        assert!(RrfFusion::new(-1.0).validate().is_err());
        assert!(RrfFusion::new(60.0).validate().is_ok());
    }

    #[test]
    fn test_weighted_normalization_and_order() {
        // Vector: a at distance 0.0 (sim 1.0), b at 1.0 (sim 0.5).
        // Fulltext: b at 3.0 (norm 1.0), c at 1.0 (norm 0.0).
        let vector = RankedList::from_rows(
            Channel::Vector,
            vec![ScoredRow::new("a", 0.0), ScoredRow::new("b", 1.0)],
        );
        let fulltext = RankedList::from_rows(
            Channel::Fulltext,
            vec![ScoredRow::new("b", 3.0), ScoredRow::new("c", 1.0)],
        );

        let fused = WeightedFusion::default().fuse(&vector, &fulltext).unwrap();
        let b = fused.iter().find(|r| r.key == "b".into()).unwrap();
        assert!((b.score - (0.5 * 0.5 + 0.5 * 1.0)).abs() < 1e-9);

        let order: Vec<_> = fused.iter().map(|r| r.key.to_string()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_weighted_all_equal_match_scores() {
        let fulltext = RankedList::from_rows(
            Channel::Fulltext,
            vec![ScoredRow::new("a", 2.0), ScoredRow::new("b", 2.0)],
        );
        let fused = WeightedFusion::new(0.0, 1.0)
            .fuse(&RankedList::empty(Channel::Vector), &fulltext)
            .unwrap();

        // Degenerate min-max range treats every match as full strength.
        assert!((fused[0].score - 1.0).abs() < 1e-9);
        assert!((fused[1].score - 1.0).abs() < 1e-9);
        // Equal scores, neither in the vector channel: key order decides.
        assert_eq!(fused[0].key, "a".into());
    }

    #[test]
    fn test_weighted_rejects_bad_weights() {
        assert!(matches!(
            WeightedFusion::new(0.0, 0.0).validate().unwrap_err(),
            RiptideError::InvalidConfiguration(_)
        ));
        assert!(WeightedFusion::new(-0.1, 0.5).validate().is_err());
        assert!(WeightedFusion::new(0.7, 0.3).validate().is_ok());
        // Weights need not sum to 1.
        assert!(WeightedFusion::new(2.0, 1.0).validate().is_ok());
    }

    #[test]
    fn test_fusion_config_selects_strategy() {
        assert!(FusionConfig::default().validate().is_ok());
        assert!(FusionConfig::Rrf { k: 0.0 }.strategy().is_err());

        let config: FusionConfig =
            serde_json::from_str(r#"{"method": "rrf", "k": 30}"#).unwrap();
        assert!(matches!(config, FusionConfig::Rrf { k } if (k - 30.0).abs() < 1e-9));

        let config: FusionConfig = serde_json::from_str(r#"{"method": "weighted"}"#).unwrap();
        assert!(config.strategy().is_ok());
    }
}
