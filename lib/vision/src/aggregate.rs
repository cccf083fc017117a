//! Multi-photo consensus
//!
//! Several photos of one garment vote on its category: confidences are summed
//! per label, renormalized and the top three kept.

use crate::classifier::Classification;
use modaics_core::{round3, AttributePrediction};
use serde::{Deserialize, Serialize};

/// Labels kept in an aggregated ranking
pub const AGGREGATE_TOP_N: usize = 3;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AggregatedPredictions {
    pub category: Vec<AttributePrediction>,
}

/// Consensus over the per-photo classifications
pub fn aggregate(results: &[Classification]) -> AggregatedPredictions {
    AggregatedPredictions {
        category: vote(results.iter().map(|r| r.category.as_slice()), AGGREGATE_TOP_N),
    }
}

/// Confidence-weighted vote; labels keep first-seen order on equal weight
pub fn vote<'a, I>(ballots: I, top_n: usize) -> Vec<AttributePrediction>
where
    I: IntoIterator<Item = &'a [AttributePrediction]>,
{
    let mut tally: Vec<(&'a str, f32)> = Vec::new();
    for ballot in ballots {
        for prediction in ballot {
            match tally.iter_mut().find(|(label, _)| *label == prediction.label) {
                Some((_, weight)) => *weight += prediction.confidence,
                None => tally.push((prediction.label.as_str(), prediction.confidence)),
            }
        }
    }

    let total: f32 = tally.iter().map(|(_, w)| w).sum();
    if total <= 0.0 {
        return Vec::new();
    }

    tally.sort_by(|a, b| b.1.total_cmp(&a.1));
    tally
        .into_iter()
        .take(top_n)
        .map(|(label, weight)| AttributePrediction::new(label, round3(weight / total)))
        .collect()
}
