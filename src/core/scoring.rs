use crate::core::forest::RandomForest;
use crate::domain::model::{PairFeatures, ScoredPair};
use std::cmp::Ordering;

/// Rounds to cents, halves to even.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Scores every pair with the fitted forest.
pub fn score_pairs(forest: &RandomForest, pairs: &[PairFeatures], labels: &[u8]) -> Vec<ScoredPair> {
    pairs
        .iter()
        .zip(labels)
        .map(|(features, &match_status)| {
            let row = features.as_vector();
            ScoredPair {
                features: *features,
                match_status,
                predicted: forest.predict(&row),
                confidence_score: round2(forest.predict_proba_match(&row) * 100.0),
            }
        })
        .collect()
}

/// Indices of predicted matches, highest confidence first, then by row position.
pub fn rank_matches(pairs: &[ScoredPair]) -> Vec<usize> {
    let mut ranked: Vec<usize> = pairs
        .iter()
        .enumerate()
        .filter(|(_, p)| p.predicted == 1)
        .map(|(i, _)| i)
        .collect();

    ranked.sort_by(|&a, &b| {
        let (pa, pb) = (&pairs[a], &pairs[b]);
        pb.confidence_score
            .partial_cmp(&pa.confidence_score)
            .unwrap_or(Ordering::Equal)
            .then(pa.features.mt_index.cmp(&pb.features.mt_index))
            .then(pa.features.ledger_index.cmp(&pb.features.ledger_index))
    });

    ranked
}
