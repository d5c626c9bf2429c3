use crate::core::columns::ResolvedColumns;
use crate::core::features::extract_features;
use crate::core::forest::{FeatureVector, ForestParams, RandomForest};
use crate::core::labels::{label_rng, synthetic_labels};
use crate::core::scoring::{rank_matches, score_pairs};
use crate::core::split::train_test_split;
use crate::domain::model::{
    ColumnMap, ConfidenceBands, ModelParams, PairFeatures, ReconResult, ReconSummary, SourceTables,
};
use crate::utils::error::{ReconError, Result};

/// Runs one full reconciliation pass over the two loaded tables.
pub fn reconcile(
    tables: SourceTables,
    columns: &ColumnMap,
    params: &ModelParams,
    bands: ConfidenceBands,
) -> Result<ReconResult> {
    for table in [&tables.expected, &tables.posted] {
        if table.is_empty() {
            return Err(ReconError::InsufficientData {
                message: format!("{} has no data rows", table.label),
            });
        }
    }

    let expected_cols = ResolvedColumns::resolve(&tables.expected, columns)?;
    let posted_cols = ResolvedColumns::resolve(&tables.posted, columns)?;

    let pairs = extract_features(&tables.expected, &expected_cols, &tables.posted, &posted_cols)?;
    tracing::info!(
        "Evaluating {} x {} = {} pairs",
        tables.expected.len(),
        tables.posted.len(),
        pairs.len()
    );

    let labels = synthetic_labels(pairs.len(), params.match_rate, &mut label_rng(params.label_seed))?;
    let split = train_test_split(pairs.len(), params.test_size, params.random_state)?;

    let x: Vec<FeatureVector> = pairs.iter().map(PairFeatures::as_vector).collect();
    let select = |indices: &[usize]| -> (Vec<FeatureVector>, Vec<u8>) {
        indices.iter().map(|&i| (x[i], labels[i])).unzip()
    };
    let (train_x, train_y) = select(&split.train);
    let (test_x, test_y) = select(&split.test);

    tracing::debug!(
        "Training on {} pairs, holding out {} (n_estimators={}, random_state={})",
        train_x.len(),
        test_x.len(),
        params.n_estimators,
        params.random_state
    );
    let forest = RandomForest::fit(&train_x, &train_y, &ForestParams::from(params))?;

    let holdout_accuracy = forest.score(&test_x, &test_y);
    tracing::info!("Hold-out accuracy: {:.2}%", holdout_accuracy * 100.0);

    let scored = score_pairs(&forest, &pairs, &labels);
    let ranked_matches = rank_matches(&scored);
    let summary = ReconSummary::build(
        tables.expected.len(),
        tables.posted.len(),
        &scored,
        bands,
        Some(holdout_accuracy),
    );

    Ok(ReconResult {
        tables,
        pairs: scored,
        ranked_matches,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Table;

    fn table(label: &str, prefix: &str, headers: &[&str], rows: &[&[&str]]) -> Table {
        let mut t = Table::new(label, prefix, headers.iter().map(|s| s.to_string()).collect());
        t.rows = rows
            .iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect();
        t
    }

    fn seeded() -> ModelParams {
        ModelParams {
            n_estimators: 10,
            label_seed: Some(3),
            ..ModelParams::default()
        }
    }

    fn sample_tables() -> SourceTables {
        SourceTables {
            expected: table(
                "mt.csv",
                "mt_",
                &["amount", "date", "currency"],
                &[
                    &["100", "01/01/2024", "USD"],
                    &["200", "02/01/2024", "USD"],
                    &["300", "03/01/2024", "EUR"],
                ],
            ),
            posted: table(
                "ledger.csv",
                "ledger_",
                &["amt", "txn_date", "ccy"],
                &[
                    &["100", "01/01/2024", "USD"],
                    &["205", "04/01/2024", "USD"],
                    &["300", "03/01/2024", "EUR"],
                    &["50", "09/01/2024", "GBP"],
                ],
            ),
        }
    }

    #[test]
    fn test_reconcile_scores_every_pair() {
        let result = reconcile(
            sample_tables(),
            &ColumnMap::default(),
            &seeded(),
            ConfidenceBands::default(),
        )
        .unwrap();

        assert_eq!(result.pairs.len(), 12);
        assert_eq!(result.summary.total_pairs, 12);
        assert_eq!(result.summary.file1_entries, 3);
        assert_eq!(result.summary.file2_entries, 4);
        assert_eq!(result.summary.predicted_matches, result.ranked_matches.len());
        assert!(result.summary.holdout_accuracy.is_some());
        assert!(result
            .pairs
            .iter()
            .all(|p| (0.0..=100.0).contains(&p.confidence_score)));
        assert!(result.likely_matches().all(|p| p.predicted == 1));
    }

    #[test]
    fn test_reconcile_is_reproducible_with_seeds() {
        let run = || {
            reconcile(sample_tables(), &ColumnMap::default(), &seeded(), ConfidenceBands::default())
                .unwrap()
        };
        assert_eq!(run().pairs, run().pairs);
    }

    #[test]
    fn test_all_negative_labels_predict_nothing() {
        let params = ModelParams {
            match_rate: 0.0,
            ..seeded()
        };
        let result = reconcile(sample_tables(), &ColumnMap::default(), &params, ConfidenceBands::default())
            .unwrap();
        assert!(result.ranked_matches.is_empty());
        assert!(result.pairs.iter().all(|p| p.confidence_score == 0.0));
        assert_eq!(result.summary.low_confidence, 12);
    }

    #[test]
    fn test_all_positive_labels_match_everything() {
        let params = ModelParams {
            match_rate: 1.0,
            ..seeded()
        };
        let result = reconcile(sample_tables(), &ColumnMap::default(), &params, ConfidenceBands::default())
            .unwrap();
        assert_eq!(result.ranked_matches.len(), 12);
        assert_eq!(result.summary.high_confidence, 12);
        // Equal confidence everywhere, so ranking falls back to row order.
        let first = &result.pairs[result.ranked_matches[0]].features;
        assert_eq!((first.mt_index, first.ledger_index), (0, 0));
    }

    #[test]
    fn test_empty_table_is_rejected() {
        let mut tables = sample_tables();
        tables.posted.rows.clear();
        let err = reconcile(tables, &ColumnMap::default(), &seeded(), ConfidenceBands::default())
            .unwrap_err();
        assert!(matches!(err, ReconError::InsufficientData { .. }));
    }

    #[test]
    fn test_single_pair_cannot_be_split() {
        let tables = SourceTables {
            expected: table("mt.csv", "mt_", &["amount", "date"], &[&["1", "01/01/2024"]]),
            posted: table("ld.csv", "ledger_", &["amount", "date"], &[&["1", "01/01/2024"]]),
        };
        let err = reconcile(tables, &ColumnMap::default(), &seeded(), ConfidenceBands::default())
            .unwrap_err();
        assert!(matches!(err, ReconError::InsufficientData { .. }));
    }

    #[test]
    fn test_out_of_range_match_rate_is_an_error() {
        let params = ModelParams {
            match_rate: 1.5,
            ..seeded()
        };
        let err = reconcile(sample_tables(), &ColumnMap::default(), &params, ConfidenceBands::default())
            .unwrap_err();
        assert!(matches!(err, ReconError::InvalidConfigValueError { .. }));
    }
}
