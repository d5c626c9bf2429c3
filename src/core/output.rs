use crate::domain::model::{format_float, ReconResult};
use crate::utils::error::{ReconError, Result};

pub const DEFAULT_FILENAME: &str = "reconciliation_predictions_output.csv";

const RESULT_COLUMNS: [&str; 10] = [
    "mt_index",
    "ledger_index",
    "amount_diff",
    "date_diff",
    "currency_match",
    "desc_match",
    "match_status",
    "Predicted_Match",
    "Confidence_Score",
    "Match_Confidence",
];

/// Renders ranked likely matches, each joined with its File 1 and File 2 row.
pub fn render_matches_csv(result: &ReconResult) -> Result<Vec<u8>> {
    let expected = &result.tables.expected;
    let posted = &result.tables.posted;

    let mut writer = csv::Writer::from_writer(Vec::new());

    let header: Vec<String> = RESULT_COLUMNS
        .iter()
        .map(|s| s.to_string())
        .chain(expected.prefixed_headers())
        .chain(posted.prefixed_headers())
        .collect();
    writer.write_record(&header)?;

    for pair in result.likely_matches() {
        let f = &pair.features;
        let mut record = vec![
            f.mt_index.to_string(),
            f.ledger_index.to_string(),
            format_float(f.amount_diff),
            f.date_diff.to_string(),
            f.currency_match.to_string(),
            f.desc_match.to_string(),
            pair.match_status.to_string(),
            pair.predicted.to_string(),
            format_float(pair.confidence_score),
            pair.match_confidence(),
        ];
        record.extend((0..expected.headers.len()).map(|c| expected.cell(f.mt_index, c).to_string()));
        record.extend((0..posted.headers.len()).map(|c| posted.cell(f.ledger_index, c).to_string()));
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| ReconError::processing(format!("failed to flush CSV output: {}", e)))
}

/// Plain-text listing of the best `limit` matches for the terminal.
pub fn render_top_matches(result: &ReconResult, limit: usize) -> String {
    let total = result.ranked_matches.len();
    if total == 0 {
        return "🔍 No likely matches predicted".to_string();
    }

    let mut lines = vec![format!(
        "🔍 Likely Matches (showing {} of {})",
        limit.min(total),
        total
    )];
    for (rank, pair) in result.likely_matches().take(limit).enumerate() {
        let f = &pair.features;
        lines.push(format!(
            "{:>4}. File 1 row {:<5} <-> File 2 row {:<5} {:>8}  amount_diff={} date_diff={} currency={} desc={}",
            rank + 1,
            f.mt_index,
            f.ledger_index,
            pair.match_confidence(),
            format_float(f.amount_diff),
            f.date_diff,
            f.currency_match,
            f.desc_match,
        ));
    }
    lines.join("\n")
}
