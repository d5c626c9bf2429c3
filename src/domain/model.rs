use serde::{Deserialize, Serialize};

/// One input file, loaded in memory with positional row indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Human-readable source name, used in error messages.
    pub label: String,
    /// Prefix applied to every header in the output (`mt_` / `ledger_`).
    pub prefix: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(label: impl Into<String>, prefix: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            label: label.into(),
            prefix: prefix.into(),
            headers,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn prefixed_headers(&self) -> Vec<String> {
        self.headers
            .iter()
            .map(|h| format!("{}{}", self.prefix, h))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct SourceTables {
    pub expected: Table,
    pub posted: Table,
}

/// Header aliases searched for each column role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMap {
    pub amount: Vec<String>,
    pub date: Vec<String>,
    pub currency: Vec<String>,
    pub desc: Vec<String>,
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            amount: owned(&["amount", "amt", "value"]),
            date: owned(&["date", "txn_date", "transaction_date", "post_date"]),
            currency: owned(&["currency", "ccy"]),
            desc: owned(&["desc", "description", "narration", "details"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub test_size: f64,
    pub match_rate: f64,
    pub random_state: u64,
    /// `None` draws the synthetic labels from OS entropy.
    pub label_seed: Option<u64>,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            test_size: 0.3,
            match_rate: 0.2,
            random_state: 42,
            label_seed: None,
        }
    }
}

/// Lower bounds (inclusive, in percent) of the high and medium confidence bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBands {
    pub high: f64,
    pub medium: f64,
}

impl Default for ConfidenceBands {
    fn default() -> Self {
        Self {
            high: 90.0,
            medium: 70.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBands {
    pub fn classify(&self, score: f64) -> ConfidenceBand {
        if score >= self.high {
            ConfidenceBand::High
        } else if score >= self.medium {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }
}

/// Comparison features of one (File 1 row, File 2 row) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairFeatures {
    pub mt_index: usize,
    pub ledger_index: usize,
    pub amount_diff: f64,
    pub date_diff: i64,
    pub currency_match: u8,
    pub desc_match: u8,
}

impl PairFeatures {
    pub const COUNT: usize = 4;

    pub fn as_vector(&self) -> [f64; Self::COUNT] {
        [
            self.amount_diff,
            self.date_diff as f64,
            f64::from(self.currency_match),
            f64::from(self.desc_match),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPair {
    pub features: PairFeatures,
    /// Synthetic training label.
    pub match_status: u8,
    pub predicted: u8,
    /// Match probability in percent, rounded to two decimals.
    pub confidence_score: f64,
}

impl ScoredPair {
    pub fn match_confidence(&self) -> String {
        format!("{}%", format_float(self.confidence_score))
    }
}

/// Shortest round-trip rendering, with a trailing `.0` on integral values.
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconSummary {
    pub file1_entries: usize,
    pub file2_entries: usize,
    pub total_pairs: usize,
    pub predicted_matches: usize,
    pub high_confidence: usize,
    pub medium_confidence: usize,
    pub low_confidence: usize,
    pub holdout_accuracy: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct ReconResult {
    pub tables: SourceTables,
    pub pairs: Vec<ScoredPair>,
    /// Indices into `pairs` of predicted matches, best first.
    pub ranked_matches: Vec<usize>,
    pub summary: ReconSummary,
}

impl ReconResult {
    pub fn likely_matches(&self) -> impl Iterator<Item = &ScoredPair> {
        self.ranked_matches.iter().map(|&i| &self.pairs[i])
    }
}
