use crate::domain::model::{ConfidenceBand, ConfidenceBands, ReconSummary, ScoredPair};
use std::fmt;

impl ReconSummary {
    /// Counts bands over every evaluated pair, not just predicted matches.
    pub fn build(
        file1_entries: usize,
        file2_entries: usize,
        pairs: &[ScoredPair],
        bands: ConfidenceBands,
        holdout_accuracy: Option<f64>,
    ) -> Self {
        let mut summary = Self {
            file1_entries,
            file2_entries,
            total_pairs: pairs.len(),
            predicted_matches: 0,
            high_confidence: 0,
            medium_confidence: 0,
            low_confidence: 0,
            holdout_accuracy,
        };

        for pair in pairs {
            summary.predicted_matches += usize::from(pair.predicted == 1);
            match bands.classify(pair.confidence_score) {
                ConfidenceBand::High => summary.high_confidence += 1,
                ConfidenceBand::Medium => summary.medium_confidence += 1,
                ConfidenceBand::Low => summary.low_confidence += 1,
            }
        }

        summary
    }
}

impl fmt::Display for ReconSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📊 Summary")?;
        writeln!(f, "Total File 1 Entries:  {}", self.file1_entries)?;
        writeln!(f, "Total File 2 Entries:  {}", self.file2_entries)?;
        writeln!(f, "Total Pairs Evaluated: {}", self.total_pairs)?;
        writeln!(f, "Predicted Matches:     {}", self.predicted_matches)?;
        writeln!(f, "✅ High Confidence:    {}", self.high_confidence)?;
        writeln!(f, "⚠️  Medium Confidence:  {}", self.medium_confidence)?;
        write!(f, "❌ Low Confidence:     {}", self.low_confidence)?;
        if let Some(acc) = self.holdout_accuracy {
            write!(f, "\nHold-out Accuracy:     {:.2}%", acc * 100.0)?;
        }
        Ok(())
    }
}
