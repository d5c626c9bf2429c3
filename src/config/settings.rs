use crate::core::output::DEFAULT_FILENAME;
use crate::core::reader::InputFormat;
use crate::domain::model::{ColumnMap, ConfidenceBands, ModelParams};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ReconError, Result};
use crate::utils::validation::{
    validate_file_extension, validate_non_empty_list, validate_non_empty_string,
    validate_open_fraction, validate_path, validate_positive_number, validate_range, Validate,
};

/// Fully resolved run settings: defaults, then TOML, then command-line overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconSettings {
    pub expected_file: String,
    pub posted_file: String,
    pub output_path: String,
    pub output_filename: String,
    pub summary_json: bool,
    pub columns: ColumnMap,
    pub model: ModelParams,
    pub bands: ConfidenceBands,
}

impl ReconSettings {
    pub fn new(expected_file: impl Into<String>, posted_file: impl Into<String>) -> Self {
        Self {
            expected_file: expected_file.into(),
            posted_file: posted_file.into(),
            output_path: ".".to_string(),
            output_filename: DEFAULT_FILENAME.to_string(),
            summary_json: false,
            columns: ColumnMap::default(),
            model: ModelParams::default(),
            bands: ConfidenceBands::default(),
        }
    }
}

impl ConfigProvider for ReconSettings {
    fn expected_file(&self) -> &str {
        &self.expected_file
    }

    fn posted_file(&self) -> &str {
        &self.posted_file
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_filename(&self) -> &str {
        &self.output_filename
    }

    fn summary_json(&self) -> bool {
        self.summary_json
    }

    fn column_map(&self) -> &ColumnMap {
        &self.columns
    }

    fn model_params(&self) -> &ModelParams {
        &self.model
    }

    fn confidence_bands(&self) -> ConfidenceBands {
        self.bands
    }
}

impl Validate for ReconSettings {
    fn validate(&self) -> Result<()> {
        for (field, file) in [("expected_file", &self.expected_file), ("posted_file", &self.posted_file)] {
            validate_path(field, file)?;
            validate_file_extension(field, file, &InputFormat::EXTENSIONS)?;
        }
        validate_path("output_path", &self.output_path)?;
        validate_non_empty_string("output_filename", &self.output_filename)?;

        validate_non_empty_list("columns.amount", &self.columns.amount)?;
        validate_non_empty_list("columns.date", &self.columns.date)?;

        validate_positive_number("model.n_estimators", self.model.n_estimators, 1)?;
        validate_positive_number("model.min_samples_split", self.model.min_samples_split, 2)?;
        validate_open_fraction("model.test_size", self.model.test_size)?;
        validate_range("model.match_rate", self.model.match_rate, 0.0, 1.0)?;

        validate_range("thresholds.high", self.bands.high, 0.0, 100.0)?;
        validate_range("thresholds.medium", self.bands.medium, 0.0, 100.0)?;
        if self.bands.medium > self.bands.high {
            return Err(ReconError::InvalidConfigValueError {
                field: "thresholds.medium".to_string(),
                value: self.bands.medium.to_string(),
                reason: format!("must not exceed thresholds.high ({})", self.bands.high),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = ReconSettings::new("mt.csv", "ledger.txt");
        assert!(settings.validate().is_ok());
        assert_eq!(settings.output_filename(), "reconciliation_predictions_output.csv");
        assert_eq!(settings.model_params().n_estimators, 100);
    }

    #[test]
    fn test_input_extensions() {
        assert!(ReconSettings::new("mt.xlsx", "ledger.XLS").validate().is_ok());
        assert!(ReconSettings::new("mt.ods", "ledger.csv").validate().is_err());
        assert!(ReconSettings::new("mt.csv", "ledger.json").validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_bands() {
        let mut settings = ReconSettings::new("mt.csv", "ledger.csv");
        settings.bands = ConfidenceBands {
            high: 60.0,
            medium: 80.0,
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_model_params() {
        let mut settings = ReconSettings::new("mt.csv", "ledger.csv");
        settings.model.test_size = 0.0;
        assert!(settings.validate().is_err());

        let mut settings = ReconSettings::new("mt.csv", "ledger.csv");
        settings.model.n_estimators = 0;
        assert!(settings.validate().is_err());

        let mut settings = ReconSettings::new("mt.csv", "ledger.csv");
        settings.columns.date.clear();
        assert!(settings.validate().is_err());
    }
}
