use crate::config::settings::ReconSettings;
use crate::utils::error::{ReconError, Result};
use crate::utils::validation::{
    validate_non_empty_list, validate_non_empty_string, validate_open_fraction,
    validate_positive_number, validate_range, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional settings file. Every section and key may be omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub columns: Option<ColumnsConfig>,
    pub model: Option<ModelConfig>,
    pub thresholds: Option<ThresholdsConfig>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnsConfig {
    pub amount: Option<Vec<String>>,
    pub date: Option<Vec<String>>,
    pub currency: Option<Vec<String>>,
    pub desc: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    pub n_estimators: Option<usize>,
    pub max_depth: Option<usize>,
    pub min_samples_split: Option<usize>,
    pub test_size: Option<f64>,
    pub match_rate: Option<f64>,
    pub random_state: Option<u64>,
    pub label_seed: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdsConfig {
    pub high: Option<f64>,
    pub medium: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    pub path: Option<String>,
    pub filename: Option<String>,
    pub summary_json: Option<bool>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ReconError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ReconError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Overlays the values present in this file onto `settings`.
    pub fn apply_to(&self, settings: &mut ReconSettings) {
        if let Some(columns) = &self.columns {
            let map = &mut settings.columns;
            for (target, source) in [
                (&mut map.amount, &columns.amount),
                (&mut map.date, &columns.date),
                (&mut map.currency, &columns.currency),
                (&mut map.desc, &columns.desc),
            ] {
                if let Some(names) = source {
                    *target = names.clone();
                }
            }
        }

        if let Some(model) = &self.model {
            let params = &mut settings.model;
            if let Some(v) = model.n_estimators {
                params.n_estimators = v;
            }
            if model.max_depth.is_some() {
                params.max_depth = model.max_depth;
            }
            if let Some(v) = model.min_samples_split {
                params.min_samples_split = v;
            }
            if let Some(v) = model.test_size {
                params.test_size = v;
            }
            if let Some(v) = model.match_rate {
                params.match_rate = v;
            }
            if let Some(v) = model.random_state {
                params.random_state = v;
            }
            if model.label_seed.is_some() {
                params.label_seed = model.label_seed;
            }
        }

        if let Some(thresholds) = &self.thresholds {
            if let Some(v) = thresholds.high {
                settings.bands.high = v;
            }
            if let Some(v) = thresholds.medium {
                settings.bands.medium = v;
            }
        }

        if let Some(output) = &self.output {
            if let Some(path) = &output.path {
                settings.output_path = path.clone();
            }
            if let Some(filename) = &output.filename {
                settings.output_filename = filename.clone();
            }
            if let Some(v) = output.summary_json {
                settings.summary_json = v;
            }
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(columns) = &self.columns {
            for (field, names) in [
                ("columns.amount", &columns.amount),
                ("columns.date", &columns.date),
                ("columns.currency", &columns.currency),
                ("columns.desc", &columns.desc),
            ] {
                if let Some(names) = names {
                    validate_non_empty_list(field, names)?;
                }
            }
        }

        if let Some(model) = &self.model {
            if let Some(n) = model.n_estimators {
                validate_positive_number("model.n_estimators", n, 1)?;
            }
            if let Some(n) = model.min_samples_split {
                validate_positive_number("model.min_samples_split", n, 2)?;
            }
            if let Some(v) = model.test_size {
                validate_open_fraction("model.test_size", v)?;
            }
            if let Some(v) = model.match_rate {
                validate_range("model.match_rate", v, 0.0, 1.0)?;
            }
        }

        if let Some(thresholds) = &self.thresholds {
            for (field, value) in [("thresholds.high", thresholds.high), ("thresholds.medium", thresholds.medium)] {
                if let Some(v) = value {
                    validate_range(field, v, 0.0, 100.0)?;
                }
            }
        }

        if let Some(filename) = self.output.as_ref().and_then(|o| o.filename.as_deref()) {
            validate_non_empty_string("output.filename", filename)?;
        }

        Ok(())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
