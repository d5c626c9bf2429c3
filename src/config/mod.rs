pub mod cli;
pub mod settings;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::config::{settings::ReconSettings, toml_config::TomlConfig};
#[cfg(feature = "cli")]
use crate::utils::{error::Result, validation::Validate};
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "recon-match")]
#[command(about = "Match rows between two transaction files and rank likely matches")]
pub struct CliConfig {
    /// File 1: expected transactions (.csv, or pipe-delimited .txt)
    pub expected: String,

    /// File 2: posted transactions (.csv, or pipe-delimited .txt)
    pub posted: String,

    /// Directory for the result CSV (overrides [output].path)
    #[arg(long)]
    pub output_path: Option<String>,

    /// Optional TOML settings file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Number of trees in the forest
    #[arg(long)]
    pub trees: Option<usize>,

    /// Maximum tree depth (unlimited by default)
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Fraction of pairs held out for the accuracy check
    #[arg(long)]
    pub test_size: Option<f64>,

    /// Probability of a synthetic training label being a match
    #[arg(long)]
    pub match_rate: Option<f64>,

    /// Seed for the split and the forest
    #[arg(long)]
    pub random_state: Option<u64>,

    /// Seed for the synthetic labels (random when omitted)
    #[arg(long)]
    pub label_seed: Option<u64>,

    /// Number of likely matches printed to the terminal
    #[arg(long, default_value = "20")]
    pub top: usize,

    /// Also write summary.json next to the CSV
    #[arg(long)]
    pub summary_json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log process CPU and memory per stage")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Builds validated settings: defaults, then the TOML file, then flags.
    pub fn resolve(&self) -> Result<ReconSettings> {
        let mut settings = ReconSettings::new(&self.expected, &self.posted);

        if let Some(path) = &self.config {
            tracing::info!("📁 Loading configuration from: {}", path);
            let toml = TomlConfig::from_file(path)?;
            toml.validate()?;
            toml.apply_to(&mut settings);
        }

        if let Some(path) = &self.output_path {
            settings.output_path = path.clone();
        }
        if let Some(v) = self.trees {
            settings.model.n_estimators = v;
        }
        if self.max_depth.is_some() {
            settings.model.max_depth = self.max_depth;
        }
        if let Some(v) = self.test_size {
            settings.model.test_size = v;
        }
        if let Some(v) = self.match_rate {
            settings.model.match_rate = v;
        }
        if let Some(v) = self.random_state {
            settings.model.random_state = v;
        }
        if self.label_seed.is_some() {
            settings.model.label_seed = self.label_seed;
        }
        if self.summary_json {
            settings.summary_json = true;
        }

        settings.validate()?;
        Ok(settings)
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_positional_and_flags() {
        let cli = CliConfig::try_parse_from([
            "recon-match",
            "mt.csv",
            "ledger.txt",
            "--trees",
            "10",
            "--label-seed",
            "5",
            "--summary-json",
        ])
        .unwrap();
        assert_eq!(cli.top, 20);

        let settings = cli.resolve().unwrap();
        assert_eq!(settings.expected_file, "mt.csv");
        assert_eq!(settings.posted_file, "ledger.txt");
        assert_eq!(settings.model.n_estimators, 10);
        assert_eq!(settings.model.label_seed, Some(5));
        assert!(settings.summary_json);
    }

    #[test]
    fn test_flags_override_toml() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[model]\nn_estimators = 30\nmatch_rate = 0.5\n")
            .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = CliConfig::try_parse_from([
            "recon-match",
            "mt.csv",
            "ledger.csv",
            "--config",
            path.as_str(),
            "--trees",
            "7",
        ])
        .unwrap();
        let settings = cli.resolve().unwrap();
        assert_eq!(settings.model.n_estimators, 7);
        assert_eq!(settings.model.match_rate, 0.5);
    }

    #[test]
    fn test_invalid_override_fails_validation() {
        let cli =
            CliConfig::try_parse_from(["recon-match", "mt.csv", "ledger.csv", "--test-size", "1.5"])
                .unwrap();
        assert!(cli.resolve().is_err());
    }
}
