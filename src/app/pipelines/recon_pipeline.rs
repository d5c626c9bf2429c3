use crate::core::matcher::reconcile;
use crate::core::output::render_matches_csv;
use crate::core::reader::{parse_table, InputFormat};
use crate::domain::model::{ReconResult, SourceTables, Table};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::utils::error::{ReconError, Result};
use std::path::Path;

pub const SUMMARY_FILENAME: &str = "summary.json";

pub struct ReconPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
}

impl<S: Storage, C: ConfigProvider> ReconPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    async fn load_table(&self, path: &str, prefix: &str) -> Result<Table> {
        let format = InputFormat::from_path(path)?;
        tracing::debug!("Reading {} as {:?}", path, format);
        let data = self.storage.read_file(path).await?;
        parse_table(&data, format, path, prefix)
    }

    fn output_file(&self, filename: &str) -> String {
        Path::new(self.config.output_path())
            .join(filename)
            .to_string_lossy()
            .into_owned()
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ReconPipeline<S, C> {
    async fn extract(&self) -> Result<SourceTables> {
        let expected = self.load_table(self.config.expected_file(), "mt_").await?;
        let posted = self.load_table(self.config.posted_file(), "ledger_").await?;
        Ok(SourceTables { expected, posted })
    }

    async fn transform(&self, data: SourceTables) -> Result<ReconResult> {
        let columns = self.config.column_map().clone();
        let params = self.config.model_params().clone();
        let bands = self.config.confidence_bands();

        tokio::task::spawn_blocking(move || reconcile(data, &columns, &params, bands))
            .await
            .map_err(|e| ReconError::processing(format!("scoring task failed: {}", e)))?
    }

    async fn load(&self, result: &ReconResult) -> Result<String> {
        let csv_path = self.output_file(self.config.output_filename());
        let csv_data = render_matches_csv(result)?;

        tracing::debug!(
            "Writing {} matches ({} bytes) to {}",
            result.ranked_matches.len(),
            csv_data.len(),
            csv_path
        );
        self.storage.write_file(&csv_path, &csv_data).await?;

        if self.config.summary_json() {
            let summary_path = self.output_file(SUMMARY_FILENAME);
            let json = serde_json::to_vec_pretty(&result.summary)?;
            self.storage.write_file(&summary_path, &json).await?;
            tracing::debug!("Summary saved to {}", summary_path);
        }

        Ok(csv_path)
    }
}
