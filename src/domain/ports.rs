use crate::domain::model::{ColumnMap, ConfidenceBands, ModelParams, ReconResult, SourceTables};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn expected_file(&self) -> &str;
    fn posted_file(&self) -> &str;
    fn output_path(&self) -> &str;
    fn output_filename(&self) -> &str;
    fn summary_json(&self) -> bool;
    fn column_map(&self) -> &ColumnMap;
    fn model_params(&self) -> &ModelParams;
    fn confidence_bands(&self) -> ConfidenceBands;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<SourceTables>;
    async fn transform(&self, data: SourceTables) -> Result<ReconResult>;
    async fn load(&self, result: &ReconResult) -> Result<String>;
}
