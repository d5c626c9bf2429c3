use crate::domain::model::ReconResult;
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

#[derive(Debug)]
pub struct RunOutcome {
    pub output_path: String,
    pub result: ReconResult,
}

pub struct ReconEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> ReconEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        tracing::info!("Starting reconciliation run");
        self.monitor.log_stats("Start");

        tracing::info!("Loading input files...");
        let tables = self.pipeline.extract().await?;
        tracing::info!(
            "Loaded {} File 1 rows and {} File 2 rows",
            tables.expected.len(),
            tables.posted.len()
        );
        self.monitor.log_stats("Extract");

        tracing::info!("Scoring row pairs...");
        let result = self.pipeline.transform(tables).await?;
        tracing::info!(
            "Scored {} pairs, {} predicted matches",
            result.summary.total_pairs,
            result.summary.predicted_matches
        );
        self.monitor.log_stats("Transform");

        tracing::info!("Writing results...");
        let output_path = self.pipeline.load(&result).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(RunOutcome {
            output_path,
            result,
        })
    }
}
