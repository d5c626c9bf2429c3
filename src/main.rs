use clap::Parser;
use recon_match::core::output::render_top_matches;
use recon_match::utils::error::{ErrorSeverity, ReconError};
use recon_match::utils::logger;
use recon_match::{CliConfig, LocalStorage, ReconEngine, ReconPipeline};

fn report_failure(stage: &str, e: &ReconError) -> ! {
    tracing::error!(
        "❌ {} failed: {} (Category: {:?}, Severity: {:?})",
        stage,
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting recon-match");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    let settings = match config.resolve() {
        Ok(settings) => settings,
        Err(e) => report_failure("Configuration", &e),
    };
    tracing::debug!("Resolved settings: {:?}", settings);

    if config.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let pipeline = ReconPipeline::new(LocalStorage::default(), settings);
    let engine = ReconEngine::new_with_monitoring(pipeline, config.monitor);

    match engine.run().await {
        Ok(outcome) => {
            println!("{}", outcome.result.summary);
            println!();
            println!("{}", render_top_matches(&outcome.result, config.top));
            println!();
            println!("✅ Output saved to file: {}", outcome.output_path);
        }
        Err(e) => report_failure("Reconciliation", &e),
    }
}
