use std::process;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use transform_xml::{Cli, ConfigManager, Pipeline, PipelineError, PipelineReport, VerbosityLevel};

fn main() {
    let cli = Cli::parse_args();
    init_tracing(cli.verbosity());

    if let Err(message) = cli.validate() {
        error!("{}", message);
        process::exit(1);
    }

    match run(&cli) {
        Ok(report) => {
            info!(
                output = %report.output_path.display(),
                bytes = report.bytes_written,
                duration_ms = report.timings.total().as_millis() as u64,
                "successfully finished"
            );
        }
        Err(err) => {
            let category = err.category();
            let chain = anyhow::Error::new(err);
            error!(?category, "pipeline failed: {:#}", chain);
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> std::result::Result<PipelineReport, PipelineError> {
    let config = ConfigManager::load(cli)?;
    Pipeline::new().run(&config)
}

fn init_tracing(verbosity: VerbosityLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.filter()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
