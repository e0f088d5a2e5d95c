use anyhow::{Context, Result};
use clap::Parser;
use odata_fetch::config::Config;
use odata_fetch::logger;
use odata_fetch::pipeline::Pipeline;
use std::path::PathBuf;
use tracing::warn;

/// Search the Copernicus Data Space catalogue for an area and period, then download every
/// matching product as `<identifier>.zip`.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// JSON (or `.toml`) file describing collection, area, period, credentials and save_dir
    #[arg(default_value = "config/download.json")]
    config: PathBuf,
    /// Log debug output
    #[arg(long, short)]
    verbose: bool,
    /// Only list the products that would be downloaded
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init_cli_logger(cli.verbose);

    let config = Config::read(&cli.config)
        .with_context(|| format!("Unable to load {}", cli.config.display()))?;
    let mut pipeline = Pipeline::from_config(config)?;

    if cli.dry_run {
        for record in pipeline.select().await? {
            println!("{}\t{}", record.id(), record.identifier);
        }
        return Ok(());
    }

    let report = pipeline.run().await?;
    for failure in report.failed.iter() {
        warn!("{failure}");
    }

    Ok(())
}
