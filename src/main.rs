use anyhow::Context;
use std::time::Instant;
use tracing::info;
use wta_harvest::{config::HarvestConfig, harvest::Harvester};

/// The main entry point of the application.
///
/// This function initializes logging, loads the configuration, harvests every hike
/// listed on the site and writes the records to a timestamped JSON file.
///
/// Usage: `wta_harvest [OUTPUT_DIR] [CONFIG_FILE]`
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let output_dir = std::env::args().nth(1).unwrap_or_else(|| ".".to_string());

    let config_path = std::env::args()
        .nth(2)
        .unwrap_or_else(|| "wta_harvest.toml".to_string());

    let config = HarvestConfig::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;

    let start_time = Instant::now();

    let harvester = Harvester::new(config).context("Failed to initialize the harvester")?;
    let report = harvester
        .run(&output_dir)
        .await
        .with_context(|| format!("Failed to write the harvest into {}", output_dir))?;

    info!("Harvest finished in {:.2?}", start_time.elapsed());

    println!("\n=== Harvest Summary ===");
    println!("Hike URLs discovered: {}", report.discovered);
    println!("Hikes written: {}", report.collected);
    println!("Failed requests: {}", report.failed_requests);
    println!("Skipped URLs: {}", report.skipped.len());
    for skipped in &report.skipped {
        println!("  {} ({})", skipped.url, skipped.reason);
    }
    println!("Output: {}", report.output_path.display());

    Ok(())
}
