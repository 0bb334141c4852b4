//! Cardinality Simulation
//!
//! Run with: cargo run
//!
//! Environment variables:
//! - CARDINALITY_SITE: Site id (default: site1)
//! - CARDINALITY_EVENTS: Number of events (default: 50)
//! - CARDINALITY_VISITORS: Visitor pool size (default: 20)
//! - CARDINALITY_START / CARDINALITY_END: Timestamp range in epoch seconds
//! - CARDINALITY_RATE: Events per second, 0 for unthrottled (default: 0)
//! - CARDINALITY_SEED: RNG seed (default: random)
//! - CARDINALITY_OUTPUT_DIR: Report directory (default: no report)
//! - RUST_LOG: Log level (default: info)

use cardinality::simulation::{Simulation, SimulationConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cardinality=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SimulationConfig::from_env()?;

    tracing::info!("Cardinality configuration:");
    tracing::info!("  Site: {}", config.site);
    tracing::info!("  Events: {} from {} visitors", config.events, config.visitors);
    tracing::info!("  Time range: {} .. {}", config.start, config.end);
    if config.rate > 0.0 {
        tracing::info!("  Rate: {} events/s", config.rate);
    }
    if let Some(dir) = &config.output_dir {
        tracing::info!("  Output directory: {}", dir.display());
    }

    let summary = Simulation::new(config)?.run()?;
    tracing::info!(
        "Tracked {} events ({} combos, {} first visits) in {} ms",
        summary.events,
        summary.combos,
        summary.unique_combos,
        summary.elapsed_ms
    );
    tracing::info!("Summary: {}", serde_json::to_string(&summary)?);

    Ok(())
}
