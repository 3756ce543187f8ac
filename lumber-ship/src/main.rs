//! lumber-ship — entry point.
//!
//! ```text
//! lumber-ship                        Ship stdin to the configured server
//! lumber-ship --input events.ndjson  Ship a file of events
//! lumber-ship --address host:5044    Override the server address
//! lumber-ship --config <path>        Load a custom config TOML
//! lumber-ship --gen-config           Write default config to stdout
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lumber_ship::config::ShipConfig;
use lumber_ship::shipper::Shipper;

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "lumber-ship",
    about = "Ship newline-delimited JSON events to a lumberjack v2 server"
)]
struct Cli {
    /// Path to configuration TOML file.
    #[arg(short, long, default_value = "lumber-ship.toml")]
    config: PathBuf,

    /// Server address, overriding the config file.
    #[arg(short, long)]
    address: Option<String>,

    /// Events per window, overriding the config file.
    #[arg(short, long)]
    window: Option<usize>,

    /// zlib compression level (0-9), overriding the config file.
    #[arg(long)]
    compression: Option<u32>,

    /// Read events from a file instead of stdin.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    gen_config: bool,
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // --gen-config: dump defaults and exit.
    if cli.gen_config {
        let text = toml::to_string_pretty(&ShipConfig::default())?;
        println!("{text}");
        return Ok(());
    }

    // Load config, then apply CLI overrides.
    let mut config = ShipConfig::load(&cli.config);
    if let Some(address) = cli.address {
        config.network.address = address;
    }
    if let Some(window) = cli.window {
        config.shipping.window_size = window;
    }
    if let Some(level) = cli.compression {
        config.shipping.compression = level;
    }

    // Init tracing.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("lumber-ship v{}", env!("CARGO_PKG_VERSION"));
    info!("server: {}", config.network.address);
    info!("window size: {}", config.effective_window());
    info!("compression: {}", config.shipping.compression);

    let shipper = Shipper::new(config);
    let stop = shipper.stop_handle();

    // Ctrl-C handler: flush the current window at the next line
    // boundary and exit.
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Ctrl-C received — shutting down");
        stop.store(false, std::sync::atomic::Ordering::SeqCst);
    });

    let stats = match &cli.input {
        Some(path) => {
            let file = tokio::fs::File::open(path).await?;
            shipper.run(file).await?
        }
        None => shipper.run(tokio::io::stdin()).await?,
    };

    info!(
        batches = stats.batches,
        events = stats.events,
        skipped = stats.skipped,
        "shipping finished"
    );
    Ok(())
}
