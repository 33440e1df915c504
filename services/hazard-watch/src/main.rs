//! Hazard watch service.
//!
//! Renders hazard density heatmaps into georeferenced overlays and warns
//! when an observer walks into a dense area:
//! - One-shot rendering, lookup and grid building on local files
//! - Continuous overlay refresh from the Report Store
//! - Proximity alerts for positions read from stdin

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use grid_builder::BuildOptions;
use hazard_watch::commands::{build_file, lookup_file, render_file};
use hazard_watch::{WatchArgs, WatchConfig, Watcher};
use tokio::io::BufReader;
use tokio::sync::broadcast;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "hazard-watch")]
#[command(about = "Hazard heatmap renderer and proximity watcher")]
struct Args {
    /// Log level
    #[arg(long, env = "HAZARD_LOG_LEVEL", default_value = "info", global = true)]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a heatmap payload file to PNG
    Render {
        /// Heatmap JSON (bare or enveloped)
        #[arg(short, long)]
        input: PathBuf,

        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,

        /// Pixels per grid cell
        #[arg(long, default_value = "2")]
        scale: usize,

        /// Write overlay placement JSON here
        #[arg(long)]
        bounds_out: Option<PathBuf>,
    },

    /// Print the density under a coordinate
    Lookup {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },

    /// Build a heatmap payload from a report listing
    Build {
        /// Reports JSON array
        #[arg(short, long)]
        reports: PathBuf,

        /// Output heatmap JSON path
        #[arg(short, long)]
        output: PathBuf,

        #[arg(long, default_value = "100")]
        resolution: usize,

        /// Kernel radius in degrees
        #[arg(long, default_value = "0.01")]
        radius: f64,

        /// Use raw trust values instead of min-max scaled ones
        #[arg(long)]
        no_normalize: bool,
    },

    /// Keep the overlay fresh and check positions read from stdin
    Watch(WatchArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.log_json)?;

    match args.command {
        Command::Render {
            input,
            output,
            scale,
            bounds_out,
        } => {
            render_file(&input, &output, scale, bounds_out.as_deref())?;
        }
        Command::Lookup { input, lat, lon } => {
            let report = lookup_file(&input, lat, lon)?;
            println!("{}", report.describe());
        }
        Command::Build {
            reports,
            output,
            resolution,
            radius,
            no_normalize,
        } => {
            let options = BuildOptions {
                resolution,
                radius_degrees: radius,
                normalize: !no_normalize,
                ..Default::default()
            };
            if build_file(&reports, &output, &options)?.is_none() {
                info!("No positioned reports, nothing written");
            }
        }
        Command::Watch(watch_args) => run_watch(watch_args).await?,
    }

    Ok(())
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

async fn run_watch(args: WatchArgs) -> Result<()> {
    let config = WatchConfig::try_from(args).context("Invalid watch configuration")?;
    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.output_dir.display()))?;

    let watcher = Watcher::new(config)?;

    // Shutdown signal
    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
        shutdown_tx.send(()).ok();
    });

    let stdin = BufReader::new(tokio::io::stdin());
    let summary = watcher.run(stdin, shutdown_rx).await?;

    info!(
        refreshes = summary.refreshes,
        failed_refreshes = summary.failed_refreshes,
        positions = summary.positions,
        alerts = summary.alerts,
        "Hazard watch stopped"
    );
    Ok(())
}
