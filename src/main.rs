//! Offline video activity and emotion analyzer.

use anyhow::Result;
use clap::Parser;
use log::info;
use std::path::PathBuf;
use video_activity_analyzer::{app::VideoAnalyzer, config::Config};

#[derive(Parser, Debug)]
#[command(author, version, about = "Offline video activity and emotion analysis", long_about = None)]
struct Args {
    /// Input video file to analyze
    video: PathBuf,

    /// Path of the annotated output video
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path of the text summary report
    #[arg(short, long)]
    summary: Option<PathBuf>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Video Activity Analyzer");

    // Load configuration if provided
    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path.display());
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("Failed to load config file: {e}. Using defaults.");
                Config::default()
            }
        }
    } else {
        Config::default()
    };

    // Command line paths override the configured output artifacts
    if let Some(output) = args.output {
        config.output.video = output;
    }
    if let Some(summary) = args.summary {
        config.output.summary = summary;
    }

    let mut analyzer = VideoAnalyzer::new(config, &args.video)?;
    let aggregates = analyzer.run()?;

    info!("Total frames analyzed: {}", aggregates.total_frames());
    info!("Anomalies detected: {}", aggregates.anomaly_count());

    Ok(())
}
