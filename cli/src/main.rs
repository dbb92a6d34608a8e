use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use zoneguard_core::{
    config::EngineConfig,
    metrics::PerfMonitor,
    pipeline::ComplianceEngine,
    replay::{replay, replay_to_file, total_records, ReplayStats},
};

// ── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "zoneguard",
    version,
    about = "Restricted-zone helmet compliance over recorded perception metadata",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay frame metadata and write annotation directives as JSON Lines.
    Process {
        /// Frame metadata (JSON Lines)
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for per-frame directives
        #[arg(short, long, default_value = "annotations.jsonl")]
        output: PathBuf,

        /// Engine configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Replay frame metadata and print each frame's summary text.
    Summarize {
        /// Frame metadata (JSON Lines)
        #[arg(short, long)]
        input: PathBuf,

        /// Engine configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML.
    Config {
        /// Engine configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    // Respect RUST_LOG; default to info
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            input,
            output,
            config,
        } => cmd_process(input, output, config),
        Commands::Summarize { input, config } => cmd_summarize(input, config),
        Commands::Config { config } => cmd_config(config),
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn cmd_process(input: PathBuf, output: PathBuf, config: Option<PathBuf>) -> Result<()> {
    info!("Compliance replay");
    info!("  input  : {}", input.display());
    info!("  output : {}", output.display());

    let config = load_config(config.as_deref())?;
    let monitor = Arc::new(PerfMonitor::new(config.metrics.report_interval()));
    let mut engine = ComplianceEngine::new(&config, monitor);

    let total = total_records(&input);
    let pb = progress(total, "Correlating frames…");
    let pb2 = pb.clone();

    let stats = replay_to_file(&input, &output, &mut engine, move |stats| {
        pb2.set_position(stats.lines);
    })
    .context("compliance replay failed")?;

    pb.finish_with_message("Done.");
    report(&stats);
    Ok(())
}

fn cmd_summarize(input: PathBuf, config: Option<PathBuf>) -> Result<()> {
    let config = load_config(config.as_deref())?;
    let monitor = Arc::new(PerfMonitor::new(config.metrics.report_interval()));
    let mut engine = ComplianceEngine::new(&config, monitor);

    let stats = replay(&input, &mut engine, |out| {
        println!(
            "── stream {} frame {} ──\n{}",
            out.stream_id, out.frame_num, out.summary.text
        );
        Ok(())
    })
    .context("summary replay failed")?;

    report(&stats);
    Ok(())
}

fn cmd_config(config: Option<PathBuf>) -> Result<()> {
    let config = load_config(config.as_deref())?;
    print!("{}", config.to_toml()?);
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => {
            info!("  config : {}", path.display());
            EngineConfig::load(path)
        }
        None => Ok(EngineConfig::default()),
    }
}

fn report(stats: &ReplayStats) {
    info!(
        records = stats.lines,
        frames = stats.frames,
        skipped = stats.skipped,
        alerts = stats.alerts,
        "replay finished"
    );
}

fn progress(total: u64, msg: &str) -> ProgressBar {
    let (pb, template) = if total > 0 {
        (
            ProgressBar::new(total),
            "{spinner:.cyan} {msg} [{bar:32}] {pos}/{len} [{elapsed_precise}]",
        )
    } else {
        (
            ProgressBar::new_spinner(),
            "{spinner:.cyan} {msg} [{elapsed_precise}]",
        )
    };
    pb.set_style(
        ProgressStyle::with_template(template)
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
