//! Statwatch CLI - sw command

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use poller::{FsPoller, MetadataSnapshot, PollEvent};
use tokio::sync::mpsc;

mod config;

/// Statwatch - report metadata changes on polled paths
#[derive(Parser)]
#[command(name = "sw")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Paths to poll (at least one, unless supplied by --config)
    paths: Vec<PathBuf>,

    /// Milliseconds between polls
    #[arg(long)]
    interval: Option<u64>,

    /// Read paths and interval from a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = config::WatchConfig::resolve(cli.config.as_deref(), cli.paths, cli.interval)?;

    if config.paths.is_empty() {
        anyhow::bail!("No paths to watch. Pass paths on the command line or via --config.");
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut pollers = Vec::new();
    for path in &config.paths {
        let tx = tx.clone();
        let label = path.clone();
        let mut poller = FsPoller::new();
        poller
            .start(path, config.interval(), move |event: PollEvent| {
                let _ = tx.send((label.clone(), event));
            })
            .with_context(|| format!("Failed to start polling {}", path.display()))?;
        pollers.push(poller);
    }

    tracing::info!(
        "polling {} path(s) every {:?} (ctrl-c to exit)",
        pollers.len(),
        config.interval()
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            Some((path, event)) = rx.recv() => print_event(&path, &event),
        }
    }

    for poller in &mut pollers {
        poller.stop();
    }
    Ok(())
}

fn print_event(path: &Path, event: &PollEvent) {
    match event {
        PollEvent::Changed { previous, current } => {
            println!(
                "{} {}  {} -> {}",
                "changed".green(),
                path.display().to_string().bold(),
                describe(previous.as_ref()),
                describe(Some(current)),
            );
        }
        PollEvent::Failed { error, .. } => {
            println!(
                "{} {}  {}",
                "failed ".red(),
                path.display().to_string().bold(),
                error
            );
        }
    }
}

fn describe(snapshot: Option<&MetadataSnapshot>) -> String {
    match snapshot {
        Some(s) => format!("{}B @{}.{:09}", s.size, s.mtime.secs, s.mtime.nanos),
        None => "(absent)".to_string(),
    }
}
