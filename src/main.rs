mod app;
mod input;
mod screen;

use anyhow::{Context, Result};
use clap::Parser;
use fishtank::config::{load_settings, project_paths, save_settings_atomic};
use fishtank::{DemoSource, FileSource, HttpSource};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug, Clone)]
#[command(name = "fishtank")]
#[command(about = "Watch the fish of a fish-tamagotchi contract swim across your terminal")]
struct Cli {
    /// Poll a JSON snapshot file
    #[arg(long, conflicts_with = "url")]
    file: Option<PathBuf>,

    /// Poll a JSON snapshot endpoint
    #[arg(long)]
    url: Option<String>,

    /// Size of the synthetic roster used when no file or url is given
    #[arg(long, default_value_t = 8)]
    demo: usize,

    /// Seed for spawn placement (and the demo roster)
    #[arg(long)]
    seed: Option<u64>,

    /// Poll period in milliseconds
    #[arg(long)]
    poll_ms: Option<u64>,

    /// Settings file (defaults to the per-user data directory)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Write the effective settings back to the settings file
    #[arg(long, default_value_t = false)]
    save_settings: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let paths = project_paths()?;
    init_tracing(&paths.log_path)?;

    let settings_path = cli.settings.clone().unwrap_or(paths.settings_path);
    let mut settings = load_settings(&settings_path);
    if let Some(seed) = cli.seed {
        settings.seed = Some(seed);
    }
    if let Some(ms) = cli.poll_ms {
        settings.poll_interval_ms = ms;
    }
    settings
        .rules
        .validate()
        .with_context(|| format!("invalid tank rules in {}", settings_path.display()))?;

    if cli.save_settings {
        save_settings_atomic(&settings_path, &settings)?;
        info!(path = %settings_path.display(), "settings saved");
    }

    match (cli.file, cli.url) {
        (Some(path), _) => {
            info!(path = %path.display(), "polling snapshot file");
            app::run(settings, FileSource::new(path)).await
        }
        (None, Some(url)) => {
            info!(%url, "polling snapshot endpoint");
            app::run(settings, HttpSource::new(url)).await
        }
        (None, None) => {
            let seed = settings.seed.unwrap_or(0xF15B_0A7);
            app::run(settings, DemoSource::new(cli.demo, 2, seed)).await
        }
    }
}

fn init_tracing(log_path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("could not open log file {}", log_path.display()))?;
    let filter =
        EnvFilter::try_from_env("FISHTANK_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}
