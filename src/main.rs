//! devinfo — live battery details for Linux devices.
//!
//! Run with:  `devinfo`  (or `RUST_LOG=debug devinfo 2>log` to trace sources)

use anyhow::{Context, Result};
use clap::Parser;
use devinfo_config::{default_path, load as load_config, ConfigOverrides, SectionConfig};
use devinfo_screen::BatteryScreen;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, about = "Battery status, health and real-time power draw")]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/devinfo/devinfo.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print one snapshot and exit instead of refreshing live.
    #[arg(long)]
    once: bool,

    /// With --once, print the reading as JSON.
    #[arg(long, requires = "once")]
    json: bool,

    /// Override the real-time refresh period in milliseconds.
    #[arg(long, value_name = "MS")]
    interval_ms: Option<u64>,

    /// Sections to show, in order (`summary`, `details`).  Repeatable.
    #[arg(long = "section", value_name = "KIND")]
    sections: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Structured logging on stderr; stdout carries the list.
    // RUST_LOG controls verbosity (default: warn, so redraws stay clean).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("devinfo v{} starting", env!("CARGO_PKG_VERSION"));

    let path = cli.config.unwrap_or_else(default_path);
    let overrides = ConfigOverrides {
        fast_interval_ms: cli.interval_ms,
        sections:         (!cli.sections.is_empty())
            .then(|| cli.sections.into_iter().map(SectionConfig::new).collect()),
    };
    let config = load_config(&path)
        .map(|c| overrides.apply(c))
        .with_context(|| format!("loading config from '{}'", path.display()))?;

    let mut screen = BatteryScreen::sysfs(config)
        .with_config_path(path)
        .with_overrides(overrides);

    if cli.once {
        screen.refresh_now();
        screen.print(&mut std::io::stdout().lock(), cli.json)?;
        return Ok(());
    }

    devinfo_screen::run(screen).await?;
    Ok(())
}
