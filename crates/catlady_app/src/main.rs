mod config;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use catlady_engine::ImageService;
use clap::Parser;
use feed_logging::{feed_info, feed_warn};

use crate::config::{ConfigError, DEFAULT_CONFIG_PATH};
use crate::logging::LogDestination;

/// Print a random safe-for-work image URL from a configured feed.
#[derive(Debug, Parser)]
#[command(name = "catlady", version)]
struct Cli {
    /// Feed id to pick from; a random configured feed when omitted.
    feed: Option<String>,
    /// Path to the RON configuration file.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Log level (off, error, warn, info, debug, trace); overrides the config file.
    #[arg(long)]
    verbosity: Option<String>,
    /// List configured feeds and exit.
    #[arg(long)]
    list: bool,
    /// Number of images to pick.
    #[arg(long, default_value_t = 1)]
    count: usize,
    /// Where log output goes.
    #[arg(long, value_enum, default_value_t = LogDestination::Terminal)]
    log: LogDestination,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("catlady: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = config::load(&cli.config)?;
    config.apply_env_overrides(|key| std::env::var(key).ok());

    let raw_verbosity = cli.verbosity.as_deref().unwrap_or(&config.verbosity);
    let verbosity = feed_logging::parse_verbosity(raw_verbosity)
        .ok_or_else(|| ConfigError::Verbosity(raw_verbosity.to_string()))?;
    logging::initialize(cli.log, verbosity);

    if cli.list {
        for (id, name) in &config.feeds {
            println!("{id}\t{name}");
        }
        return Ok(());
    }

    config.validate()?;
    let service = ImageService::new(config.account(), config.feeds.clone(), verbosity)?;
    let feed = match cli.feed.as_deref().or_else(|| service.random_feed()) {
        Some(feed) => feed.to_string(),
        None => bail!("no feed given and none configured"),
    };
    if let Some(name) = service.display_name(&feed) {
        feed_info!("Picking from {} ({})", name, feed);
    } else {
        feed_warn!("Feed {} is not in the configured feed list", feed);
    }

    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    let mut found = 0;
    for _ in 0..cli.count {
        let url = runtime.block_on(service.get_image(&feed));
        if !url.is_empty() {
            println!("{url}");
            found += 1;
        }
    }

    if found == 0 && cli.count > 0 {
        bail!("no image found in feed {feed}");
    }
    Ok(())
}
