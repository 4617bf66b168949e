use anyhow::{Context, Result};
use clap::Parser;
use flick_common::observability::{LogConfig, init_logging};
use flick_config::{FlickConfig, FlickConfigLoader, default_config_path};
use flick_search::SearchMode;
use std::process::ExitCode;
use std::sync::Arc;

use cli::{Cli, Command};
use wiring::{OutputOptions, build_from_config};

mod cli;
mod interactive;
mod wiring;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // 1) Load config (env wins)
    let mut loader = FlickConfigLoader::new();
    match &cli.config {
        Some(path) => loader = loader.with_file(path),
        None => {
            if let Some(path) = default_config_path() {
                loader = loader.with_optional_file(path);
            }
            loader = loader.with_optional_file("flickfinder.yaml");
        }
    }
    let cfg: FlickConfig = loader.load().context("loading configuration")?;

    // 2) Logging from the same config
    let log_path = init_logging(LogConfig {
        log_dir: cfg.logging.directory.clone(),
        emit_stderr: cfg.logging.stderr,
        format: cfg.logging.format.parse().unwrap_or_default(),
        default_filter: cfg.logging.filter.clone(),
        ..LogConfig::default()
    })?;
    tracing::info!(log = %log_path.display(), "app.start");

    let output = OutputOptions {
        save: cli.save.clone(),
        fetch_image: !cli.no_image || cli.save.is_some(),
        json: cli.json,
    };
    let app = build_from_config(&cfg, cli.seed, output)?;

    let found = match cli.command {
        Command::Phrase { text } => app.search_once(SearchMode::phrase(text.join(" "))).await,
        Command::Location { lat, lon } => match SearchMode::from_location_text(&lat, &lon) {
            Ok(mode) => app.search_once(mode).await,
            Err(err) => {
                eprintln!("{}", err.user_message());
                false
            }
        },
        Command::Interactive => {
            Arc::new(app).interactive().await?;
            true
        }
    };

    Ok(if found { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
