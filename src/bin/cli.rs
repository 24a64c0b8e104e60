//! MangaUpdates release bot CLI
//!
//! `run` starts the Discord bot; the other commands are one-shot local runs.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mu_release_bot::{error::Result, models::Config, pipeline, state::AppState, storage::LocalStorage};

/// MangaUpdates release monitor
#[derive(Parser, Debug)]
#[command(
    name = "mu-release-bot",
    version,
    about = "Posts new MangaUpdates releases to Discord"
)]
struct Cli {
    /// Path to storage directory holding config and state files
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Connect to Discord and monitor releases (token from DISCORD_TOKEN)
    #[cfg(feature = "discord")]
    Run,

    /// Fetch the releases listing once and print it
    Fetch,

    /// Run one detection cycle, logging instead of posting
    Check,

    /// Validate the configuration file
    Validate,

    /// Show persisted state info
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("MangaUpdates release bot starting...");

    let config_path = cli.storage_dir.join("config.toml");
    let config = Config::load_or_default(&config_path);
    let storage = LocalStorage::new(&cli.storage_dir);

    log::info!("Using storage directory {}", cli.storage_dir.display());

    match cli.command {
        #[cfg(feature = "discord")]
        Command::Run => {
            use std::sync::Arc;

            config.validate()?;
            let token = std::env::var("DISCORD_TOKEN").map_err(|_| {
                mu_release_bot::error::AppError::config("DISCORD_TOKEN is not set")
            })?;

            #[cfg(feature = "keep-alive")]
            if config.keep_alive.enabled {
                let bind = config.keep_alive.bind.clone();
                tokio::spawn(async move {
                    if let Err(e) = mu_release_bot::keep_alive::serve(&bind).await {
                        log::error!("Keep-alive server stopped: {}", e);
                    }
                });
            }

            let state = Arc::new(AppState::load(config, storage).await?);
            mu_release_bot::discord::start_bot(state, &token).await?;
        }

        Command::Fetch => {
            let state = AppState::load(config, storage).await?;
            let releases = pipeline::run_fetch(&state).await;
            if releases.is_empty() {
                log::warn!("No releases available, live or cached.");
            }
        }

        Command::Check => {
            let state = AppState::load(config, storage).await?;
            let report = pipeline::run_check(&state).await;
            log::info!("{} of {} notifications delivered", report.delivered, report.notifications);
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
        }

        Command::Info => {
            let state = AppState::load(config, storage).await?;

            log::info!("Storage directory: {}", state.storage.root().display());
            log::info!("Seen releases: {}", state.seen.lock().await.len());

            let cached = state.source.cached().await;
            log::info!("Cached releases: {}", cached.len());
            match cached.first() {
                Some(first) => log::info!("Newest cached: {}", first.summary()),
                None => log::info!("No cached listing yet."),
            }
        }
    }

    log::info!("Done!");

    Ok(())
}
