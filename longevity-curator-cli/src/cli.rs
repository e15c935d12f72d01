/// # longevity-curator CLI Interface
///
/// Command parsing and wiring for the curator binary. All pipeline logic
/// lives in the `longevity-curator` core crate; this module only loads
/// configuration, builds the concrete collaborators from the environment,
/// and invokes [`Curator::run_once`] once or on a daily schedule.
///
/// ## How To Use
/// - `longevity-curator run [--config FILE] [--dry-run]`
/// - `longevity-curator schedule [--config FILE] [--at HH:MM]`
///
/// Setting `RUN_NOW` makes `schedule` perform a single run and exit.
use crate::load_config::{load_config, CliConfig};
use crate::platforms::platforms_from_env;
use crate::providers::{NewsApiClient, RedditClient, UnsplashClient};
use crate::schedule::{run_daily, PostTime};
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use longevity_curator::contract::RandomPicker;
use longevity_curator::imaging::HttpImageFetcher;
use longevity_curator::{Collaborators, Curator, RunOutcome};
use std::path::PathBuf;

/// CLI for longevity-curator: post one curated health item per day.
#[derive(Parser)]
#[clap(
    name = "longevity-curator",
    version,
    about = "Curate one health/longevity post and publish it to social platforms"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Perform a single run now
    Run {
        /// Path to the YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
        /// Build caption and image but publish nothing
        #[clap(long)]
        dry_run: bool,
    },
    /// Run once per day at a fixed local time until interrupted
    Schedule {
        /// Path to the YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
        /// Time of day (HH:MM, 24h); overrides POST_TIME
        #[clap(long)]
        at: Option<String>,
    },
}

/// Build the production collaborator table from the environment.
pub fn collaborators_from_env(config: &CliConfig) -> Result<Collaborators> {
    let wrap = |what: &str, e: Box<dyn std::error::Error + Send + Sync>| anyhow!("{what}: {e}");
    Ok(Collaborators {
        news: Box::new(NewsApiClient::from_env().map_err(|e| wrap("news client", e))?),
        social: Box::new(RedditClient::from_env().map_err(|e| wrap("reddit client", e))?),
        image_search: Box::new(UnsplashClient::from_env().map_err(|e| wrap("unsplash client", e))?),
        image_fetcher: Box::new(HttpImageFetcher::new().map_err(|e| wrap("image fetcher", e))?),
        picker: Box::new(RandomPicker),
        platforms: platforms_from_env(&config.platforms).map_err(|e| wrap("platforms", e))?,
    })
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Run { config, dry_run } => {
            let mut config = load_config(config.as_deref())?;
            config.run.dry_run |= dry_run;
            config.run.trace_loaded();
            let curator = Curator::new(config.run.clone(), collaborators_from_env(&config)?);
            let report = curator.run_once().await;
            tracing::info!(command = "run", run_id = %report.run_id, "Run complete");
            if let RunOutcome::DryRun { caption, image_path, .. } = &report.outcome {
                println!("{caption}");
                println!("{}", image_path.display());
            }
            Ok(())
        }
        Commands::Schedule { config, at } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(at) = at {
                config.post_time = at.parse::<PostTime>()?;
            }
            config.run.trace_loaded();
            let curator = Curator::new(config.run.clone(), collaborators_from_env(&config)?);
            if std::env::var("RUN_NOW").is_ok_and(|v| !v.is_empty()) {
                tracing::info!(command = "schedule", "RUN_NOW set; running once");
                curator.run_once().await;
                return Ok(());
            }
            run_daily(&curator, config.post_time).await
        }
    }
}
