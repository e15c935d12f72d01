/// `load_config` module: loads the optional YAML config, applies environment
/// overrides, and adapts the result into the core's immutable `RunConfig`.
///
/// # Responsibilities
/// - Parse the user-supplied YAML file (no secrets) into typed sections
/// - Apply environment overrides (`POST_MODE`, `DRY_RUN`, `BLOCKLIST_DOMAINS`,
///   `BLOCKLIST_KEYWORDS`, `POST_TIME`, `IMAGE_PATH`)
/// - Reject unknown modes, platforms and malformed times with clear diagnostics
///
/// Secrets (API keys, tokens, passwords) are never read here; each provider
/// and publisher reads its own from the environment.
///
/// # Errors
/// All errors use `anyhow::Error` and surface at the CLI boundary.
use anyhow::{anyhow, Context, Result};
use longevity_curator::run::DEFAULT_IMAGE_PATH;
use longevity_curator::{Blocklist, PostMode, RunConfig};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::platforms::PlatformKind;
use crate::schedule::PostTime;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    mode: Option<PostMode>,
    #[serde(default)]
    dry_run: Option<bool>,
    #[serde(default)]
    image_path: Option<PathBuf>,
    #[serde(default)]
    blocklist: BlocklistSection,
    #[serde(default)]
    platforms: Option<Vec<PlatformKind>>,
    #[serde(default)]
    post_time: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct BlocklistSection {
    #[serde(default)]
    domains: Vec<String>,
    #[serde(default)]
    keywords: Vec<String>,
}

/// Fully resolved CLI configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CliConfig {
    pub run: RunConfig,
    pub platforms: Vec<PlatformKind>,
    pub post_time: PostTime,
}

/// Load `path` (when given), then apply environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<CliConfig> {
    let file = match path {
        Some(path) => read_file(path)?,
        None => {
            info!("No config file given; using defaults and environment");
            FileConfig::default()
        }
    };

    let mode = match env_var("POST_MODE") {
        Some(raw) => raw.parse::<PostMode>().map_err(|e| anyhow!("POST_MODE: {e}"))?,
        None => file.mode.unwrap_or_default(),
    };
    let dry_run = match env_var("DRY_RUN") {
        Some(raw) => parse_flag(&raw),
        None => file.dry_run.unwrap_or(false),
    };
    let image_path = env_var("IMAGE_PATH")
        .map(PathBuf::from)
        .or(file.image_path)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGE_PATH));

    let blocklist = match (env_var("BLOCKLIST_DOMAINS"), env_var("BLOCKLIST_KEYWORDS")) {
        (None, None) => Blocklist::new(&file.blocklist.domains, &file.blocklist.keywords),
        (domains, keywords) => {
            let domains: Vec<String> = match domains {
                Some(csv) => csv.split(',').map(str::to_string).collect(),
                None => file.blocklist.domains,
            };
            let keywords: Vec<String> = match keywords {
                Some(csv) => csv.split(',').map(str::to_string).collect(),
                None => file.blocklist.keywords,
            };
            Blocklist::new(&domains, &keywords)
        }
    };

    let post_time = match env_var("POST_TIME").or(file.post_time) {
        Some(raw) => raw.parse::<PostTime>().context("POST_TIME")?,
        None => PostTime::default(),
    };
    let platforms = file.platforms.unwrap_or_else(|| PlatformKind::ALL.to_vec());

    let config = CliConfig {
        run: RunConfig {
            mode,
            dry_run,
            blocklist,
            image_path,
        },
        platforms,
        post_time,
    };
    info!(
        platforms = ?config.platforms,
        post_time = %config.post_time,
        "Configuration resolved"
    );
    Ok(config)
}

fn read_file(path: &Path) -> Result<FileConfig> {
    info!(config_path = ?path, "Loading configuration from file");
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to read config file");
            return Err(anyhow!("Failed to read config file {:?}: {}", path, e));
        }
    };
    if content.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    match serde_yaml::from_str(&content) {
        Ok(conf) => {
            info!(config_path = ?path, "Parsed config YAML successfully");
            Ok(conf)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to parse config YAML");
            Err(anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}

fn env_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// `true`, `1`, `yes` or `on` (any case) enable a flag; anything else disables it.
pub fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}
