//! Publishing targets: one `Publisher` per platform.
//!
//! Credentials come from the environment. A publisher with missing
//! credentials is still registered; its `publish` fails, and the fan-out
//! records that failure without affecting the other platforms.

use std::env;
use std::path::Path;
use std::time::Duration;

use longevity_curator::contract::{CollaboratorError, Publisher};
use longevity_curator::Platform;
use serde::Deserialize;

pub mod bluesky;
pub mod facebook;
pub mod instagram;
pub mod twitter;

pub use bluesky::BlueskyPublisher;
pub use facebook::FacebookPublisher;
pub use instagram::InstagramPublisher;
pub use twitter::TwitterPublisher;

const PUBLISH_TIMEOUT: Duration = Duration::from_secs(60);

/// Platforms in their default publishing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    Twitter,
    Instagram,
    Facebook,
    Bluesky,
}

impl PlatformKind {
    pub const ALL: [PlatformKind; 4] = [
        PlatformKind::Twitter,
        PlatformKind::Instagram,
        PlatformKind::Facebook,
        PlatformKind::Bluesky,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            PlatformKind::Twitter => "Twitter/X",
            PlatformKind::Instagram => "Instagram",
            PlatformKind::Facebook => "Facebook",
            PlatformKind::Bluesky => "Bluesky",
        }
    }

    fn publisher_from_env(&self, client: reqwest::Client) -> Box<dyn Publisher> {
        match self {
            PlatformKind::Twitter => Box::new(TwitterPublisher::from_env(client)),
            PlatformKind::Instagram => Box::new(InstagramPublisher::from_env(client)),
            PlatformKind::Facebook => Box::new(FacebookPublisher::from_env(client)),
            PlatformKind::Bluesky => Box::new(BlueskyPublisher::from_env(client)),
        }
    }
}

impl std::str::FromStr for PlatformKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "twitter" | "x" => Ok(PlatformKind::Twitter),
            "instagram" => Ok(PlatformKind::Instagram),
            "facebook" => Ok(PlatformKind::Facebook),
            "bluesky" => Ok(PlatformKind::Bluesky),
            other => Err(format!("unknown platform: {other}")),
        }
    }
}

/// Build the ordered platform table from the environment.
pub fn platforms_from_env(kinds: &[PlatformKind]) -> Result<Vec<Platform>, CollaboratorError> {
    let client = reqwest::Client::builder().timeout(PUBLISH_TIMEOUT).build()?;
    Ok(kinds
        .iter()
        .map(|kind| Platform::new(kind.display_name(), kind.publisher_from_env(client.clone())))
        .collect())
}

pub(crate) fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Credential lookup at publish time.
pub(crate) fn require<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, CollaboratorError> {
    value
        .as_deref()
        .ok_or_else(|| format!("{name} not set in environment").into())
}

pub(crate) async fn read_image(path: &Path) -> Result<Vec<u8>, CollaboratorError> {
    Ok(tokio::fs::read(path).await?)
}

/// Multipart part carrying the image file.
pub(crate) fn image_part(bytes: Vec<u8>, path: &Path) -> Result<reqwest::multipart::Part, CollaboratorError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image.jpg".to_string());
    Ok(reqwest::multipart::Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(mime_of(path))?)
}

pub(crate) fn mime_of(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

/// Turn a non-2xx response into an error carrying the body.
pub(crate) async fn check(resp: reqwest::Response, what: &str) -> Result<reqwest::Response, CollaboratorError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(format!("{what} failed with {status}: {body}").into())
}
