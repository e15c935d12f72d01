//! Fan-out of one caption and image to every configured platform.

use std::panic::AssertUnwindSafe;
use std::path::Path;

use futures::FutureExt;
use serde::Serialize;
use tracing::{error, info};

use crate::caption::Caption;
use crate::contract::Publisher;
use crate::error::panic_message;

/// A named publishing slot.
pub struct Platform {
    pub name: String,
    pub publisher: Box<dyn Publisher>,
}

impl Platform {
    pub fn new(name: impl Into<String>, publisher: Box<dyn Publisher>) -> Self {
        Self {
            name: name.into(),
            publisher,
        }
    }
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform").field("name", &self.name).finish()
    }
}

/// Outcome of one platform attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishResult {
    pub platform: String,
    pub succeeded: bool,
    pub error: Option<String>,
    /// Synthetic "would publish" result; no publisher was called.
    pub dry_run: bool,
}

impl PublishResult {
    fn published(platform: &str) -> Self {
        Self {
            platform: platform.to_string(),
            succeeded: true,
            error: None,
            dry_run: false,
        }
    }

    fn failed(platform: &str, error: String) -> Self {
        Self {
            platform: platform.to_string(),
            succeeded: false,
            error: Some(error),
            dry_run: false,
        }
    }

    fn would_publish(platform: &str) -> Self {
        Self {
            platform: platform.to_string(),
            succeeded: true,
            error: None,
            dry_run: true,
        }
    }
}

/// Publish to each platform in order. One failure, error or panic, never
/// prevents the next attempt; the result list always has one entry per platform.
pub async fn publish_all(
    caption: &Caption,
    image_path: &Path,
    platforms: &[Platform],
    dry_run: bool,
) -> Vec<PublishResult> {
    if dry_run {
        return platforms
            .iter()
            .map(|p| {
                info!(platform = %p.name, "[DRY RUN] Would publish");
                PublishResult::would_publish(&p.name)
            })
            .collect();
    }

    let mut results = Vec::with_capacity(platforms.len());
    for platform in platforms {
        info!(platform = %platform.name, "[PUBLISH] Posting");
        let attempt = AssertUnwindSafe(platform.publisher.publish(caption.as_str(), image_path))
            .catch_unwind()
            .await;
        let result = match attempt {
            Ok(Ok(())) => {
                info!(platform = %platform.name, "[PUBLISH] Posted successfully");
                PublishResult::published(&platform.name)
            }
            Ok(Err(e)) => {
                error!(platform = %platform.name, error = %e, "[PUBLISH][ERROR] Failed to post");
                PublishResult::failed(&platform.name, e.to_string())
            }
            Err(panic) => {
                let message = format!("publisher panicked: {}", panic_message(panic.as_ref()));
                error!(platform = %platform.name, error = %message, "[PUBLISH][ERROR] Failed to post");
                PublishResult::failed(&platform.name, message)
            }
        };
        results.push(result);
    }
    results
}

/// Number of real (non dry-run) successful publishes.
pub fn success_count(results: &[PublishResult]) -> usize {
    results
        .iter()
        .filter(|r| r.succeeded && !r.dry_run)
        .count()
}
