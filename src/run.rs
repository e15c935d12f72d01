//! High-level pipeline: orchestrates select → image → caption → publish for one run.
//!
//! This module provides the top-level orchestration for a single curator
//! run. It implements a linear pipeline that:
//!   - Picks a content kind (fixed by config, or via the [`SourcePicker`] in `auto` mode)
//!     and asks that provider for a candidate, falling back to the other kind once
//!   - Rejects candidates matching the [`Blocklist`]
//!   - Builds the caption and resolves an image through the tiered [`ImageResolver`]
//!   - Fans the result out to every configured [`Platform`] (or reports a dry run)
//!   - Returns a [`RunReport`] describing exactly one terminal outcome
//!
//! # Major Types
//! - [`RunConfig`]: immutable configuration handed to the curator at construction
//! - [`Collaborators`]: capability table of providers, image services and platforms
//! - [`RunReport`] / [`RunOutcome`]: what happened, for logging and tests
//!
//! # Error Handling
//! Missing or blocked content is a normal outcome ([`RunOutcome::NoContent`]).
//! Any unexpected error or panic is caught in [`Curator::run_once`], logged with
//! the state it happened in, and reported as [`RunOutcome::Aborted`]. A run
//! never propagates a failure to its caller.

use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::blocklist::Blocklist;
use crate::caption::build_caption;
use crate::content::{ContentItem, ContentKind};
use crate::contract::{
    ImageFetcher, ImageSearch, NewsProvider, SocialProvider, SourcePicker,
};
use crate::error::{panic_message, CuratorError};
use crate::imaging::{ImageResolver, ImageTier};
use crate::publish::{publish_all, success_count, Platform, PublishResult};

pub const DEFAULT_IMAGE_PATH: &str = "image.jpg";

/// Which provider a run starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostMode {
    /// Pick news or social at random each run.
    #[default]
    Auto,
    News,
    #[serde(alias = "reddit")]
    Social,
}

impl FromStr for PostMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(PostMode::Auto),
            "news" => Ok(PostMode::News),
            "social" | "reddit" => Ok(PostMode::Social),
            other => Err(format!("unknown post mode: {other}")),
        }
    }
}

/// Immutable per-process configuration consumed by the curator.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub mode: PostMode,
    pub dry_run: bool,
    pub blocklist: Blocklist,
    pub image_path: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            mode: PostMode::Auto,
            dry_run: false,
            blocklist: Blocklist::default(),
            image_path: PathBuf::from(DEFAULT_IMAGE_PATH),
        }
    }
}

impl RunConfig {
    pub fn trace_loaded(&self) {
        info!(
            mode = ?self.mode,
            dry_run = self.dry_run,
            blocked_domains = self.blocklist.domains().len(),
            blocked_keywords = self.blocklist.keywords().len(),
            image_path = %self.image_path.display(),
            "Loaded RunConfig"
        );
        debug!(?self, "RunConfig loaded (full debug)");
    }
}

/// Everything the curator talks to, injected at construction.
pub struct Collaborators {
    pub news: Box<dyn NewsProvider>,
    pub social: Box<dyn SocialProvider>,
    pub image_search: Box<dyn ImageSearch>,
    pub image_fetcher: Box<dyn ImageFetcher>,
    pub picker: Box<dyn SourcePicker>,
    pub platforms: Vec<Platform>,
}

/// Pipeline states of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunState {
    SelectingContent,
    ResolvingImage,
    DryRunReport,
    Publishing,
    Done,
    Aborted,
}

/// Terminal outcome of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    Published {
        kind: ContentKind,
        title: String,
        image_tier: ImageTier,
        results: Vec<PublishResult>,
        succeeded: usize,
        total: usize,
    },
    DryRun {
        kind: ContentKind,
        title: String,
        caption: String,
        image_path: PathBuf,
        image_tier: ImageTier,
        results: Vec<PublishResult>,
    },
    /// Nothing passed selection for either content kind.
    NoContent,
    Aborted {
        state: RunState,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub elapsed: Duration,
    pub outcome: RunOutcome,
}

/// Last state entered, readable after a failure or panic.
#[derive(Debug)]
struct StateTracker(Mutex<RunState>);

impl StateTracker {
    fn new() -> Self {
        Self(Mutex::new(RunState::SelectingContent))
    }

    fn enter(&self, state: RunState) {
        debug!(?state, "[RUN] Entering state");
        if let Ok(mut current) = self.0.lock() {
            *current = state;
        }
    }

    fn current(&self) -> RunState {
        match self.0.lock() {
            Ok(current) => *current,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

pub struct Curator {
    config: RunConfig,
    news: Box<dyn NewsProvider>,
    social: Box<dyn SocialProvider>,
    image_search: Box<dyn ImageSearch>,
    image_fetcher: Box<dyn ImageFetcher>,
    picker: Box<dyn SourcePicker>,
    platforms: Vec<Platform>,
}

impl Curator {
    pub fn new(config: RunConfig, collaborators: Collaborators) -> Self {
        let Collaborators {
            news,
            social,
            image_search,
            image_fetcher,
            picker,
            platforms,
        } = collaborators;
        Self {
            config,
            news,
            social,
            image_search,
            image_fetcher,
            picker,
            platforms,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    /// Execute one complete run. Never fails and never panics; every
    /// problem is folded into the returned outcome.
    pub async fn run_once(&self) -> RunReport {
        let run_id = Uuid::new_v4();
        let span = info_span!("run", %run_id);
        let started = Instant::now();
        span.in_scope(|| info!(mode = ?self.config.mode, dry_run = self.config.dry_run, "[RUN] Starting execution"));

        let state = StateTracker::new();
        let result = AssertUnwindSafe(self.pipeline(&state))
            .catch_unwind()
            .instrument(span.clone())
            .await;

        let outcome = match result {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                let at = state.current();
                span.in_scope(|| error!(state = ?at, error = %e, details = ?e, "[RUN][ERROR] Critical error"));
                RunOutcome::Aborted {
                    state: at,
                    reason: e.to_string(),
                }
            }
            Err(panic) => {
                let at = state.current();
                let err = CuratorError::Panic {
                    state: at,
                    message: panic_message(panic.as_ref()),
                };
                span.in_scope(|| error!(state = ?at, error = %err, "[RUN][ERROR] Critical error"));
                RunOutcome::Aborted {
                    state: at,
                    reason: err.to_string(),
                }
            }
        };
        if matches!(outcome, RunOutcome::Aborted { .. }) {
            state.enter(RunState::Aborted);
        }

        let report = RunReport {
            run_id,
            elapsed: started.elapsed(),
            outcome,
        };
        span.in_scope(|| {
            log_terminal(&report);
            match serde_json::to_string(&report) {
                Ok(json) => debug!(json = %json, "[RUN][DEBUG] Run report as JSON"),
                Err(e) => debug!(error = ?e, "[RUN][DEBUG] Failed to serialize run report"),
            }
        });
        report
    }

    async fn pipeline(&self, state: &StateTracker) -> Result<RunOutcome, CuratorError> {
        state.enter(RunState::SelectingContent);
        let Some(item) = self.select_content().await else {
            // a valid terminal outcome, not an error
            state.enter(RunState::Aborted);
            return Ok(RunOutcome::NoContent);
        };
        info!(kind = %item.kind, title = %item.title, url = %item.source_url, "[RUN] Selected content");

        let caption = build_caption(&item);
        debug!(caption = %caption, chars = caption.counted_len(), "[RUN] Built caption");

        state.enter(RunState::ResolvingImage);
        let resolver = ImageResolver::new(self.image_fetcher.as_ref(), self.image_search.as_ref());
        let image_tier = resolver
            .resolve(
                item.raw_image_url.as_deref(),
                &item.fallback_query,
                &item.title,
                &self.config.image_path,
            )
            .await?;

        if self.config.dry_run {
            state.enter(RunState::DryRunReport);
            info!(caption = %caption, "[DRY RUN] Caption");
            info!(path = %self.config.image_path.display(), "[DRY RUN] Image path");
            let results = publish_all(&caption, &self.config.image_path, &self.platforms, true).await;
            state.enter(RunState::Done);
            return Ok(RunOutcome::DryRun {
                kind: item.kind,
                title: item.title,
                caption: caption.as_str().to_string(),
                image_path: self.config.image_path.clone(),
                image_tier,
                results,
            });
        }

        state.enter(RunState::Publishing);
        let results = publish_all(&caption, &self.config.image_path, &self.platforms, false).await;
        state.enter(RunState::Done);
        Ok(RunOutcome::Published {
            kind: item.kind,
            title: item.title,
            image_tier,
            succeeded: success_count(&results),
            total: self.platforms.len(),
            results,
        })
    }

    /// Try the preferred kind, then the other one exactly once.
    async fn select_content(&self) -> Option<ContentItem> {
        let first = match self.config.mode {
            PostMode::Auto => self.picker.pick(),
            PostMode::News => ContentKind::News,
            PostMode::Social => ContentKind::SocialPost,
        };
        if let Some(item) = self.fetch_candidate(first).await {
            return Some(item);
        }
        info!(from = %first, to = %first.other(), "[RUN] Falling back to alternate source");
        self.fetch_candidate(first.other()).await
    }

    async fn fetch_candidate(&self, kind: ContentKind) -> Option<ContentItem> {
        let (raw_title, raw_url, item) = match kind {
            ContentKind::News => match self.news.fetch_news_article().await {
                Ok(Some(article)) => (
                    article.title.clone().unwrap_or_default(),
                    article.url.clone().unwrap_or_default(),
                    ContentItem::from_news(&article),
                ),
                Ok(None) => {
                    info!(kind = %kind, "[RUN] Provider returned no content");
                    return None;
                }
                Err(e) => {
                    warn!(kind = %kind, error = %e, "[RUN] Provider failed");
                    return None;
                }
            },
            ContentKind::SocialPost => match self.social.fetch_social_post().await {
                Ok(Some(post)) => (
                    post.title.clone().unwrap_or_default(),
                    post.url.clone().unwrap_or_default(),
                    ContentItem::from_social(&post),
                ),
                Ok(None) => {
                    info!(kind = %kind, "[RUN] Provider returned no content");
                    return None;
                }
                Err(e) => {
                    warn!(kind = %kind, error = %e, "[RUN] Provider failed");
                    return None;
                }
            },
        };

        if self.config.blocklist.is_blocked(&raw_title, &raw_url) {
            info!(kind = %kind, title = %raw_title, url = %raw_url, "[RUN] Candidate blocked");
            return None;
        }
        Some(item)
    }
}

/// The single summary line every run ends with.
fn log_terminal(report: &RunReport) {
    let secs = report.elapsed.as_secs_f64();
    match &report.outcome {
        RunOutcome::Published {
            kind,
            title,
            image_tier,
            succeeded,
            total,
            ..
        } => info!(
            kind = %kind,
            title = %title,
            image_tier = %image_tier,
            "[RUN] Completed in {secs:.2}s. Posted to {succeeded}/{total} platforms."
        ),
        RunOutcome::DryRun {
            kind,
            title,
            image_tier,
            results,
            ..
        } => {
            let names: Vec<&str> = results.iter().map(|r| r.platform.as_str()).collect();
            info!(
                kind = %kind,
                title = %title,
                image_tier = %image_tier,
                "[DRY RUN] Completed in {secs:.2}s. Would post to: {}",
                names.join(", ")
            )
        }
        RunOutcome::NoContent => {
            warn!("[RUN] No suitable content found today. Finished in {secs:.2}s.")
        }
        RunOutcome::Aborted { state, reason } => error!(
            state = ?state,
            "[RUN] Aborted after {secs:.2}s: {reason}"
        ),
    }
}
