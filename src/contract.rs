//! # contract: seams between the curator core and the outside world
//!
//! This module defines the traits the orchestrator calls for everything that
//! touches the network: content providers, image search, image download and
//! the platform publishers. It also holds the raw records providers return.
//!
//! ## Interface & Extensibility
//! - Implement [`NewsProvider`] / [`SocialProvider`] to plug in a content source.
//! - Implement [`Publisher`] to add a platform; register it as a
//!   [`crate::publish::Platform`].
//! - All network methods are async and return [`CollaboratorError`].
//!
//! ## Mocking & Testing
//! - Every trait is annotated for `mockall` so tests can build deterministic
//!   collaborators (`MockNewsProvider`, `MockPublisher`, ...). The mocks are
//!   exported with the `test-export-mocks` feature for downstream crates.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::content::ContentKind;

/// Error type returned across every collaborator seam.
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

/// Publisher block of a news article.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleSource {
    #[serde(default)]
    pub name: Option<String>,
}

/// A raw news article as returned by the news provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "urlToImage")]
    pub url_to_image: Option<String>,
    #[serde(default)]
    pub source: Option<ArticleSource>,
}

/// A raw social post, already selected by the social provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialPost {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub score: i64,
}

/// Raw response of an image download: status code and body.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedImage {
    pub status: u16,
    pub bytes: Vec<u8>,
}

impl FetchedImage {
    /// 2xx status with a non-empty body.
    pub fn is_usable(&self) -> bool {
        (200..300).contains(&self.status) && !self.bytes.is_empty()
    }
}

/// Source of news articles.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Return at most one candidate article, or `None` when nothing is available.
    async fn fetch_news_article(&self) -> Result<Option<NewsArticle>, CollaboratorError>;
}

/// Source of social posts. The provider does its own ranking and sampling.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait SocialProvider: Send + Sync {
    async fn fetch_social_post(&self) -> Result<Option<SocialPost>, CollaboratorError>;
}

/// Keyword image search used by the second image tier.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ImageSearch: Send + Sync {
    /// Suggest a single image URL for the query.
    async fn search_image(&self, query: &str) -> Result<Option<String>, CollaboratorError>;
}

/// Raw image download.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch_image(&self, url: &str) -> Result<FetchedImage, CollaboratorError>;
}

/// A single publishing target.
///
/// Implementors perform the whole platform interaction (auth, media upload,
/// post creation) and report any failure as an error; the fan-out isolates it.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, caption: &str, image_path: &Path) -> Result<(), CollaboratorError>;
}

/// Policy deciding which content kind `auto` mode starts with.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait SourcePicker: Send + Sync {
    fn pick(&self) -> ContentKind;
}

/// Uniform random choice between news and social.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPicker;

impl SourcePicker for RandomPicker {
    fn pick(&self) -> ContentKind {
        if rand::random::<bool>() {
            ContentKind::News
        } else {
            ContentKind::SocialPost
        }
    }
}
