//! The unit of content flowing through a run.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::contract::{NewsArticle, SocialPost};

pub const DEFAULT_NEWS_TITLE: &str = "Interesting health article";
pub const DEFAULT_SOCIAL_TITLE: &str = "Trending on Reddit";

pub const NEWS_FALLBACK_QUERY: &str = "health longevity wellness";
pub const SOCIAL_FALLBACK_QUERY: &str = "health longevity";

/// Which provider shape an item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    News,
    SocialPost,
}

impl ContentKind {
    /// The kind to try when this one yields nothing.
    pub fn other(self) -> Self {
        match self {
            ContentKind::News => ContentKind::SocialPost,
            ContentKind::SocialPost => ContentKind::News,
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentKind::News => write!(f, "news"),
            ContentKind::SocialPost => write!(f, "social"),
        }
    }
}

/// A selected piece of content. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentItem {
    pub kind: ContentKind,
    pub title: String,
    pub source_url: String,
    pub source_name: Option<String>,
    pub raw_image_url: Option<String>,
    pub fallback_query: String,
}

impl ContentItem {
    pub fn from_news(article: &NewsArticle) -> Self {
        let item = ContentItem {
            kind: ContentKind::News,
            title: title_or_default(article.title.as_deref(), DEFAULT_NEWS_TITLE),
            source_url: article.url.clone().unwrap_or_default(),
            source_name: article
                .source
                .as_ref()
                .and_then(|s| s.name.as_deref())
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_owned),
            raw_image_url: normalize_image_url(article.url_to_image.as_deref()),
            fallback_query: NEWS_FALLBACK_QUERY.to_string(),
        };
        debug!(?item, "Built content item from news article");
        item
    }

    pub fn from_social(post: &SocialPost) -> Self {
        let item = ContentItem {
            kind: ContentKind::SocialPost,
            title: title_or_default(post.title.as_deref(), DEFAULT_SOCIAL_TITLE),
            source_url: post.url.clone().unwrap_or_default(),
            source_name: None,
            raw_image_url: normalize_image_url(post.image_url.as_deref()),
            fallback_query: SOCIAL_FALLBACK_QUERY.to_string(),
        };
        debug!(?item, "Built content item from social post");
        item
    }
}

fn title_or_default(title: Option<&str>, default: &str) -> String {
    match title.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => default.to_string(),
    }
}

/// Empty URLs become `None`; HTML-escaped ampersands are decoded.
pub fn normalize_image_url(url: Option<&str>) -> Option<String> {
    let url = url?.trim();
    if url.is_empty() {
        return None;
    }
    Some(url.replace("&amp;", "&"))
}
