//! Concrete content and image-search providers over reqwest.
//!
//! Every client reads its credentials from the environment. A missing
//! credential is not an error: the provider reports "no content" and the
//! curator falls back to the next source.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use longevity_curator::contract::{
    CollaboratorError, ImageSearch, NewsArticle, NewsProvider, SocialPost, SocialProvider,
};
use rand::seq::SliceRandom;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info, warn};

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(15);

pub const NEWSAPI_BASE_URL: &str = "https://newsapi.org";
pub const NEWS_QUERY: &str = "(longevity OR \"healthspan\" OR \"anti-aging\" OR \"healthy aging\" OR nutrition OR exercise OR sleep) AND (study OR research OR science OR evidence OR trial)";
const NEWS_PAGE_SIZE: u32 = 20;

pub const REDDIT_AUTH_URL: &str = "https://www.reddit.com";
pub const REDDIT_API_URL: &str = "https://oauth.reddit.com";
pub const REDDIT_SUBS: [&str; 5] = ["Longevity", "Nutrition", "Biohackers", "HealthyFood", "Fitness"];
pub const DEFAULT_USER_AGENT: &str = "longevity-curator/1.0";
const REDDIT_LIMIT: u32 = 25;
const REDDIT_TOP_N: usize = 8;

pub const UNSPLASH_BASE_URL: &str = "https://api.unsplash.com";

fn http_client(user_agent: &str) -> Result<reqwest::Client, CollaboratorError> {
    Ok(reqwest::Client::builder()
        .timeout(PROVIDER_TIMEOUT)
        .user_agent(user_agent)
        .build()?)
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

// ---- NewsAPI ----

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    #[serde(default)]
    articles: Vec<NewsArticle>,
}

/// `NewsProvider` over NewsAPI's `/v2/everything`.
pub struct NewsApiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl NewsApiClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self, CollaboratorError> {
        Ok(Self {
            client: http_client(DEFAULT_USER_AGENT)?,
            base_url: base_url.into(),
            api_key,
        })
    }

    pub fn from_env() -> Result<Self, CollaboratorError> {
        let api_key = non_empty_env("NEWSAPI_KEY");
        info!(api_key_set = api_key.is_some(), "Initialized NewsApiClient from environment");
        Self::new(NEWSAPI_BASE_URL, api_key)
    }
}

/// Prefer articles carrying an image; otherwise any article will do.
fn pick_article(articles: Vec<NewsArticle>) -> Option<NewsArticle> {
    let (with_image, without): (Vec<_>, Vec<_>) = articles
        .into_iter()
        .partition(|a| a.url_to_image.as_deref().is_some_and(|u| !u.is_empty()));
    let pool = if with_image.is_empty() { without } else { with_image };
    pool.choose(&mut rand::thread_rng()).cloned()
}

#[async_trait]
impl NewsProvider for NewsApiClient {
    async fn fetch_news_article(&self) -> Result<Option<NewsArticle>, CollaboratorError> {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!("[NEWS] NEWSAPI_KEY not set; skipping news");
            return Ok(None);
        };
        let page_size = NEWS_PAGE_SIZE.to_string();
        let resp: EverythingResponse = self
            .client
            .get(format!("{}/v2/everything", self.base_url))
            .query(&[
                ("q", NEWS_QUERY),
                ("language", "en"),
                ("sortBy", "publishedAt"),
                ("pageSize", page_size.as_str()),
                ("apiKey", api_key),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        info!(count = resp.articles.len(), "[NEWS] Fetched articles");
        Ok(pick_article(resp.articles))
    }
}

// ---- Reddit ----

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: RedditPost,
}

#[derive(Debug, Deserialize)]
struct RedditPost {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    preview: Option<Preview>,
}

#[derive(Debug, Deserialize)]
struct Preview {
    #[serde(default)]
    images: Vec<PreviewImage>,
}

#[derive(Debug, Deserialize)]
struct PreviewImage {
    source: PreviewSource,
}

#[derive(Debug, Deserialize)]
struct PreviewSource {
    url: String,
}

/// `SocialProvider` over Reddit's app-only OAuth API.
pub struct RedditClient {
    client: reqwest::Client,
    auth_url: String,
    api_url: String,
    credentials: Option<(String, String)>,
    image_ext: Regex,
}

impl RedditClient {
    pub fn new(
        auth_url: impl Into<String>,
        api_url: impl Into<String>,
        credentials: Option<(String, String)>,
        user_agent: &str,
    ) -> Result<Self, CollaboratorError> {
        Ok(Self {
            client: http_client(user_agent)?,
            auth_url: auth_url.into(),
            api_url: api_url.into(),
            credentials,
            image_ext: Regex::new(r"(?i)\.(jpe?g|png)$")?,
        })
    }

    pub fn from_env() -> Result<Self, CollaboratorError> {
        let credentials = non_empty_env("REDDIT_CLIENT_ID").zip(non_empty_env("REDDIT_CLIENT_SECRET"));
        let user_agent = non_empty_env("REDDIT_USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        info!(
            credentials_set = credentials.is_some(),
            user_agent = %user_agent,
            "Initialized RedditClient from environment"
        );
        Self::new(REDDIT_AUTH_URL, REDDIT_API_URL, credentials, &user_agent)
    }

    async fn access_token(&self, client_id: &str, secret: &str) -> Result<String, CollaboratorError> {
        let token: TokenResponse = self
            .client
            .post(format!("{}/api/v1/access_token", self.auth_url))
            .basic_auth(client_id, Some(secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(token.access_token)
    }

    /// Preview image first, else the link itself when it points at an image file.
    fn image_of(&self, post: &RedditPost) -> Option<String> {
        post.preview
            .as_ref()
            .and_then(|p| p.images.first())
            .map(|img| img.source.url.clone())
            .or_else(|| post.url.clone().filter(|u| self.image_ext.is_match(u)))
    }

    async fn top_posts(&self, subreddit: &str, token: &str) -> Result<Vec<SocialPost>, CollaboratorError> {
        let limit = REDDIT_LIMIT.to_string();
        let listing: Listing = self
            .client
            .get(format!("{}/r/{subreddit}/top", self.api_url))
            .bearer_auth(token)
            .query(&[("t", "week"), ("limit", limit.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(listing
            .data
            .children
            .into_iter()
            .map(|c| {
                let image_url = self.image_of(&c.data);
                SocialPost {
                    title: c.data.title,
                    url: c.data.url,
                    image_url,
                    score: c.data.score,
                }
            })
            .collect())
    }
}

/// Highest-scoring posts first; one of the top few at random.
pub fn pick_top_post(mut posts: Vec<SocialPost>) -> Option<SocialPost> {
    posts.sort_by(|a, b| b.score.cmp(&a.score));
    posts.truncate(REDDIT_TOP_N);
    posts.choose(&mut rand::thread_rng()).cloned()
}

#[async_trait]
impl SocialProvider for RedditClient {
    async fn fetch_social_post(&self) -> Result<Option<SocialPost>, CollaboratorError> {
        let Some((client_id, secret)) = self.credentials.as_ref() else {
            debug!("[REDDIT] Reddit credentials not set; skipping social");
            return Ok(None);
        };
        let subreddit = REDDIT_SUBS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(REDDIT_SUBS[0]);
        let token = self.access_token(client_id, secret).await?;
        let posts = self.top_posts(subreddit, &token).await?;
        info!(subreddit = %subreddit, count = posts.len(), "[REDDIT] Fetched top posts of the week");
        Ok(pick_top_post(posts))
    }
}

// ---- Unsplash ----

#[derive(Debug, Deserialize)]
struct UnsplashPhoto {
    urls: UnsplashUrls,
}

#[derive(Debug, Deserialize)]
struct UnsplashUrls {
    #[serde(default)]
    regular: Option<String>,
}

/// `ImageSearch` over Unsplash's random photo endpoint.
pub struct UnsplashClient {
    client: reqwest::Client,
    base_url: String,
    access_key: Option<String>,
}

impl UnsplashClient {
    pub fn new(base_url: impl Into<String>, access_key: Option<String>) -> Result<Self, CollaboratorError> {
        Ok(Self {
            client: http_client(DEFAULT_USER_AGENT)?,
            base_url: base_url.into(),
            access_key,
        })
    }

    pub fn from_env() -> Result<Self, CollaboratorError> {
        let access_key = non_empty_env("UNSPLASH_ACCESS_KEY");
        info!(access_key_set = access_key.is_some(), "Initialized UnsplashClient from environment");
        Self::new(UNSPLASH_BASE_URL, access_key)
    }
}

#[async_trait]
impl ImageSearch for UnsplashClient {
    async fn search_image(&self, query: &str) -> Result<Option<String>, CollaboratorError> {
        let Some(key) = self.access_key.as_deref() else {
            debug!("[UNSPLASH] UNSPLASH_ACCESS_KEY not set; skipping image search");
            return Ok(None);
        };
        let resp = self
            .client
            .get(format!("{}/photos/random", self.base_url))
            .query(&[("query", query), ("client_id", key)])
            .send()
            .await?;
        if !resp.status().is_success() {
            warn!(status = %resp.status(), query = %query, "[UNSPLASH] Search request rejected");
            return Ok(None);
        }
        let photo: UnsplashPhoto = resp.json().await?;
        Ok(photo.urls.regular.filter(|u| !u.is_empty()))
    }
}
