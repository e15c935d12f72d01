//! Twitter/X via the v2 API: media upload, then a post referencing it.
//! Authenticates with an OAuth 2.0 user-context token (`TWITTER_ACCESS_TOKEN`).

use std::path::Path;

use async_trait::async_trait;
use longevity_curator::contract::{CollaboratorError, Publisher};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::{check, env_opt, image_part, read_image, require};

pub const TWITTER_API_URL: &str = "https://api.x.com";

#[derive(Debug, Deserialize)]
struct MediaUpload {
    data: MediaData,
}

#[derive(Debug, Deserialize)]
struct MediaData {
    id: String,
}

pub struct TwitterPublisher {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl TwitterPublisher {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, access_token: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            access_token,
        }
    }

    pub fn from_env(client: reqwest::Client) -> Self {
        Self::new(client, TWITTER_API_URL, env_opt("TWITTER_ACCESS_TOKEN"))
    }
}

#[async_trait]
impl Publisher for TwitterPublisher {
    async fn publish(&self, caption: &str, image_path: &Path) -> Result<(), CollaboratorError> {
        let token = require(&self.access_token, "TWITTER_ACCESS_TOKEN")?;
        let bytes = read_image(image_path).await?;

        let form = reqwest::multipart::Form::new()
            .text("media_category", "tweet_image")
            .part("media", image_part(bytes, image_path)?);
        let resp = self
            .client
            .post(format!("{}/2/media/upload", self.base_url))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;
        let media: MediaUpload = check(resp, "Twitter media upload").await?.json().await?;
        info!(media_id = %media.data.id, "[TWITTER] Uploaded media");

        let resp = self
            .client
            .post(format!("{}/2/tweets", self.base_url))
            .bearer_auth(token)
            .json(&json!({
                "text": caption,
                "media": { "media_ids": [media.data.id] },
            }))
            .send()
            .await?;
        check(resp, "Twitter create post").await?;
        Ok(())
    }
}
