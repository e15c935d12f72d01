//! Facebook page photo post.

use std::path::Path;

use async_trait::async_trait;
use longevity_curator::contract::{CollaboratorError, Publisher};

use super::{check, env_opt, image_part, read_image, require};

pub const FACEBOOK_GRAPH_URL: &str = "https://graph.facebook.com";

pub struct FacebookPublisher {
    client: reqwest::Client,
    base_url: String,
    page_token: Option<String>,
    page_id: Option<String>,
}

impl FacebookPublisher {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        page_token: Option<String>,
        page_id: Option<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            page_token,
            page_id,
        }
    }

    pub fn from_env(client: reqwest::Client) -> Self {
        Self::new(
            client,
            FACEBOOK_GRAPH_URL,
            env_opt("FACEBOOK_PAGE_ACCESS_TOKEN"),
            env_opt("FACEBOOK_PAGE_ID"),
        )
    }
}

#[async_trait]
impl Publisher for FacebookPublisher {
    async fn publish(&self, caption: &str, image_path: &Path) -> Result<(), CollaboratorError> {
        let token = require(&self.page_token, "FACEBOOK_PAGE_ACCESS_TOKEN")?;
        let page = require(&self.page_id, "FACEBOOK_PAGE_ID")?;
        let bytes = read_image(image_path).await?;

        let form = reqwest::multipart::Form::new()
            .text("caption", caption.to_string())
            .text("access_token", token.to_string())
            .part("source", image_part(bytes, image_path)?);
        let resp = self
            .client
            .post(format!("{}/{page}/photos", self.base_url))
            .multipart(form)
            .send()
            .await?;
        check(resp, "Facebook photo post").await?;
        Ok(())
    }
}
