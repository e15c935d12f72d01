//! Instagram via the Graph API: create a media container, then publish it.

use std::path::Path;

use async_trait::async_trait;
use longevity_curator::contract::{CollaboratorError, Publisher};
use serde::Deserialize;
use tracing::info;

use super::{check, env_opt, image_part, read_image, require};

pub const GRAPH_API_URL: &str = "https://graph.facebook.com/v19.0";

#[derive(Debug, Deserialize)]
struct Created {
    id: String,
}

pub struct InstagramPublisher {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
    account_id: Option<String>,
}

impl InstagramPublisher {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        access_token: Option<String>,
        account_id: Option<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            access_token,
            account_id,
        }
    }

    pub fn from_env(client: reqwest::Client) -> Self {
        Self::new(
            client,
            GRAPH_API_URL,
            env_opt("INSTAGRAM_ACCESS_TOKEN"),
            env_opt("INSTAGRAM_ACCOUNT_ID"),
        )
    }
}

#[async_trait]
impl Publisher for InstagramPublisher {
    async fn publish(&self, caption: &str, image_path: &Path) -> Result<(), CollaboratorError> {
        let token = require(&self.access_token, "INSTAGRAM_ACCESS_TOKEN")?;
        let account = require(&self.account_id, "INSTAGRAM_ACCOUNT_ID")?;
        let bytes = read_image(image_path).await?;

        let form = reqwest::multipart::Form::new().part("source", image_part(bytes, image_path)?);
        let resp = self
            .client
            .post(format!("{}/{account}/media", self.base_url))
            .query(&[("caption", caption), ("access_token", token)])
            .multipart(form)
            .send()
            .await?;
        let container: Created = check(resp, "Instagram media container").await?.json().await?;
        info!(creation_id = %container.id, "[INSTAGRAM] Created media container");

        let resp = self
            .client
            .post(format!("{}/{account}/media_publish", self.base_url))
            .query(&[("creation_id", container.id.as_str()), ("access_token", token)])
            .send()
            .await?;
        check(resp, "Instagram media publish").await?;
        Ok(())
    }
}
