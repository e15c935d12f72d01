//! Bluesky via XRPC: create a session, upload the image blob, then create a
//! feed post embedding it.

use std::path::Path;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use longevity_curator::contract::{CollaboratorError, Publisher};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::{check, env_opt, mime_of, read_image, require};

pub const BLUESKY_PDS_URL: &str = "https://bsky.social";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Session {
    access_jwt: String,
    did: String,
}

#[derive(Debug, Deserialize)]
struct UploadedBlob {
    blob: Value,
}

pub struct BlueskyPublisher {
    client: reqwest::Client,
    base_url: String,
    handle: Option<String>,
    password: Option<String>,
}

impl BlueskyPublisher {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        handle: Option<String>,
        password: Option<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            handle,
            password,
        }
    }

    pub fn from_env(client: reqwest::Client) -> Self {
        Self::new(
            client,
            BLUESKY_PDS_URL,
            env_opt("BLUESKY_HANDLE"),
            env_opt("BLUESKY_PASSWORD"),
        )
    }

    fn xrpc(&self, method: &str) -> String {
        format!("{}/xrpc/{method}", self.base_url)
    }
}

#[async_trait]
impl Publisher for BlueskyPublisher {
    async fn publish(&self, caption: &str, image_path: &Path) -> Result<(), CollaboratorError> {
        let handle = require(&self.handle, "BLUESKY_HANDLE")?;
        let password = require(&self.password, "BLUESKY_PASSWORD")?;
        let bytes = read_image(image_path).await?;

        let resp = self
            .client
            .post(self.xrpc("com.atproto.server.createSession"))
            .json(&json!({ "identifier": handle, "password": password }))
            .send()
            .await?;
        let session: Session = check(resp, "Bluesky login").await?.json().await?;
        info!(did = %session.did, "[BLUESKY] Logged in");

        let resp = self
            .client
            .post(self.xrpc("com.atproto.repo.uploadBlob"))
            .bearer_auth(&session.access_jwt)
            .header(reqwest::header::CONTENT_TYPE, mime_of(image_path))
            .body(bytes)
            .send()
            .await?;
        let uploaded: UploadedBlob = check(resp, "Bluesky blob upload").await?.json().await?;

        let record = json!({
            "repo": session.did,
            "collection": "app.bsky.feed.post",
            "record": {
                "$type": "app.bsky.feed.post",
                "text": caption,
                "createdAt": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                "embed": {
                    "$type": "app.bsky.embed.images",
                    "images": [{ "alt": caption, "image": uploaded.blob }],
                },
            },
        });
        let resp = self
            .client
            .post(self.xrpc("com.atproto.repo.createRecord"))
            .bearer_auth(&session.access_jwt)
            .json(&record)
            .send()
            .await?;
        check(resp, "Bluesky create record").await?;
        Ok(())
    }
}
