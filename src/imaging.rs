//! Image resolution: direct download → keyword search → generated card.
//!
//! The resolver always leaves a decodable JPEG at the output path unless the
//! output location itself cannot be written. Downloads are re-encoded, so
//! the file's content always matches its `.jpg` name. Failures of the network tiers
//! are logged and swallowed.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::contract::{CollaboratorError, FetchedImage, ImageFetcher, ImageSearch};
use crate::error::ImageError;
use crate::placeholder;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(20);
const JPEG_QUALITY: u8 = 88;

/// Which tier produced the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageTier {
    Direct,
    Search,
    Placeholder,
}

impl std::fmt::Display for ImageTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageTier::Direct => write!(f, "direct"),
            ImageTier::Search => write!(f, "search"),
            ImageTier::Placeholder => write!(f, "placeholder"),
        }
    }
}

pub struct ImageResolver<'a> {
    fetcher: &'a dyn ImageFetcher,
    search: &'a dyn ImageSearch,
}

impl<'a> ImageResolver<'a> {
    pub fn new(fetcher: &'a dyn ImageFetcher, search: &'a dyn ImageSearch) -> Self {
        Self { fetcher, search }
    }

    pub async fn resolve(
        &self,
        raw_image_url: Option<&str>,
        fallback_query: &str,
        title: &str,
        output_path: &Path,
    ) -> Result<ImageTier, ImageError> {
        prepare_output_dir(output_path)?;

        if let Some(url) = raw_image_url.filter(|u| !u.trim().is_empty()) {
            if self.download_to(url, output_path).await {
                info!(url = %url, "[IMAGE] Downloaded image from content");
                return Ok(ImageTier::Direct);
            }
        }

        match self.search.search_image(fallback_query).await {
            Ok(Some(url)) => {
                if self.download_to(&url, output_path).await {
                    info!(query = %fallback_query, url = %url, "[IMAGE] Downloaded fallback image for query");
                    return Ok(ImageTier::Search);
                }
            }
            Ok(None) => debug!(query = %fallback_query, "[IMAGE] Image search returned nothing"),
            Err(e) => warn!(error = %e, query = %fallback_query, "[IMAGE] Image search failed"),
        }

        write_placeholder(title, output_path)?;
        info!(path = %output_path.display(), "[IMAGE] Generated fallback text image");
        Ok(ImageTier::Placeholder)
    }

    /// One download attempt; `true` only when valid image bytes reached disk.
    async fn download_to(&self, url: &str, output_path: &Path) -> bool {
        let fetched = match self.fetcher.fetch_image(url).await {
            Ok(f) => f,
            Err(e) => {
                warn!(error = %e, url = %url, "[IMAGE] Download failed");
                return false;
            }
        };
        if !fetched.is_usable() {
            warn!(status = fetched.status, size = fetched.bytes.len(), url = %url, "[IMAGE] Download returned no usable body");
            return false;
        }
        let decoded = match image::load_from_memory(&fetched.bytes) {
            Ok(img) => img,
            Err(e) => {
                warn!(error = %e, url = %url, "[IMAGE] Downloaded bytes are not a decodable image");
                return false;
            }
        };
        match write_jpeg(&decoded.to_rgb8(), output_path) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, path = %output_path.display(), "[IMAGE] Failed to write downloaded image");
                false
            }
        }
    }
}

fn prepare_output_dir(output_path: &Path) -> Result<(), ImageError> {
    match output_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            std::fs::create_dir_all(dir).map_err(|source| ImageError::Prepare {
                path: dir.display().to_string(),
                source,
            })
        }
        _ => Ok(()),
    }
}

fn temp_beside(output_path: &Path) -> std::io::Result<NamedTempFile> {
    match output_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => NamedTempFile::new_in(dir),
        _ => NamedTempFile::new_in("."),
    }
}

fn write_placeholder(title: &str, output_path: &Path) -> Result<(), ImageError> {
    write_jpeg(&placeholder::render_card(title), output_path)
}

/// Encode as JPEG through a sibling temp file so the target never holds a partial image.
fn write_jpeg(img: &RgbImage, output_path: &Path) -> Result<(), ImageError> {
    let persist_err = |source: std::io::Error| ImageError::Persist {
        path: output_path.display().to_string(),
        source,
    };
    let mut tmp = temp_beside(output_path).map_err(persist_err)?;
    img.write_with_encoder(JpegEncoder::new_with_quality(tmp.as_file_mut(), JPEG_QUALITY))
        .map_err(|source| ImageError::Encode {
            path: output_path.display().to_string(),
            source,
        })?;
    tmp.persist(output_path).map_err(|e| persist_err(e.error))?;
    Ok(())
}

/// `ImageFetcher` over reqwest.
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new() -> Result<Self, CollaboratorError> {
        let client = reqwest::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch_image(&self, url: &str) -> Result<FetchedImage, CollaboratorError> {
        debug!(url = %url, "[IMAGE] Fetching image");
        let resp = self.client.get(url).send().await?;
        let status = resp.status().as_u16();
        let bytes = resp.bytes().await?.to_vec();
        Ok(FetchedImage { status, bytes })
    }
}
