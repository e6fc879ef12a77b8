use crate::domain::model::{TransientArtifact, VerifiedImage};
use crate::domain::ports::ImageVerifier;
use crate::utils::error::{BroadcastError, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_IMAGE_BASE_URL: &str = "https://images.nypl.org/index.php";
pub const DEFAULT_IMAGE_TIMEOUT: Duration = Duration::from_secs(30);

/// `<base>?id=<image_ref>&t=w`, the archive's full-width rendition.
pub fn image_url(base_url: &str, image_ref: &str) -> Result<String> {
    let mut url = Url::parse(base_url).map_err(|e| BroadcastError::InvalidConfigValueError {
        field: "image_base_url".to_string(),
        value: base_url.to_string(),
        reason: format!("Invalid URL format: {}", e),
    })?;
    url.query_pairs_mut()
        .append_pair("id", image_ref)
        .append_pair("t", "w");
    Ok(url.into())
}

fn file_component(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// Downloads the card image once to prove the public URL serves an image.
#[derive(Debug, Clone)]
pub struct HttpImageVerifier {
    client: Client,
    base_url: String,
    artifact_dir: PathBuf,
    timeout: Duration,
}

impl HttpImageVerifier {
    pub fn new(base_url: impl Into<String>, artifact_dir: impl Into<PathBuf>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            artifact_dir: artifact_dir.into(),
            timeout: DEFAULT_IMAGE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl ImageVerifier for HttpImageVerifier {
    async fn verify(&self, image_ref: &str) -> Result<VerifiedImage> {
        let url = image_url(&self.base_url, image_ref)?;
        tracing::info!("Verifying image at {}", url);

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| BroadcastError::network(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BroadcastError::network(&url, format!("HTTP {}", status)));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.to_ascii_lowercase().starts_with("image/") {
            return Err(BroadcastError::NotAnImage { url, content_type });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| BroadcastError::network(&url, e))?;

        let path = tempfile::Builder::new()
            .prefix(&format!("temp_card_{}_", file_component(image_ref)))
            .suffix(".jpg")
            .tempfile_in(&self.artifact_dir)?
            .into_temp_path();
        tokio::fs::write(&path, &body).await?;
        tracing::debug!("Saved {} bytes to {}", body.len(), path.display());

        Ok(VerifiedImage {
            artifact: TransientArtifact::new(path),
            url,
            content_type,
            bytes: body.len(),
        })
    }
}
