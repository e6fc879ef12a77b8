#[cfg(feature = "cli")]
pub mod cli;
pub mod collections;

use crate::core::broadcast::BroadcastTemplate;
use crate::core::engine::RetryPolicy;
use crate::utils::error::{BroadcastError, Result};
use crate::utils::validation::{
    validate_email, validate_path, validate_range, validate_url, Validate,
};
use std::time::Duration;

/// Settings for one broadcast run, after required values have been checked.
#[derive(Clone)]
pub struct BroadcastConfig {
    pub resend_api_key: String,
    pub audience_id: String,
    pub from_email: String,
    pub metadata_path: String,
    pub posted_path: String,
    pub dry_run: bool,
    pub resend_api_base: String,
    pub image_base_url: String,
    pub artifact_dir: String,
    pub max_attempts: u32,
    pub retry_delay_secs: u64,
    pub image_timeout_secs: u64,
    pub subject: String,
}

impl std::fmt::Debug for BroadcastConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastConfig")
            .field("resend_api_key", &"<redacted>")
            .field("audience_id", &self.audience_id)
            .field("from_email", &self.from_email)
            .field("metadata_path", &self.metadata_path)
            .field("posted_path", &self.posted_path)
            .field("dry_run", &self.dry_run)
            .field("resend_api_base", &self.resend_api_base)
            .field("image_base_url", &self.image_base_url)
            .field("artifact_dir", &self.artifact_dir)
            .field("max_attempts", &self.max_attempts)
            .field("retry_delay_secs", &self.retry_delay_secs)
            .field("image_timeout_secs", &self.image_timeout_secs)
            .field("subject", &self.subject)
            .finish()
    }
}

impl BroadcastConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            backoff: Duration::from_secs(self.retry_delay_secs),
        }
    }

    pub fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.image_timeout_secs)
    }

    pub fn template(&self) -> BroadcastTemplate {
        BroadcastTemplate {
            audience_id: self.audience_id.clone(),
            from: self.from_email.clone(),
            subject: self.subject.clone(),
        }
    }
}

impl Validate for BroadcastConfig {
    fn validate(&self) -> Result<()> {
        validate_url("resend_api_base", &self.resend_api_base)?;
        validate_url("image_base_url", &self.image_base_url)?;
        validate_email("from_email", &self.from_email)?;
        validate_path("metadata_path", &self.metadata_path)?;
        validate_path("posted_path", &self.posted_path)?;
        validate_path("artifact_dir", &self.artifact_dir)?;
        validate_range("max_attempts", self.max_attempts, 1, 20)?;
        validate_range("retry_delay_secs", self.retry_delay_secs, 0, 300)?;
        validate_range("image_timeout_secs", self.image_timeout_secs, 1, 300)?;

        if self.subject.trim().is_empty() {
            return Err(BroadcastError::InvalidConfigValueError {
                field: "subject".to_string(),
                value: self.subject.clone(),
                reason: "Subject cannot be empty".to_string(),
            });
        }

        tracing::debug!("Broadcast configuration validation passed");
        Ok(())
    }
}

/// Settings for the metadata downloader.
#[derive(Clone)]
pub struct DownloadConfig {
    pub token: String,
    pub api_base: String,
    pub output_dir: String,
    pub per_page: u32,
    pub page_delay_ms: u64,
    pub collections: Vec<String>,
}

impl std::fmt::Debug for DownloadConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadConfig")
            .field("token", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("output_dir", &self.output_dir)
            .field("per_page", &self.per_page)
            .field("page_delay_ms", &self.page_delay_ms)
            .field("collections", &self.collections.len())
            .finish()
    }
}

impl DownloadConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

impl Validate for DownloadConfig {
    fn validate(&self) -> Result<()> {
        validate_url("api_base", &self.api_base)?;
        validate_path("output_dir", &self.output_dir)?;
        validate_range("per_page", self.per_page, 1, 500)?;

        if self.collections.is_empty() {
            return Err(BroadcastError::InvalidConfigValueError {
                field: "collections".to_string(),
                value: String::new(),
                reason: "At least one collection id is required".to_string(),
            });
        }

        // Collection ids end up in file names.
        for collection in &self.collections {
            let valid = !collection.is_empty()
                && collection
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-');
            if !valid {
                return Err(BroadcastError::InvalidConfigValueError {
                    field: "collections".to_string(),
                    value: collection.clone(),
                    reason: "Collection ids may only contain letters, digits and hyphens"
                        .to_string(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::resend::DEFAULT_RESEND_API_BASE;
    use crate::core::verifier::DEFAULT_IMAGE_BASE_URL;

    fn broadcast_config() -> BroadcastConfig {
        BroadcastConfig {
            resend_api_key: "re_secret".to_string(),
            audience_id: "aud".to_string(),
            from_email: "cards@example.com".to_string(),
            metadata_path: "metadata.json".to_string(),
            posted_path: "posted_cards.json".to_string(),
            dry_run: false,
            resend_api_base: DEFAULT_RESEND_API_BASE.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            artifact_dir: ".".to_string(),
            max_attempts: 5,
            retry_delay_secs: 2,
            image_timeout_secs: 30,
            subject: "today's cigarette card".to_string(),
        }
    }

    #[test]
    fn test_valid_broadcast_config() {
        let config = broadcast_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert_eq!(config.image_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_debug_hides_api_key() {
        assert!(!format!("{:?}", broadcast_config()).contains("re_secret"));
    }

    #[test]
    fn test_invalid_broadcast_values() {
        let mut config = broadcast_config();
        config.max_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = broadcast_config();
        config.image_base_url = "images.nypl.org".to_string();
        assert!(config.validate().is_err());

        let mut config = broadcast_config();
        config.from_email = "nobody".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_download_config_rejects_path_like_collection() {
        let config = DownloadConfig {
            token: "tok".to_string(),
            api_base: "https://api.repo.nypl.org/api/v2".to_string(),
            output_dir: ".".to_string(),
            per_page: 50,
            page_delay_ms: 1000,
            collections: vec!["../etc".to_string()],
        };
        assert!(config.validate().is_err());

        let config = DownloadConfig {
            collections: collections::default_collections(),
            ..config
        };
        assert!(config.validate().is_ok());
    }
}
