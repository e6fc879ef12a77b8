use crate::adapters::archive::DEFAULT_ARCHIVE_API_BASE;
use crate::adapters::resend::DEFAULT_RESEND_API_BASE;
use crate::config::collections::{default_collections, CollectionsFile};
use crate::config::{BroadcastConfig, DownloadConfig};
use crate::core::broadcast::DEFAULT_SUBJECT;
use crate::core::verifier::DEFAULT_IMAGE_BASE_URL;
use crate::utils::error::Result;
use crate::utils::validation::{require_fields, Validate};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "daily-card")]
#[command(about = "Send today's cigarette card to the mailing list")]
pub struct CliConfig {
    #[arg(long, env = "RESEND_API_KEY", hide_env_values = true)]
    pub resend_api_key: Option<String>,

    #[arg(long, env = "RESEND_AUDIENCE_ID")]
    pub audience_id: Option<String>,

    #[arg(long, env = "FROM_EMAIL")]
    pub from_email: Option<String>,

    #[arg(long, env = "METADATA_PATH", default_value = "metadata.json")]
    pub metadata_path: String,

    #[arg(long, env = "POSTED_PATH", default_value = "posted_cards.json")]
    pub posted_path: String,

    /// Send the broadcast without recording the card as posted.
    /// `DRY_RUN` accepts `1`/`yes`/`true`; `0`/`no`/`false`/empty leave it off.
    #[arg(long, env = "DRY_RUN", value_parser = clap::builder::FalseyValueParser::new())]
    pub dry_run: bool,

    /// `MODE=test` is treated like --dry-run
    #[arg(long, env = "MODE")]
    pub mode: Option<String>,

    #[arg(long, env = "RESEND_API_BASE", default_value = DEFAULT_RESEND_API_BASE)]
    pub resend_api_base: String,

    #[arg(long, env = "IMAGE_BASE_URL", default_value = DEFAULT_IMAGE_BASE_URL)]
    pub image_base_url: String,

    /// Where the verified image is briefly written
    #[arg(long, env = "ARTIFACT_DIR", default_value = ".")]
    pub artifact_dir: String,

    #[arg(long, env = "MAX_ATTEMPTS", default_value = "5")]
    pub max_attempts: u32,

    #[arg(long, env = "RETRY_DELAY_SECS", default_value = "2")]
    pub retry_delay_secs: u64,

    #[arg(long, env = "IMAGE_TIMEOUT_SECS", default_value = "30")]
    pub image_timeout_secs: u64,

    #[arg(long, env = "BROADCAST_SUBJECT", default_value = DEFAULT_SUBJECT)]
    pub subject: String,

    /// `text` or `json`
    #[arg(long, env = "LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
            || self
                .mode
                .as_deref()
                .map(|mode| mode.eq_ignore_ascii_case("test"))
                .unwrap_or(false)
    }

    /// Fails with every missing required variable before anything runs.
    pub fn into_config(self) -> Result<BroadcastConfig> {
        require_fields(&[
            ("RESEND_API_KEY", self.resend_api_key.as_deref()),
            ("RESEND_AUDIENCE_ID", self.audience_id.as_deref()),
            ("FROM_EMAIL", self.from_email.as_deref()),
        ])?;

        let dry_run = self.is_dry_run();
        let config = BroadcastConfig {
            resend_api_key: self.resend_api_key.unwrap_or_default(),
            audience_id: self.audience_id.unwrap_or_default(),
            from_email: self.from_email.unwrap_or_default(),
            metadata_path: self.metadata_path,
            posted_path: self.posted_path,
            dry_run,
            resend_api_base: self.resend_api_base,
            image_base_url: self.image_base_url,
            artifact_dir: self.artifact_dir,
            max_attempts: self.max_attempts,
            retry_delay_secs: self.retry_delay_secs,
            image_timeout_secs: self.image_timeout_secs,
            subject: self.subject,
        };
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "download-metadata")]
#[command(about = "Download cigarette card metadata from the NYPL Digital Collections API")]
pub struct DownloadArgs {
    #[arg(long, env = "NYPL_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[arg(long, env = "NYPL_API_BASE", default_value = DEFAULT_ARCHIVE_API_BASE)]
    pub api_base: String,

    /// Directory for metadata_<collection>.json and the combined file
    #[arg(short, long, default_value = ".")]
    pub output_dir: String,

    #[arg(long)]
    pub per_page: Option<u32>,

    /// Pause between page requests
    #[arg(long)]
    pub page_delay_ms: Option<u64>,

    /// TOML file with `collections = [...]`
    #[arg(long)]
    pub collections_file: Option<String>,

    /// Collection id to download; repeat to download several
    #[arg(long = "collection")]
    pub collections: Vec<String>,

    #[arg(long, env = "LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl DownloadArgs {
    /// Flags win over the collections file, which wins over built-in defaults.
    pub fn into_config(self) -> Result<DownloadConfig> {
        require_fields(&[("NYPL_TOKEN", self.token.as_deref())])?;

        let file = match &self.collections_file {
            Some(path) => CollectionsFile::from_file(path)?,
            None => CollectionsFile::default(),
        };

        let collections = if !self.collections.is_empty() {
            self.collections
        } else if !file.collections.is_empty() {
            file.collections
        } else {
            default_collections()
        };

        let config = DownloadConfig {
            token: self.token.unwrap_or_default(),
            api_base: self.api_base,
            output_dir: self.output_dir,
            per_page: self.per_page.or(file.per_page).unwrap_or(50),
            page_delay_ms: self.page_delay_ms.or(file.page_delay_ms).unwrap_or(1000),
            collections,
        };
        config.validate()?;
        Ok(config)
    }
}
