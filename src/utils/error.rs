use thiserror::Error;

#[derive(Error, Debug)]
pub enum BroadcastError {
    #[error("No valid, unposted cards with an image remaining")]
    NoEligibleRecords,

    #[error("Network error calling {url}: {reason}")]
    NetworkError { url: String, reason: String },

    #[error("Response from {url} is not an image (Content-Type: {content_type})")]
    NotAnImage { url: String, content_type: String },

    #[error("Failed to create broadcast: {message}")]
    DefineFailed { message: String },

    #[error("Broadcast {broadcast_id} was created but sending failed: {reason}")]
    SendFailed {
        broadcast_id: String,
        reason: String,
    },

    #[error("Missing configuration: {}", fields.join(", "))]
    MissingConfiguration { fields: Vec<String> },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Catalog error: {message}")]
    CatalogError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("All {attempts} attempts failed, last error: {last_error}")]
    RetriesExhausted {
        attempts: u32,
        last_error: Box<BroadcastError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Data,
    Provider,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl BroadcastError {
    pub fn network(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::NetworkError {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn catalog(message: impl Into<String>) -> Self {
        Self::CatalogError {
            message: message.into(),
        }
    }

    /// Whether a fresh attempt (new card, new requests) could succeed where
    /// this one failed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError { .. }
                | Self::NotAnImage { .. }
                | Self::DefineFailed { .. }
                | Self::SendFailed { .. }
                | Self::IoError(_)
        )
    }

    /// Define succeeded but delivery did not.
    pub fn is_partial_success(&self) -> bool {
        matches!(self, Self::SendFailed { .. })
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingConfiguration { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::TomlError(_) => ErrorCategory::Configuration,
            Self::NetworkError { .. } | Self::NotAnImage { .. } => ErrorCategory::Network,
            Self::NoEligibleRecords | Self::CatalogError { .. } | Self::SerializationError(_) => {
                ErrorCategory::Data
            }
            Self::DefineFailed { .. } | Self::SendFailed { .. } => ErrorCategory::Provider,
            Self::IoError(_) => ErrorCategory::Storage,
            Self::RetriesExhausted { last_error, .. } => last_error.category(),
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NetworkError { .. } | Self::NotAnImage { .. } => ErrorSeverity::Medium,
            Self::DefineFailed { .. } | Self::SendFailed { .. } => ErrorSeverity::Medium,
            Self::NoEligibleRecords | Self::CatalogError { .. } | Self::SerializationError(_) => {
                ErrorSeverity::High
            }
            Self::MissingConfiguration { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::TomlError(_) => ErrorSeverity::High,
            Self::RetriesExhausted { .. } => ErrorSeverity::High,
            Self::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::NoEligibleRecords => {
                "Every card in the catalog has been posted; download more metadata or reset the posted list".to_string()
            }
            Self::NetworkError { url, .. } => {
                format!("Check network connectivity and that {} is reachable", url)
            }
            Self::NotAnImage { .. } => {
                "The image service returned something else; the next attempt picks another card".to_string()
            }
            Self::DefineFailed { .. } => {
                "Check RESEND_API_KEY, RESEND_AUDIENCE_ID and FROM_EMAIL against the provider dashboard".to_string()
            }
            Self::SendFailed { broadcast_id, .. } => format!(
                "Broadcast {} exists as a draft; send it from the provider dashboard or delete it",
                broadcast_id
            ),
            Self::MissingConfiguration { fields } => {
                format!("Set {} in the environment or a .env file", fields.join(", "))
            }
            Self::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of {}", field)
            }
            Self::CatalogError { .. } => {
                "Re-run download-metadata or point METADATA_PATH at a valid metadata file".to_string()
            }
            Self::IoError(_) => "Check file permissions and available disk space".to_string(),
            Self::SerializationError(_) => {
                "The JSON file is malformed; fix or remove it".to_string()
            }
            Self::TomlError(_) => "Check the TOML file syntax".to_string(),
            Self::RetriesExhausted { last_error, .. } => last_error.recovery_suggestion(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::NoEligibleRecords => "No cards left to send".to_string(),
            Self::NetworkError { .. } => "Could not reach a remote service".to_string(),
            Self::NotAnImage { .. } => "The card image could not be verified".to_string(),
            Self::DefineFailed { message } => format!("The email provider rejected the broadcast: {}", message),
            Self::SendFailed { broadcast_id, .. } => format!(
                "Broadcast {} was created but not sent",
                broadcast_id
            ),
            Self::MissingConfiguration { fields } => {
                format!("Missing required settings: {}", fields.join(", "))
            }
            Self::RetriesExhausted { attempts, .. } => {
                format!("Today's card could not be sent after {} attempts", attempts)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BroadcastError>;
