use serde::{Deserialize, Serialize};
use std::path::Path;
use tempfile::TempPath;

/// One archived card as stored in the metadata files.
///
/// The archive names its fields `uuid` and `imageID`; both spellings are
/// accepted. Missing fields deserialize as empty strings and make the record
/// ineligible rather than failing the whole catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    #[serde(default, alias = "uuid")]
    pub id: String,
    #[serde(default, rename = "imageRef", alias = "imageID")]
    pub image_ref: String,
    #[serde(default)]
    pub title: String,
}

impl CatalogRecord {
    pub fn new(id: &str, image_ref: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            image_ref: image_ref.to_string(),
            title: title.to_string(),
        }
    }

    pub fn is_eligible(&self) -> bool {
        !self.id.trim().is_empty()
            && !self.image_ref.trim().is_empty()
            && !self.title.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

/// Request body for defining a broadcast. Lives for one dispatch only.
#[derive(Debug, Clone, Serialize)]
pub struct BroadcastDraft {
    pub audience_id: String,
    pub from: String,
    pub subject: String,
    pub html: String,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SendConfirmation {
    /// The send response echoed the defined broadcast id.
    Confirmed,
    /// The provider accepted the send but did not echo the id back.
    Unconfirmed { response_id: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReceipt {
    pub broadcast_id: String,
    pub confirmation: SendConfirmation,
}

/// Local copy of a verified image. The file is deleted by `cleanup` or, on
/// any other exit path, when the value is dropped.
#[derive(Debug)]
pub struct TransientArtifact {
    path: TempPath,
}

impl TransientArtifact {
    pub fn new(path: TempPath) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn cleanup(self) {
        let shown = self.path.display().to_string();
        match self.path.close() {
            Ok(()) => tracing::debug!("Cleaned up temporary file: {}", shown),
            Err(e) => tracing::warn!("Could not remove temp file {}: {}", shown, e),
        }
    }
}

#[derive(Debug)]
pub struct VerifiedImage {
    pub artifact: TransientArtifact,
    pub url: String,
    pub content_type: String,
    pub bytes: usize,
}

/// Outcome of a run that reached the committing phase.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub card_id: String,
    pub title: String,
    pub image_url: String,
    pub broadcast_id: String,
    pub confirmation: SendConfirmation,
    pub attempts: u32,
    pub committed: bool,
}
