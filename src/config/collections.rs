use crate::utils::error::{BroadcastError, Result};
use serde::Deserialize;
use std::path::Path;

/// Cigarette card collections in the NYPL Digital Collections, starting with
/// "ABC of Sports" and "Aeroplanes" followed by their sibling sets.
pub const DEFAULT_COLLECTIONS: &[&str] = &[
    "b686cfd0-c52b-012f-c9e6-58d385a7bc34",
    "b2d37b40-c52d-012f-f8ec-58d385a7bc34",
    "1615ed60-c52e-012f-6579-58d385a7bc34",
    "53249090-c52e-012f-65dd-58d385a7bc34",
    "66052980-c52e-012f-6d83-58d385a7bc34",
    "70423dd0-c52e-012f-7733-58d385a7bc34",
    "161d80e0-c52f-012f-c7a8-58d385a7bc34",
    "4b853b70-c52f-012f-8f45-58d385a7bc34",
    "6a3d3310-c52f-012f-5440-58d385a7bc34",
    "949f5dd0-c52f-012f-ddb5-58d385a7bc34",
    "b893ce70-c52f-012f-e3f5-58d385a7bc34",
    "d3194c20-c52f-012f-afdd-58d385a7bc34",
    "1b587dd0-c530-012f-90d8-58d385a7bc34",
    "e79eb2f0-c52f-012f-457c-58d385a7bc34",
    "dc5124e0-c530-012f-32bb-58d385a7bc34",
    "462cc620-c531-012f-3e1e-58d385a7bc34",
    "5ac13e00-c531-012f-bfa4-58d385a7bc34",
    "dd0a2fe0-c531-012f-cfa6-58d385a7bc34",
    "392972e0-c532-012f-5aa1-58d385a7bc34",
    "97b79410-c536-012f-b383-58d385a7bc34",
    "d2e1ded0-c538-012f-c313-58d385a7bc34",
    "342d4e10-c53a-012f-fd64-58d385a7bc34",
    "58ed9c40-c53b-012f-6ce6-58d385a7bc34",
    "e8dbd7b0-c53d-012f-33ad-58d385a7bc34",
    "8ee1f5e0-c540-012f-2b4a-58d385a7bc34",
    "f810dc20-c540-012f-9860-58d385a7bc34",
    "59ea7730-c541-012f-6b46-58d385a7bc34",
    "c78c1e00-c541-012f-136c-58d385a7bc34",
    "c91d85e0-c542-012f-d78f-58d385a7bc34",
    "7e984420-c543-012f-faab-58d385a7bc34",
    "8e6c5710-c546-012f-a0d9-58d385a7bc34",
    "02335b50-c54b-012f-023e-58d385a7bc34",
    "bbd87f50-c54f-012f-1287-58d385a7bc34",
    "cdde0960-c54f-012f-7496-58d385a7bc34",
    "e0b102e0-c54f-012f-b5c7-58d385a7bc34",
    "f2c8f600-c54f-012f-21c0-58d385a7bc34",
    "a77d95e0-c550-012f-22a4-58d385a7bc34",
    "55b6ffe0-c552-012f-3cf9-58d385a7bc34",
    "0e7fc620-c566-012f-9810-58d385a7bc34",
    "14a20990-c566-012f-4d9d-58d385a7bc34",
    "6f502ef0-c569-012f-b7a6-58d385a7bc34",
    "c3b91e70-c569-012f-5457-58d385a7bc34",
    "57089220-c56e-012f-5ac6-58d385a7bc34",
    "0f260db0-c56f-012f-e9ba-58d385a7bc34",
    "553c9d60-c56f-012f-bf7f-58d385a7bc34",
    "13eabc60-c573-012f-f721-58d385a7bc34",
    "79c06ed0-c5a0-012f-c9d7-58d385a7bc34",
];

pub fn default_collections() -> Vec<String> {
    DEFAULT_COLLECTIONS.iter().map(|c| c.to_string()).collect()
}

/// Optional TOML file overriding the downloader's collection list:
///
/// ```toml
/// collections = ["b686cfd0-c52b-012f-c9e6-58d385a7bc34"]
/// per_page = 50
/// page_delay_ms = 1000
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectionsFile {
    #[serde(default)]
    pub collections: Vec<String>,
    pub per_page: Option<u32>,
    pub page_delay_ms: Option<u64>,
}

impl CollectionsFile {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: Self = toml::from_str(content)?;
        if file.collections.is_empty() {
            return Err(BroadcastError::InvalidConfigValueError {
                field: "collections".to_string(),
                value: String::new(),
                reason: "At least one collection id is required".to_string(),
            });
        }
        Ok(file)
    }
}
