use crate::utils::error::{BroadcastError, Result};
use reqwest::Client;
use serde_json::Value;

pub const DEFAULT_ARCHIVE_API_BASE: &str = "https://api.repo.nypl.org/api/v2";

/// One page of items from the digital collections API.
#[derive(Debug, Clone)]
pub struct ArchivePage {
    pub items: Vec<Value>,
    pub total_pages: u32,
}

#[derive(Clone)]
pub struct ArchiveClient {
    http: Client,
    token: String,
    base_url: String,
}

impl std::fmt::Debug for ArchiveClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl ArchiveClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            token: token.into(),
            base_url: DEFAULT_ARCHIVE_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub async fn fetch_page(&self, collection: &str, page: u32, per_page: u32) -> Result<ArchivePage> {
        let url = format!("{}/items/{}", self.base_url, collection);
        tracing::debug!("GET {} page={} per_page={}", url, page, per_page);

        let response = self
            .http
            .get(&url)
            .header("Authorization", format!("Token token=\"{}\"", self.token))
            .query(&[("page", page), ("per_page", per_page)])
            .send()
            .await
            .map_err(|e| BroadcastError::network(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BroadcastError::network(&url, format!("HTTP {}", status)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| BroadcastError::network(&url, e))?;

        parse_page(&body)
    }
}

/// Extracts the capture list and page count from an items response.
pub fn parse_page(body: &Value) -> Result<ArchivePage> {
    let api = body
        .get("nyplAPI")
        .ok_or_else(|| BroadcastError::catalog("Unexpected response structure: missing nyplAPI"))?;

    let capture = api
        .get("response")
        .and_then(|response| response.get("capture"))
        .ok_or_else(|| {
            BroadcastError::catalog("Unexpected response structure: missing response.capture")
        })?;

    let items = match capture {
        Value::Array(items) => items.clone(),
        Value::Null => Vec::new(),
        // A page holding a single item comes back as a bare object.
        single => vec![single.clone()],
    };

    let total_pages = api
        .get("request")
        .and_then(|request| request.get("totalPages"))
        .and_then(|total| match total {
            Value::String(s) => s.trim().parse::<u32>().ok(),
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            _ => None,
        })
        .unwrap_or(1);

    Ok(ArchivePage { items, total_pages })
}
