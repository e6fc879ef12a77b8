use crate::domain::model::BroadcastDraft;
use crate::utils::error::{BroadcastError, Result};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

pub const DEFAULT_RESEND_API_BASE: &str = "https://api.resend.com";

/// Body of a Resend API response. Success carries `id`; failures carry
/// `message` at the top level or an `error` object.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProviderResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl ProviderResponse {
    pub fn error_message(&self) -> Option<String> {
        let nested = self.error.as_ref().and_then(|error| match error {
            serde_json::Value::String(message) => Some(message.clone()),
            serde_json::Value::Object(map) => map
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string),
            _ => None,
        });

        nested
            .or_else(|| self.message.clone())
            .filter(|message| !message.trim().is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct ProviderReply {
    pub status: StatusCode,
    pub body: ProviderResponse,
    pub raw: String,
}

/// Explicit Resend client; the API key travels with the value instead of
/// living in process-wide state.
#[derive(Clone)]
pub struct ResendClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for ResendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResendClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl ResendClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_RESEND_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn create_broadcast(&self, draft: &BroadcastDraft) -> Result<ProviderReply> {
        let url = format!("{}/broadcasts", self.base_url);
        self.post(&url, draft).await
    }

    pub async fn send_broadcast(&self, broadcast_id: &str) -> Result<ProviderReply> {
        let url = format!("{}/broadcasts/{}/send", self.base_url, broadcast_id);
        self.post(&url, &serde_json::json!({})).await
    }

    async fn post<T: serde::Serialize + ?Sized>(&self, url: &str, body: &T) -> Result<ProviderReply> {
        tracing::debug!("POST {}", url);
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| BroadcastError::network(url, e))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|e| BroadcastError::network(url, e))?;
        tracing::debug!("Provider response status: {}", status);

        let body = serde_json::from_str::<ProviderResponse>(&raw).unwrap_or_default();
        Ok(ProviderReply { status, body, raw })
    }
}
