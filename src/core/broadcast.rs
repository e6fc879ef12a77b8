use crate::adapters::resend::ResendClient;
use crate::domain::model::{BroadcastDraft, DispatchReceipt, SendConfirmation, Tag};
use crate::domain::ports::Broadcaster;
use crate::utils::error::{BroadcastError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

pub const DEFAULT_SUBJECT: &str = "today's cigarette card";
pub const MAX_TAG_LENGTH: usize = 49;

static INVALID_TAG_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_-]").expect("valid tag pattern"));
static UNDERSCORE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_+").expect("valid underscore pattern"));

/// Makes free text usable as a provider tag value: ASCII letters, digits,
/// `_` and `-` only, no repeated underscores, at most 49 characters.
pub fn sanitize_tag(value: &str) -> String {
    let replaced = INVALID_TAG_CHARS.replace_all(value, "_");
    let collapsed = UNDERSCORE_RUNS.replace_all(&replaced, "_");
    let truncated: String = collapsed.chars().take(MAX_TAG_LENGTH).collect();

    if truncated.is_empty() {
        "untitled".to_string()
    } else {
        truncated
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn render_html(title: &str, image_url: &str, date: NaiveDate) -> String {
    let title = escape_html(title);
    let image_url = escape_html(image_url);
    let date_stamp = date.format("%A, %B %d, %Y");

    format!(
        r#"<html>
<head>
    <title>A little card to brighten your day</title>
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px; }}
        .card-container {{ text-align: center; margin: 30px 0; }}
        img {{ max-width: 100%; height: auto; border: 1px solid #ddd; }}
        h1 {{ color: #444; }}
        .footer {{ font-size: 14px; margin-top: 40px; color: #777; text-align: center; }}
        .date {{ font-size: 14px; color: #888; margin-bottom: 30px; }}
    </style>
</head>
<body>
    <h1>A little card to brighten your day</h1>
    <div class="date">{date_stamp}</div>
    <p>Hello!</p>
    <p>I hope this card brings a little joy.</p>
    <div class="card-container">
        <img src="{image_url}" alt="{title}">
        <p><em>{title}</em></p>
    </div>
    <p>This historical cigarette card is from the NYPL Digital Collections.</p>
    <div class="footer">
        <p>Get a new card daily at cigarettecard.club!</p>
        <p><a href="{{{{RESEND_UNSUBSCRIBE_URL}}}}">Unsubscribe</a></p>
        <p>&copy; cigarettecard.club</p>
    </div>
</body>
</html>
"#
    )
}

/// Sender details shared by every broadcast of a run.
#[derive(Debug, Clone)]
pub struct BroadcastTemplate {
    pub audience_id: String,
    pub from: String,
    pub subject: String,
}

impl BroadcastTemplate {
    pub fn compose_draft(&self, title: &str, image_url: &str, date: NaiveDate) -> BroadcastDraft {
        BroadcastDraft {
            audience_id: self.audience_id.clone(),
            from: self.from.clone(),
            subject: self.subject.clone(),
            html: render_html(title, image_url, date),
            tags: vec![
                Tag {
                    name: "content_type".to_string(),
                    value: "cigarette_card".to_string(),
                },
                Tag {
                    name: "card_title".to_string(),
                    value: sanitize_tag(title),
                },
            ],
        }
    }
}

/// Defines a broadcast and sends it straight away.
#[derive(Debug, Clone)]
pub struct ResendBroadcaster {
    client: ResendClient,
    template: BroadcastTemplate,
}

impl ResendBroadcaster {
    pub fn new(client: ResendClient, template: BroadcastTemplate) -> Self {
        Self { client, template }
    }

    async fn define(&self, draft: &BroadcastDraft) -> Result<String> {
        tracing::info!(
            "Creating broadcast definition for audience {}",
            draft.audience_id
        );
        let reply = self.client.create_broadcast(draft).await?;

        let id = reply
            .body
            .id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        match id {
            Some(id) => {
                tracing::info!("Broadcast definition created: {}", id);
                Ok(id)
            }
            None => {
                let message = reply
                    .body
                    .error_message()
                    .unwrap_or_else(|| "No ID or error received".to_string());
                tracing::debug!("Define response ({}): {}", reply.status, reply.raw);
                Err(BroadcastError::DefineFailed { message })
            }
        }
    }

    async fn send(&self, broadcast_id: &str) -> Result<SendConfirmation> {
        tracing::info!("Sending broadcast {}", broadcast_id);
        let reply = self
            .client
            .send_broadcast(broadcast_id)
            .await
            .map_err(|e| BroadcastError::SendFailed {
                broadcast_id: broadcast_id.to_string(),
                reason: e.to_string(),
            })?;

        if !reply.status.is_success() {
            let reason = reply
                .body
                .error_message()
                .map(|message| format!("HTTP {}: {}", reply.status, message))
                .unwrap_or_else(|| format!("HTTP {}", reply.status));
            return Err(BroadcastError::SendFailed {
                broadcast_id: broadcast_id.to_string(),
                reason,
            });
        }

        match reply.body.id {
            Some(id) if id == broadcast_id => {
                tracing::info!("Broadcast {} sending initiated", id);
                Ok(SendConfirmation::Confirmed)
            }
            response_id => {
                tracing::warn!(
                    "Send for broadcast {} was accepted without confirming the id (response: {})",
                    broadcast_id,
                    reply.raw
                );
                Ok(SendConfirmation::Unconfirmed { response_id })
            }
        }
    }
}

#[async_trait]
impl Broadcaster for ResendBroadcaster {
    async fn compose_and_send(&self, title: &str, image_url: &str) -> Result<DispatchReceipt> {
        let today = chrono::Local::now().date_naive();
        let draft = self.template.compose_draft(title, image_url, today);

        let broadcast_id = self.define(&draft).await?;
        let confirmation = match self.send(&broadcast_id).await {
            Ok(confirmation) => confirmation,
            Err(e) => {
                tracing::error!(
                    "Broadcast {} created but sending failed: {}",
                    broadcast_id,
                    e
                );
                return Err(e);
            }
        };

        Ok(DispatchReceipt {
            broadcast_id,
            confirmation,
        })
    }
}
