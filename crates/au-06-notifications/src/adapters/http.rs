//! JSON email API client (Resend-compatible)

use crate::domain::EmailMessage;
use crate::error::{NotificationError, NotificationResult};
use crate::ports::Mailer;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_BASE: &str = "https://api.resend.com";

/// Provider configuration
#[derive(Clone, Debug)]
pub struct HttpMailerConfig {
    pub api_base: String,
    pub api_key: String,
    /// `From` header, e.g. `Aurelia <orders@aurelia.example>`.
    pub from: String,
    pub timeout: Duration,
}

impl Default for HttpMailerConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: String::new(),
            from: "Aurelia <orders@localhost>".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// `Mailer` over an HTTP email API.
pub struct HttpMailer {
    client: Client,
    config: HttpMailerConfig,
}

impl HttpMailer {
    pub fn new(config: HttpMailerConfig) -> NotificationResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/emails", self.config.api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: EmailMessage) -> NotificationResult<()> {
        message.validate()?;
        let body = SendRequest {
            from: &self.config.from,
            to: &message.to,
            subject: &message.subject,
            html: &message.html,
            text: &message.text,
            reply_to: message.reply_to.as_deref(),
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        debug!(status = status.as_u16(), subject = %message.subject, "[au-06] Provider response");
        if status.is_success() {
            return Ok(());
        }

        let raw = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorBody>(&raw)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or(raw);
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            Err(NotificationError::ProviderUnavailable(format!("{status}: {detail}")))
        } else {
            Err(NotificationError::Rejected {
                status: status.as_u16(),
                message: detail,
            })
        }
    }
}
