use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cinemaspot_core::email::{EmailMessage, EmailSender};
use cinemaspot_core::{CoreError, CoreResult};
use cinemaspot_shared::pii::redact_email;
use serde::Serialize;
use tracing::{info, warn};

use crate::app_config::{EmailConfig, EmailProvider};

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

/// Writes outgoing mail to the log instead of delivering it.
#[derive(Clone, Debug, Default)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: &EmailMessage) -> CoreResult<()> {
        info!(
            to = %redact_email(&message.to),
            subject = %message.subject,
            "Email not delivered (log provider)"
        );
        tracing::debug!(html = %message.html, "Email body");
        Ok(())
    }
}

/// Delivers mail through the Resend HTTP API.
pub struct ResendEmailSender {
    client: reqwest::Client,
    api_key: String,
    from: String,
    endpoint: String,
}

#[derive(Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

impl ResendEmailSender {
    pub fn new(api_key: String, from: String) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, api_key, from, endpoint: RESEND_ENDPOINT.to_string() })
    }
}

#[async_trait]
impl EmailSender for ResendEmailSender {
    async fn send(&self, message: &EmailMessage) -> CoreResult<()> {
        let body = ResendRequest {
            from: &self.from,
            to: [&message.to],
            subject: &message.subject,
            html: &message.html,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!("Email delivery request failed: {}", e);
                CoreError::Internal("email delivery failed".into())
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(%status, detail = %detail, "Email provider rejected message");
            return Err(CoreError::Internal(format!("email provider returned {}", status)));
        }

        info!(to = %redact_email(&message.to), subject = %message.subject, "Email sent");
        Ok(())
    }
}

/// Builds the sender selected by `email.provider`.
pub fn email_sender(config: &EmailConfig) -> anyhow::Result<Arc<dyn EmailSender>> {
    match config.provider {
        EmailProvider::Log => Ok(Arc::new(LogEmailSender)),
        EmailProvider::Resend => {
            let api_key = config
                .api_key
                .clone()
                .ok_or_else(|| anyhow::anyhow!("email.api_key is required for the resend provider"))?;
            Ok(Arc::new(ResendEmailSender::new(api_key, config.from.clone())?))
        }
    }
}
