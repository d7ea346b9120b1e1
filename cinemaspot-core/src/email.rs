use async_trait::async_trait;

use crate::CoreResult;

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Outbound email delivery.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> CoreResult<()>;
}

pub fn validation_email(link: &str, to: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Validate your CinemaSpot account".to_string(),
        html: format!(
            r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif;">
  <h1>Welcome to CinemaSpot</h1>
  <p>Please confirm the address <strong>{to}</strong> to activate your account.</p>
  <p><a href="{link}">Validate my email</a></p>
  <p>If you did not create an account you can ignore this message.</p>
</body>
</html>"#
        ),
    }
}

pub fn password_reset_email(link: &str, to: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Reset your CinemaSpot password".to_string(),
        html: format!(
            r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif;">
  <h1>Password reset</h1>
  <p>A password reset was requested for <strong>{to}</strong>.</p>
  <p><a href="{link}">Choose a new password</a></p>
  <p>The link expires soon. If you did not ask for this you can ignore this message.</p>
</body>
</html>"#
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_embed_link_and_recipient() {
        let msg = validation_email("http://localhost:3000/api/auth/validate-email/abc", "ana@cinemaspot.io");
        assert_eq!(msg.to, "ana@cinemaspot.io");
        assert!(msg.html.contains("href=\"http://localhost:3000/api/auth/validate-email/abc\""));

        let reset = password_reset_email("http://x/reset", "ana@cinemaspot.io");
        assert!(reset.subject.contains("Reset"));
        assert!(reset.html.contains("http://x/reset"));
    }
}
