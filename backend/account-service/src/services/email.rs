/// Email service for password reset delivery
use crate::config::EmailSettings;
use crate::error::{AccountError, Result};
use crate::validators::mask_email;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lettre::message::{header, Mailbox, Message, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use std::sync::Arc;
use tracing::{info, warn};

const DEFAULT_RESET_BASE_URL: &str = "http://localhost:4200/reset-password";

/// Channel that carries a raw reset token to the account owner
#[async_trait]
pub trait ResetDelivery: Send + Sync {
    async fn deliver(&self, email: &str, token: &str, expires_at: DateTime<Utc>) -> Result<()>;
}

/// Async email transport wrapper (SMTP or no-op)
#[derive(Clone)]
pub struct EmailService {
    transport: Option<Arc<AsyncSmtpTransport<Tokio1Executor>>>,
    from: Mailbox,
    password_reset_base_url: Option<String>,
}

impl EmailService {
    /// Build email service from configuration
    ///
    /// If SMTP host is empty, operates in no-op mode (logs only).
    pub fn new(config: &EmailSettings) -> Result<Self> {
        let from = config
            .smtp_from
            .parse::<Mailbox>()
            .map_err(|e| AccountError::Internal(format!("Invalid SMTP_FROM address: {}", e)))?;

        let transport = if config.smtp_host.trim().is_empty() {
            warn!("SMTP host not configured; email service will operate in no-op mode");
            None
        } else {
            let builder = if config.use_starttls {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            } else {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            }
            .map_err(|e| {
                AccountError::Internal(format!("Failed to configure SMTP transport: {}", e))
            })?
            .port(config.smtp_port);

            let builder = if let (Some(username), Some(password)) =
                (&config.smtp_username, &config.smtp_password)
            {
                builder.credentials(Credentials::new(username.to_string(), password.to_string()))
            } else {
                builder
            };

            Some(Arc::new(builder.build()))
        };

        Ok(Self {
            transport,
            from,
            password_reset_base_url: config.password_reset_base_url.clone(),
        })
    }

    /// Check if SMTP transport is enabled
    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    fn build_password_reset_link(&self, token: &str) -> String {
        match &self.password_reset_base_url {
            Some(base) if !base.is_empty() => format!("{base}?token={token}"),
            _ => format!("{DEFAULT_RESET_BASE_URL}?token={token}"),
        }
    }

    fn build_reset_message(
        &self,
        recipient: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Message> {
        let link = self.build_password_reset_link(token);
        let expiry = expires_at.format("%Y-%m-%d %H:%M UTC");

        let text_body = format!(
            "We received a request to reset your password.\n\n\
            Open the following link to choose a new password:\n{link}\n\n\
            This link expires at {expiry} and can be used once.\n\
            If you did not request this, you can ignore this email."
        );
        let html_body = format!(
            r#"<!DOCTYPE html>
<html>
<body style="font-family: sans-serif; padding: 20px; color: #333;">
    <h2>Password Reset Request</h2>
    <p>We received a request to reset your password.</p>
    <p><a href="{link}">Choose a new password</a></p>
    <p style="color: #999; font-size: 12px;">
        This link expires at {expiry} and can be used once.<br>
        If you did not request this, you can ignore this email.
    </p>
</body>
</html>"#
        );

        let to = recipient.parse::<Mailbox>().map_err(|e| {
            AccountError::Internal(format!("Invalid recipient email address: {}", e))
        })?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject("Password Reset")
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(text_body),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(html_body),
                    ),
            )
            .map_err(|e| AccountError::Internal(format!("Failed to build email message: {}", e)))
    }
}

#[async_trait]
impl ResetDelivery for EmailService {
    async fn deliver(&self, email: &str, token: &str, expires_at: DateTime<Utc>) -> Result<()> {
        let Some(transport) = &self.transport else {
            info!(
                recipient = %mask_email(email),
                %expires_at,
                "Email service running in no-op mode; skipping password reset email"
            );
            return Ok(());
        };

        let message = self.build_reset_message(email, token, expires_at)?;
        transport
            .send(message)
            .await
            .map_err(|e| AccountError::Internal(format!("Failed to send email: {}", e)))?;

        info!(recipient = %mask_email(email), "Password reset email sent");
        Ok(())
    }
}
