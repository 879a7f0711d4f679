//! Email service for OSAS account notices.
//!
//! Uses `lettre` for SMTP transport.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor, message::header::ContentType,
    transport::smtp::authentication::Credentials,
};
use thiserror::Error;

use crate::config::EmailConfig;

/// Email service errors.
#[derive(Debug, Error)]
pub enum EmailError {
    /// Failed to build email message.
    #[error("Failed to build email: {0}")]
    BuildError(String),
    /// Failed to send email.
    #[error("Failed to send email: {0}")]
    SendError(String),
    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Email service for sending transactional emails.
#[derive(Debug, Clone)]
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    /// Creates a new email service.
    #[must_use]
    pub const fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn create_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
        let creds = Credentials::new(
            self.config.smtp_username.clone(),
            self.config.smtp_password.clone(),
        );

        Ok(
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)
                .map_err(|e| EmailError::SendError(e.to_string()))?
                .port(self.config.smtp_port)
                .credentials(creds)
                .build(),
        )
    }

    /// Builds the link an admin follows to reset their password.
    #[must_use]
    pub fn password_reset_link(&self, token: &str) -> String {
        format!(
            "{}/osas/reset-password?token={token}",
            self.config.frontend_url.trim_end_matches('/')
        )
    }

    /// Sends a password reset email to an OSAS admin.
    ///
    /// # Errors
    ///
    /// Returns an error if the email cannot be sent.
    pub async fn send_password_reset(
        &self,
        to_email: &str,
        username: &str,
        token: &str,
    ) -> Result<(), EmailError> {
        let link = self.password_reset_link(token);
        let body = format!(
            r"Hi {username},

A password reset was requested for your OSAS account. Use the link below to choose a new password:

{link}

The link expires in one hour. If you did not request this, you can ignore this email."
        );

        self.send_email(to_email, "OSAS password reset", &body)
            .await
    }

    /// Sends a plain-text email.
    ///
    /// # Errors
    ///
    /// Returns an error if the email cannot be sent.
    pub async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), EmailError> {
        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);

        let email = Message::builder()
            .from(
                from.parse()
                    .map_err(|e| EmailError::InvalidAddress(format!("{e}")))?,
            )
            .to(to_email
                .parse()
                .map_err(|e| EmailError::InvalidAddress(format!("{e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| EmailError::BuildError(e.to_string()))?;

        let transport = self.create_transport()?;
        transport
            .send(email)
            .await
            .map_err(|e| EmailError::SendError(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_config_default() {
        let config = EmailConfig::default();
        assert_eq!(config.smtp_host, "localhost");
        assert_eq!(config.smtp_port, 1025);
    }

    #[test]
    fn test_password_reset_link() {
        let service = EmailService::new(EmailConfig {
            frontend_url: "https://lspu.example/".to_string(),
            ..EmailConfig::default()
        });
        assert_eq!(
            service.password_reset_link("abc"),
            "https://lspu.example/osas/reset-password?token=abc"
        );
    }

    #[tokio::test]
    async fn test_invalid_recipient_rejected() {
        let service = EmailService::new(EmailConfig::default());
        let err = service
            .send_email("not an address", "subject", "body")
            .await
            .unwrap_err();
        assert!(matches!(err, EmailError::InvalidAddress(_)));
    }
}
