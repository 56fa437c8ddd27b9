//! Approval email delivery via SMTP
//!
//! Wraps the `lettre` async SMTP transport to send the plain-text approval
//! request email. The mailer also owns the public base URL used to build
//! the approval link.

use thiserror::Error;
use tracing::info;

/// Error type for email delivery failures
#[derive(Debug, Error)]
pub enum MailError {
    /// SMTP transport-level failure (authentication, connection, etc.)
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed
    #[error("email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The message could not be assembled
    #[error("email build error: {0}")]
    Build(String),
}

/// Default SMTP port (STARTTLS)
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set
const DEFAULT_FROM_ADDRESS: &str = "noreply@fieldtrack.local";

/// Default public base URL for approval links
const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Configuration for the approval mailer
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// SMTP server hostname
    pub smtp_host: String,
    /// SMTP server port (defaults to 587)
    pub smtp_port: u16,
    /// RFC 5322 "From" address
    pub from_address: String,
    /// Optional SMTP username
    pub smtp_user: Option<String>,
    /// Optional SMTP password
    pub smtp_password: Option<String>,
    /// Public base URL the approval link is built on
    pub base_url: String,
}

impl MailerConfig {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `SMTP_HOST`: SMTP server hostname (required)
    /// - `SMTP_PORT`: SMTP server port (default: 587)
    /// - `SMTP_FROM`: sender address (default: noreply@fieldtrack.local)
    /// - `SMTP_USER` / `SMTP_PASSWORD`: optional credentials
    /// - `APPROVAL_BASE_URL`: base URL for links (default: http://localhost:3000)
    pub fn from_env() -> anyhow::Result<Self> {
        let smtp_host = std::env::var("SMTP_HOST")
            .map_err(|_| anyhow::anyhow!("SMTP_HOST environment variable not set"))?;

        Ok(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
            base_url: std::env::var("APPROVAL_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        })
    }
}

/// Sends approval request emails to location contacts
#[derive(Clone)]
pub struct Mailer {
    config: MailerConfig,
}

impl Mailer {
    /// Create a new mailer with the given configuration
    pub fn new(config: MailerConfig) -> Self {
        Self { config }
    }

    /// Build the client-facing approval URL for a token
    pub fn approval_url(&self, token: &str) -> String {
        format!("{}/approve-timesheet?token={}", self.config.base_url, token)
    }

    /// Send the approval request email for a freshly issued token
    pub async fn send_approval_request(
        &self,
        to_email: &str,
        approval_url: &str,
        expires_in_hours: i64,
    ) -> Result<(), MailError> {
        use lettre::{
            AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
            message::header::ContentType, transport::smtp::authentication::Credentials,
        };

        let body = format!(
            "A timesheet is awaiting your approval. Please review and approve or reject it \
             here: {approval_url}\nThis link will expire in {expires_in_hours} hours."
        );

        let email = Message::builder()
            .from(self.config.from_address.parse()?)
            .to(to_email.parse()?)
            .subject("Timesheet Approval Request")
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| MailError::Build(e.to_string()))?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port);

        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let mailer = transport_builder.build();
        mailer.send(email).await?;

        info!(to = to_email, "Approval request email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn from_env_fails_without_smtp_host() {
        unsafe {
            std::env::remove_var("SMTP_HOST");
        }
        assert!(MailerConfig::from_env().is_err());
    }

    #[test]
    #[serial]
    fn from_env_applies_defaults() {
        unsafe {
            std::env::set_var("SMTP_HOST", "smtp.example.com");
            std::env::remove_var("SMTP_PORT");
            std::env::remove_var("SMTP_FROM");
            std::env::remove_var("APPROVAL_BASE_URL");
        }

        let config = MailerConfig::from_env().unwrap();
        assert_eq!(config.smtp_host, "smtp.example.com");
        assert_eq!(config.smtp_port, DEFAULT_SMTP_PORT);
        assert_eq!(config.from_address, DEFAULT_FROM_ADDRESS);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);

        unsafe {
            std::env::remove_var("SMTP_HOST");
        }
    }

    #[test]
    #[serial]
    fn approval_url_embeds_the_token() {
        unsafe {
            std::env::set_var("SMTP_HOST", "smtp.example.com");
            std::env::set_var("APPROVAL_BASE_URL", "https://timesheets.example.com");
        }

        let mailer = Mailer::new(MailerConfig::from_env().unwrap());
        assert_eq!(
            mailer.approval_url("abc123"),
            "https://timesheets.example.com/approve-timesheet?token=abc123"
        );

        unsafe {
            std::env::remove_var("SMTP_HOST");
            std::env::remove_var("APPROVAL_BASE_URL");
        }
    }

    #[test]
    fn mail_error_display_build() {
        let err = MailError::Build("missing body".to_string());
        assert_eq!(err.to_string(), "email build error: missing body");
    }

    #[test]
    fn mail_error_display_address() {
        let addr_err: Result<lettre::Address, _> = "not-an-email".parse();
        let err = MailError::Address(addr_err.unwrap_err());
        assert!(err.to_string().contains("email address parse error"));
    }
}
