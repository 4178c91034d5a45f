use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;

/// What an outgoing email is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailKind {
    Verification,
    PasswordReset,
    TwoFactorCode,
}

/// A rendered email ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub kind: EmailKind,
    pub to: String,
    pub subject: String,
    pub html: String,
}

impl Email {
    /// Email carrying the link that confirms an address.
    #[must_use]
    pub fn verification(to: &str, frontend_url: &str, token: &str) -> Self {
        let link = format!(
            "{}/auth/new-verification?token={}",
            frontend_url.trim_end_matches('/'),
            urlencoding::encode(token)
        );
        Self {
            kind: EmailKind::Verification,
            to: to.to_string(),
            subject: "Confirm your email".to_string(),
            html: format!("<p>Click <a href=\"{link}\">here</a> to confirm email.</p>"),
        }
    }

    /// Email carrying the link to choose a new password.
    #[must_use]
    pub fn password_reset(to: &str, frontend_url: &str, token: &str) -> Self {
        let link = format!(
            "{}/auth/new-password?token={}",
            frontend_url.trim_end_matches('/'),
            urlencoding::encode(token)
        );
        Self {
            kind: EmailKind::PasswordReset,
            to: to.to_string(),
            subject: "Reset your password".to_string(),
            html: format!("<p>Click <a href=\"{link}\">here</a> to reset password.</p>"),
        }
    }

    /// Email carrying a two-factor login code.
    #[must_use]
    pub fn two_factor_code(to: &str, code: &str) -> Self {
        Self {
            kind: EmailKind::TwoFactorCode,
            to: to.to_string(),
            subject: "2FA Code".to_string(),
            html: format!("<p>Your 2FA code: {code}</p>"),
        }
    }
}

/// Outbound email delivery.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one email.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be built or the transport rejects it.
    async fn send(&self, email: Email) -> anyhow::Result<()>;
}

/// Delivers mail through an SMTP relay using STARTTLS.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_email: String,
}

impl SmtpMailer {
    /// Build a mailer from SMTP settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the relay host is invalid.
    pub fn new(config: &SmtpConfig) -> anyhow::Result<Self> {
        let credentials = Credentials::new(config.username.clone(), config.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| anyhow::anyhow!("SMTP relay error: {e}"))?
            .port(config.port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from_email: config.from_email.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: Email) -> anyhow::Result<()> {
        let message = Message::builder()
            .from(
                self.from_email
                    .parse()
                    .map_err(|e| anyhow::anyhow!("Invalid from address: {e}"))?,
            )
            .to(email
                .to
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid recipient address: {e}"))?)
            .subject(email.subject)
            .header(ContentType::TEXT_HTML)
            .body(email.html)
            .map_err(|e| anyhow::anyhow!("Failed to build email message: {e}"))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to send email: {e}"))?;

        tracing::debug!(to = %email.to, kind = ?email.kind, "Email sent");
        Ok(())
    }
}

/// Writes outgoing mail to the log instead of sending it. Used when no SMTP relay is configured.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> anyhow::Result<()> {
        // The body carries live tokens and codes.
        tracing::info!(
            to = %email.to,
            kind = ?email.kind,
            subject = %email.subject,
            "Email delivery disabled, message not sent"
        );
        tracing::debug!(to = %email.to, body = %email.html, "Undelivered email body");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn verification_link_points_at_frontend() {
        let email = Email::verification("a@example.com", "http://localhost:3001/", "abc-123");
        assert_eq!(email.kind, EmailKind::Verification);
        assert!(
            email
                .html
                .contains("http://localhost:3001/auth/new-verification?token=abc-123")
        );
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn log_mailer_keeps_secrets_out_of_info_logs() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        LogMailer
            .send(Email::two_factor_code("a@example.com", "482913"))
            .await
            .unwrap();

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("a@example.com"), "{output}");
        assert!(!output.contains("482913"), "{output}");
    }

    #[test]
    fn two_factor_email_contains_code() {
        let email = Email::two_factor_code("a@example.com", "123456");
        assert_eq!(email.to, "a@example.com");
        assert!(email.html.contains("123456"));
    }
}
