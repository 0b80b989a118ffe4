use anyhow::{Context, Result};
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::Error as SmtpError;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;

use crate::config::{Config, SmtpSecurity};

/// What to do with a finished digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Print the Markdown digest verbatim to stdout; no mail transport is touched.
    Print(String),
    /// Hand the digest to the mail transport.
    Send(String),
}

/// The dispatch decision: dry-run means print-and-stop, otherwise send.
pub fn plan_dispatch(digest: String, dry_run: bool) -> Dispatch {
    if dry_run {
        Dispatch::Print(digest)
    } else {
        Dispatch::Send(digest)
    }
}

/// Synchronous (one-shot, no retry, no queue) SMTP delivery of the digest.
pub struct Mailer {
    host: String,
    port: u16,
    security: SmtpSecurity,
    credentials: Credentials,
    timeout: Duration,
}

impl Mailer {
    pub fn from_config(config: &Config) -> Self {
        Self {
            host: config.smtp_host.clone(),
            port: config.smtp_port,
            security: config.smtp_security,
            credentials: Credentials::new(config.smtp_user.clone(), config.smtp_pass.clone()),
            timeout: Duration::from_secs(config.smtp_timeout_seconds),
        }
    }

    /// Assemble the two-part (plain text + HTML) message.
    pub fn build_message(
        subject: &str,
        from: &str,
        to: &[String],
        text_body: String,
        html_body: String,
    ) -> Result<Message> {
        let mut builder = Message::builder()
            .from(
                from.parse::<Mailbox>()
                    .with_context(|| format!("Invalid from address: {}", from))?,
            )
            .subject(subject);

        for addr in to {
            builder = builder.to(addr
                .parse::<Mailbox>()
                .with_context(|| format!("Invalid recipient address: {}", addr))?);
        }

        builder
            .multipart(MultiPart::alternative_plain_html(text_body, html_body))
            .context("Failed to assemble email message")
    }

    pub async fn send(&self, message: Message) -> Result<()> {
        let transport = self.transport()?;

        match transport.send(message).await {
            Ok(_) => Ok(()),
            Err(e) if is_auth_failure(&e) => Err(anyhow::Error::new(e).context(
                "SMTP authentication failed. If using Gmail, you typically must use an App \
                 Password (requires 2-Step Verification) instead of your normal password. \
                 Also ensure SMTP_SECURITY/SMTP_PORT are correct for your provider.",
            )),
            Err(e) => Err(e).context("Failed to send digest email"),
        }
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let builder = match self.security {
            SmtpSecurity::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.host)
            }
            SmtpSecurity::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
                    .context("Failed to configure STARTTLS transport")?
            }
            SmtpSecurity::Ssl => AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host)
                .context("Failed to configure TLS transport")?,
        };

        Ok(builder
            .port(self.port)
            .credentials(self.credentials.clone())
            .timeout(Some(self.timeout))
            .build())
    }
}

/// SMTP 530/534/535 are credential rejections; everything else is an
/// ordinary transport failure and propagates as-is.
fn is_auth_failure(err: &SmtpError) -> bool {
    matches!(
        err.status().map(|code| code.to_string()).as_deref(),
        Some("530" | "534" | "535")
    )
}
