use std::time::Duration;

use anyhow::{anyhow, Context};
use lettre::{
    message::{header, MessageBuilder},
    transport::smtp::{
        authentication::Credentials,
        response::{Code, Severity},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use relay_email_contracts::{ContentType, Email, EmailSendError, EmailService};
use relay_models::{email_address::EmailAddressWithName, Sensitive};
use relay_utils::Apply;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct EmailServiceImpl {
    from: EmailAddressWithName,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

/// Everything needed to open an authenticated session to the smtp server.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub url: String,
    pub username: String,
    pub password: Sensitive<String>,
    pub timeout: Duration,
}

impl EmailServiceImpl {
    /// Creates the pooled transport. Connections are established lazily and
    /// shared by all clones of the returned service.
    pub async fn new(settings: &SmtpSettings, from: EmailAddressWithName) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::from_url(&settings.url)
            .context("Invalid smtp url")?
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.0.clone(),
            ))
            .timeout(Some(settings.timeout))
            .build();

        Ok(Self { from, transport })
    }

    #[cfg(feature = "dummy")]
    pub async fn dummy() -> Self {
        Self::new(
            &SmtpSettings {
                url: "smtp://dummy".into(),
                username: "dummy".into(),
                password: String::new().into(),
                timeout: Duration::from_secs(1),
            },
            "dummy@example.com".parse().unwrap(),
        )
        .await
        .unwrap()
    }

    fn build_message(&self, email: Email) -> Result<Message, lettre::error::Error> {
        Message::builder()
            .from(self.from.0.clone())
            .to(email.recipient.0)
            .apply_map(email.reply_to.map(|x| x.0), MessageBuilder::reply_to)
            .subject(email.subject)
            .header(match email.content_type {
                ContentType::Text => header::ContentType::TEXT_PLAIN,
                ContentType::Html => header::ContentType::TEXT_HTML,
            })
            .body(email.body)
    }
}

impl EmailService for EmailServiceImpl {
    async fn send(&self, email: Email) -> Result<(), EmailSendError> {
        let message = self
            .build_message(email)
            .map_err(|err| EmailSendError::Permanent(anyhow!(err).context("Invalid email")))?;

        let response = self
            .transport
            .send(message)
            .await
            .map_err(|err| match classify(&err) {
                Failure::Transient => EmailSendError::Transient(err.into()),
                Failure::Permanent => EmailSendError::Permanent(err.into()),
            })?;

        debug!(code = %response.code(), "smtp server accepted message");

        if response.is_positive() {
            Ok(())
        } else {
            let err = anyhow!("Unexpected smtp response {}", response.code());
            match classify_code(response.code()) {
                Failure::Transient => Err(EmailSendError::Transient(err)),
                Failure::Permanent => Err(EmailSendError::Permanent(err)),
            }
        }
    }

    async fn ping(&self) -> anyhow::Result<()> {
        self.transport
            .test_connection()
            .await?
            .then_some(())
            .ok_or_else(|| anyhow!("Failed to ping smtp server"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    Transient,
    Permanent,
}

/// Timeouts, io and tls errors as well as 4xx replies may go away on their
/// own. 5xx replies (bad credentials, unknown recipient) and client side
/// errors (e.g. no usable auth mechanism) will not.
fn classify(err: &lettre::transport::smtp::Error) -> Failure {
    if err.is_timeout() {
        return Failure::Transient;
    }

    match err.status() {
        Some(code) => classify_code(code),
        None if err.is_client() => Failure::Permanent,
        None => Failure::Transient,
    }
}

fn classify_code(code: Code) -> Failure {
    match code.severity {
        Severity::PermanentNegativeCompletion => Failure::Permanent,
        _ => Failure::Transient,
    }
}
