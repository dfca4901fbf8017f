use anyhow::Context;
use relay_config::EmailConfig;
use relay_email_impl::{EmailServiceImpl, SmtpSettings};

/// Connect to the SMTP server
pub async fn connect(config: &EmailConfig) -> anyhow::Result<EmailServiceImpl> {
    let settings = SmtpSettings {
        url: config.smtp_url.clone(),
        username: config.username.clone(),
        password: config.password.clone(),
        timeout: config.timeout.into(),
    };

    EmailServiceImpl::new(&settings, config.from.clone())
        .await
        .context("Failed to connect to SMTP server")
}
