use std::sync::Arc;

use relay_core_contact_contracts::relay::ContactRelayService;
use relay_di::Build;
use relay_email_contracts::{ContentType, Email, EmailSendError, EmailService};
use relay_models::{
    contact::{ContactSubmission, DeliveryOutcome},
    email_address::EmailAddressWithName,
};

#[derive(Debug, Clone, Build)]
pub struct ContactRelayServiceImpl<Mailer> {
    email: Mailer,
    config: ContactRelayConfig,
}

#[derive(Debug, Clone)]
pub struct ContactRelayConfig {
    pub recipient: Arc<EmailAddressWithName>,
}

impl<Mailer> ContactRelayService for ContactRelayServiceImpl<Mailer>
where
    Mailer: EmailService,
{
    async fn send(&self, submission: ContactSubmission) -> DeliveryOutcome {
        let email = Email {
            recipient: (*self.config.recipient).clone(),
            subject: format!("New message from {}", **submission.sender_name()),
            body: (**submission.message_body()).clone(),
            content_type: ContentType::Text,
            reply_to: Some(submission.reply_to()),
        };

        match self.email.send(email).await {
            Ok(()) => DeliveryOutcome::Delivered,
            Err(err @ EmailSendError::Transient(_)) => {
                DeliveryOutcome::TransientFailure(err.to_string())
            }
            Err(err @ EmailSendError::Permanent(_)) => {
                DeliveryOutcome::PermanentFailure(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use anyhow::anyhow;
    use pretty_assertions::assert_eq;
    use relay_email_contracts::MockEmailService;
    use relay_models::contact::{validate, ContactLimits};
    use relay_utils::assert_matches;

    use super::*;

    fn config() -> ContactRelayConfig {
        ContactRelayConfig {
            recipient: Arc::new("Owner <owner@example.com>".parse().unwrap()),
        }
    }

    fn submission() -> ContactSubmission {
        validate("Ada", "ada@example.com", "Hello", &ContactLimits::default()).unwrap()
    }

    fn expected_email() -> Email {
        Email {
            recipient: "Owner <owner@example.com>".parse().unwrap(),
            subject: "New message from Ada".into(),
            body: "Hello".into(),
            content_type: ContentType::Text,
            reply_to: Some("Ada <ada@example.com>".parse().unwrap()),
        }
    }

    #[tokio::test]
    async fn delivered() {
        // Arrange
        let email = MockEmailService::new().with_send(expected_email(), Ok(()));
        let sut = ContactRelayServiceImpl {
            email,
            config: config(),
        };

        // Act
        let result = sut.send(submission()).await;

        // Assert
        assert_eq!(result, DeliveryOutcome::Delivered);
    }

    #[tokio::test]
    async fn email_content() {
        // Arrange
        let sent = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&sent);
        let mut email = MockEmailService::new();
        email.expect_send().once().returning(move |email| {
            captured.lock().unwrap().push(email);
            Box::pin(std::future::ready(Ok(())))
        });
        let sut = ContactRelayServiceImpl {
            email,
            config: config(),
        };

        // Act
        let result = sut.send(submission()).await;

        // Assert
        assert_eq!(result, DeliveryOutcome::Delivered);
        let sent = sent.lock().unwrap();
        let reply_to = sent[0].reply_to.as_ref().unwrap();
        assert_eq!(reply_to.email(), "ada@example.com");
        assert!(sent[0].subject.contains("Ada"));
        assert_eq!(sent[0].body, "Hello");
        assert_eq!(sent[0].recipient.email(), "owner@example.com");
    }

    #[tokio::test]
    async fn network_timeout() {
        // Arrange
        let email = MockEmailService::new().with_send(
            expected_email(),
            Err(EmailSendError::Transient(anyhow!("connection timed out"))),
        );
        let sut = ContactRelayServiceImpl {
            email,
            config: config(),
        };

        // Act
        let result = sut.send(submission()).await;

        // Assert
        assert_matches!(result, DeliveryOutcome::TransientFailure(detail) if detail.contains("timed out"));
    }

    #[tokio::test]
    async fn authentication_failed() {
        // Arrange
        let email = MockEmailService::new().with_send(
            expected_email(),
            Err(EmailSendError::Permanent(anyhow!(
                "535 5.7.8 Username and Password not accepted"
            ))),
        );
        let sut = ContactRelayServiceImpl {
            email,
            config: config(),
        };

        // Act
        let result = sut.send(submission()).await;

        // Assert
        assert_matches!(result, DeliveryOutcome::PermanentFailure(_));
    }

    #[tokio::test]
    async fn no_deduplication() {
        // Arrange
        let sent = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&sent);
        let mut email = MockEmailService::new();
        email.expect_send().times(2).returning(move |email| {
            captured.lock().unwrap().push(email);
            Box::pin(std::future::ready(Ok(())))
        });
        let sut = ContactRelayServiceImpl {
            email,
            config: config(),
        };

        // Act
        let first = sut.send(submission()).await;
        let second = sut.send(submission()).await;

        // Assert
        assert_eq!(first, DeliveryOutcome::Delivered);
        assert_eq!(second, DeliveryOutcome::Delivered);
        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], expected_email());
        assert_eq!(sent[1], expected_email());
    }
}
