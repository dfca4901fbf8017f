use std::time::Duration;

use relay_core_contact_contracts::relay::MockContactRelayService;
use relay_models::contact::{validate, ContactLimits, ContactRequest, ContactSubmission};

use crate::{ContactFeatureConfig, ContactFeatureServiceImpl, ContactSendLimiter};

mod backoff;

type Sut = ContactFeatureServiceImpl<MockContactRelayService>;

fn make_sut(relay: MockContactRelayService) -> Sut {
    ContactFeatureServiceImpl {
        relay,
        config: config(),
        limiter: ContactSendLimiter::new(8),
    }
}

fn config() -> ContactFeatureConfig {
    ContactFeatureConfig {
        limits: ContactLimits::default(),
        send_timeout: Duration::from_secs(10),
        max_retries: 2,
        initial_backoff: Duration::from_millis(1),
    }
}

fn request() -> ContactRequest {
    ContactRequest {
        name: "Ada".into(),
        email: "ada@example.com".into(),
        message: "Hello".into(),
    }
}

fn submission() -> ContactSubmission {
    validate("Ada", "ada@example.com", "Hello", &ContactLimits::default()).unwrap()
}
