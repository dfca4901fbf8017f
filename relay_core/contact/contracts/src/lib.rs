use std::future::Future;

use relay_models::contact::{ContactRequest, DeliveryOutcome};

pub mod relay;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ContactFeatureService: Send + Sync + 'static {
    /// Validate a contact request and relay it to the configured recipient,
    /// retrying transient transport failures.
    fn send_message(
        &self,
        request: ContactRequest,
    ) -> impl Future<Output = DeliveryOutcome> + Send;
}

#[cfg(feature = "mock")]
impl MockContactFeatureService {
    pub fn with_send_message(mut self, request: ContactRequest, result: DeliveryOutcome) -> Self {
        self.expect_send_message()
            .once()
            .with(mockall::predicate::eq(request))
            .return_once(move |_| Box::pin(std::future::ready(result)));
        self
    }
}
