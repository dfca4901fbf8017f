use std::future::Future;

use relay_models::contact::{ContactSubmission, DeliveryOutcome};

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ContactRelayService: Send + Sync + 'static {
    /// Send exactly one email for the given submission.
    ///
    /// There is no deduplication: calling this twice with the same
    /// submission sends two emails. Never returns
    /// [`DeliveryOutcome::Rejected`].
    fn send(
        &self,
        submission: ContactSubmission,
    ) -> impl Future<Output = DeliveryOutcome> + Send;
}

#[cfg(feature = "mock")]
impl MockContactRelayService {
    pub fn with_send(mut self, submission: ContactSubmission, result: DeliveryOutcome) -> Self {
        self.expect_send()
            .once()
            .with(mockall::predicate::eq(submission))
            .return_once(move |_| Box::pin(std::future::ready(result)));
        self
    }

    pub fn with_send_times(
        mut self,
        submission: ContactSubmission,
        times: usize,
        result: DeliveryOutcome,
    ) -> Self {
        self.expect_send()
            .times(times)
            .with(mockall::predicate::eq(submission))
            .returning(move |_| Box::pin(std::future::ready(result.clone())));
        self
    }
}
