use std::{sync::Arc, time::Duration};

use relay_core_contact_contracts::{relay::ContactRelayService, ContactFeatureService};
use relay_di::Build;
use relay_models::contact::{self, ContactLimits, ContactRequest, ContactSubmission, DeliveryOutcome};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

pub mod relay;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Build)]
pub struct ContactFeatureServiceImpl<Relay> {
    relay: Relay,
    config: ContactFeatureConfig,
    limiter: ContactSendLimiter,
}

#[derive(Debug, Clone)]
pub struct ContactFeatureConfig {
    pub limits: ContactLimits,
    /// Upper bound for a single relay attempt.
    pub send_timeout: Duration,
    pub max_retries: u32,
    /// Delay before the first retry, doubled for every further retry.
    pub initial_backoff: Duration,
}

/// Bounds the number of emails being sent at the same time.
#[derive(Debug, Clone)]
pub struct ContactSendLimiter(Arc<Semaphore>);

impl ContactSendLimiter {
    pub fn new(max_concurrent_sends: usize) -> Self {
        Self(Arc::new(Semaphore::new(max_concurrent_sends)))
    }
}

impl<Relay> ContactFeatureService for ContactFeatureServiceImpl<Relay>
where
    Relay: ContactRelayService,
{
    async fn send_message(&self, request: ContactRequest) -> DeliveryOutcome {
        let submission = match contact::validate(
            &request.name,
            &request.email,
            &request.message,
            &self.config.limits,
        ) {
            Ok(submission) => submission,
            Err(reason) => {
                debug!(%reason, "rejected contact request");
                return DeliveryOutcome::Rejected(reason);
            }
        };

        let mut retries = 0;
        loop {
            let outcome = self.attempt(submission.clone()).await;

            match &outcome {
                DeliveryOutcome::Delivered => {
                    info!(retries, "delivered contact message");
                }
                DeliveryOutcome::TransientFailure(detail) if retries < self.config.max_retries => {
                    let delay = backoff(self.config.initial_backoff, retries);
                    warn!(retries, ?delay, "failed to deliver contact message, retrying: {detail}");
                    tokio::time::sleep(delay).await;
                    retries += 1;
                    continue;
                }
                DeliveryOutcome::TransientFailure(detail) => {
                    error!(retries, "failed to deliver contact message, giving up: {detail}");
                }
                DeliveryOutcome::PermanentFailure(detail) => {
                    error!("failed to deliver contact message, check the email configuration: {detail}");
                }
                DeliveryOutcome::Rejected(reason) => {
                    error!(%reason, "relay unexpectedly rejected a validated submission");
                }
            }

            return outcome;
        }
    }
}

impl<Relay> ContactFeatureServiceImpl<Relay>
where
    Relay: ContactRelayService,
{
    async fn attempt(&self, submission: ContactSubmission) -> DeliveryOutcome {
        let Ok(_permit) = self.limiter.0.acquire().await else {
            return DeliveryOutcome::TransientFailure("Send limiter has been closed".into());
        };

        match tokio::time::timeout(self.config.send_timeout, self.relay.send(submission)).await {
            Ok(outcome) => outcome,
            Err(_) => DeliveryOutcome::TransientFailure(format!(
                "Timed out after {:?}",
                self.config.send_timeout
            )),
        }
    }
}

/// Delay before retry number `retries + 1`.
fn backoff(initial: Duration, retries: u32) -> Duration {
    initial.saturating_mul(1 << retries.min(16))
}
