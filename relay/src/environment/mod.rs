use anyhow::{ensure, Context};
use relay_api_rest::RestServerConfig;
use relay_config::Config;
use relay_core_contact_impl::{relay::ContactRelayConfig, ContactFeatureConfig, ContactSendLimiter};
use relay_core_health_impl::HealthFeatureConfig;
use relay_di::provider;
use relay_models::contact::ContactLimits;
use types::Email;

pub mod types;

provider! {
    /// The default provider, capable of providing all the dependencies
    pub Provider {
        email: Email,
        ..config: ConfigProvider {
            // API
            RestServerConfig,

            // Core
            ContactFeatureConfig,
            ContactRelayConfig,
            ContactSendLimiter,
            HealthFeatureConfig,
        }
    }
}

impl Provider {
    pub fn new(config: ConfigProvider, email: Email) -> Self {
        Self {
            _cache: Default::default(),
            email,
            config,
        }
    }
}

provider! {
    /// Reduced provider, capable of providing services that only depend on the configuration
    pub ConfigProvider {
        // API
        rest_server_config: RestServerConfig,

        // Core
        contact_feature_config: ContactFeatureConfig,
        contact_relay_config: ContactRelayConfig,
        contact_send_limiter: ContactSendLimiter,
        health_feature_config: HealthFeatureConfig,
    }
}

impl ConfigProvider {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        // API
        let rest_server_config = RestServerConfig {
            max_body_size: config.http.max_body_size,
        };

        // Core
        let limits = ContactLimits::new(
            config.contact.max_name_length,
            config.contact.max_email_length,
            config.contact.max_message_length,
        )
        .context("Invalid contact limits")?;

        let contact_feature_config = ContactFeatureConfig {
            limits,
            send_timeout: config.contact.send_timeout.into(),
            max_retries: config.contact.max_retries,
            initial_backoff: config.contact.initial_backoff.into(),
        };

        let contact_relay_config = ContactRelayConfig {
            recipient: config.contact.recipient.clone().into(),
        };

        ensure!(
            config.contact.max_concurrent_sends > 0,
            "contact.max_concurrent_sends must be at least 1"
        );
        let contact_send_limiter = ContactSendLimiter::new(config.contact.max_concurrent_sends);

        let health_feature_config = HealthFeatureConfig {
            cache_ttl: config.health.cache_ttl.into(),
        };

        Ok(Self {
            _cache: Default::default(),

            // API
            rest_server_config,

            // Core
            contact_feature_config,
            contact_relay_config,
            contact_send_limiter,
            health_feature_config,
        })
    }
}

#[cfg(test)]
mod tests {
    use relay_di::Provides;
    use relay_email_impl::EmailServiceImpl;
    use types::RestServer;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Config {
        let env = [
            ("MAIL_USER", "relay@example.com"),
            ("MAIL_PASS", "hunter2"),
        ]
        .iter()
        .chain(vars)
        .map(|&(k, v)| (k.to_owned(), v.to_owned()))
        .collect();
        relay_config::load_from(&[] as &[&str], env).unwrap()
    }

    #[tokio::test]
    async fn provide_rest_server() {
        let config_provider = ConfigProvider::new(&config(&[])).unwrap();
        let email = EmailServiceImpl::dummy().await;

        let mut provider = Provider::new(config_provider, email);
        let _: RestServer = provider.provide();
    }

    #[test]
    fn limits_above_ceiling() {
        let result = ConfigProvider::new(&config(&[("RELAY_CONTACT__MAX_NAME_LENGTH", "201")]));
        assert!(result.is_err());
    }

    #[test]
    fn no_concurrent_sends() {
        let result = ConfigProvider::new(&config(&[("RELAY_CONTACT__MAX_CONCURRENT_SENDS", "0")]));
        assert!(result.is_err());
    }
}
