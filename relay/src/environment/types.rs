use relay_core_contact_impl::{relay::ContactRelayServiceImpl, ContactFeatureServiceImpl};
use relay_core_health_impl::HealthFeatureServiceImpl;
use relay_email_impl::EmailServiceImpl;

// API
pub type RestServer = relay_api_rest::RestServer<HealthFeature, ContactFeature>;

// Email
pub type Email = EmailServiceImpl;

// Core
pub type ContactFeature = ContactFeatureServiceImpl<ContactRelay>;
pub type ContactRelay = ContactRelayServiceImpl<Email>;

pub type HealthFeature = HealthFeatureServiceImpl<Email>;
