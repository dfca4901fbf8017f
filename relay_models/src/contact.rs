use nutype::nutype;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::email_address::{EmailAddress, EmailAddressWithName};

/// Raw contact form input as submitted by the visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// A contact request that passed validation.
///
/// Instances can only be obtained through [`validate`], so holding one
/// guarantees that all fields are present, within their size limits and that
/// the email address is well formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    sender_name: ContactSenderName,
    sender_email: EmailAddress,
    message_body: ContactMessageBody,
}

impl ContactSubmission {
    pub fn sender_name(&self) -> &ContactSenderName {
        &self.sender_name
    }

    pub fn sender_email(&self) -> &EmailAddress {
        &self.sender_email
    }

    pub fn message_body(&self) -> &ContactMessageBody {
        &self.message_body
    }

    /// The mailbox replies to the relayed email should be sent to.
    pub fn reply_to(&self) -> EmailAddressWithName {
        self.sender_email
            .clone()
            .with_name(self.sender_name.clone().into_inner())
    }
}

#[nutype(
    sanitize(with = replace_control_chars),
    validate(not_empty, len_char_max = 200),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref)
)]
pub struct ContactSenderName(String);

impl ContactSenderName {
    pub const MAX_LENGTH: usize = 200;
}

#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 10000),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref)
)]
pub struct ContactMessageBody(String);

impl ContactMessageBody {
    pub const MAX_LENGTH: usize = 10_000;
}

/// Longest email address accepted for the reply-to header (RFC 5321 path limit).
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Name headers must stay on a single line.
fn replace_control_chars(s: String) -> String {
    s.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_owned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    Name,
    Email,
    Message,
}

impl ContactField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Message => "message",
        }
    }
}

impl std::fmt::Display for ContactField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectionReason {
    #[error("The field `{0}` is missing.")]
    MissingField(ContactField),
    #[error("The email address is invalid.")]
    InvalidEmail,
    #[error("The field `{0}` is too large.")]
    TooLarge(ContactField),
}

impl RejectionReason {
    /// Stable machine readable identifier of the rejection.
    pub fn code(self) -> &'static str {
        match self {
            Self::MissingField(_) => "missing_field",
            Self::InvalidEmail => "invalid_email",
            Self::TooLarge(_) => "too_large",
        }
    }

    pub fn field(self) -> ContactField {
        match self {
            Self::MissingField(field) | Self::TooLarge(field) => field,
            Self::InvalidEmail => ContactField::Email,
        }
    }
}

/// Upper bounds for the fields of a contact submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactLimits {
    max_name_length: usize,
    max_email_length: usize,
    max_message_length: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("The limit for `{field}` must be between 1 and {max}.")]
pub struct ContactLimitsError {
    pub field: ContactField,
    pub max: usize,
}

impl ContactLimits {
    pub const MAX: Self = Self {
        max_name_length: ContactSenderName::MAX_LENGTH,
        max_email_length: MAX_EMAIL_LENGTH,
        max_message_length: ContactMessageBody::MAX_LENGTH,
    };

    pub fn new(
        max_name_length: usize,
        max_email_length: usize,
        max_message_length: usize,
    ) -> Result<Self, ContactLimitsError> {
        for (field, value, max) in [
            (ContactField::Name, max_name_length, Self::MAX.max_name_length),
            (ContactField::Email, max_email_length, Self::MAX.max_email_length),
            (
                ContactField::Message,
                max_message_length,
                Self::MAX.max_message_length,
            ),
        ] {
            if !(1..=max).contains(&value) {
                return Err(ContactLimitsError { field, max });
            }
        }

        Ok(Self {
            max_name_length,
            max_email_length,
            max_message_length,
        })
    }

    pub fn max_name_length(&self) -> usize {
        self.max_name_length
    }

    pub fn max_email_length(&self) -> usize {
        self.max_email_length
    }

    pub fn max_message_length(&self) -> usize {
        self.max_message_length
    }
}

impl Default for ContactLimits {
    fn default() -> Self {
        Self::MAX
    }
}

/// Validates a raw contact request.
///
/// Missing name or message always take precedence over problems with the
/// email address. No I/O happens here.
pub fn validate(
    name: &str,
    email: &str,
    message: &str,
    limits: &ContactLimits,
) -> Result<ContactSubmission, RejectionReason> {
    let (name, email, message) = (name.trim(), email.trim(), message.trim());

    if name.is_empty() {
        return Err(RejectionReason::MissingField(ContactField::Name));
    }
    if message.is_empty() {
        return Err(RejectionReason::MissingField(ContactField::Message));
    }

    if name.chars().count() > limits.max_name_length {
        return Err(RejectionReason::TooLarge(ContactField::Name));
    }
    if message.chars().count() > limits.max_message_length {
        return Err(RejectionReason::TooLarge(ContactField::Message));
    }

    let sender_email = parse_email(email).ok_or(RejectionReason::InvalidEmail)?;
    if email.chars().count() > limits.max_email_length {
        return Err(RejectionReason::TooLarge(ContactField::Email));
    }

    let sender_name = ContactSenderName::try_new(name.to_owned()).map_err(|err| match err {
        ContactSenderNameError::NotEmptyViolated => {
            RejectionReason::MissingField(ContactField::Name)
        }
        ContactSenderNameError::LenCharMaxViolated => {
            RejectionReason::TooLarge(ContactField::Name)
        }
    })?;

    let message_body = ContactMessageBody::try_new(message.to_owned()).map_err(|err| match err {
        ContactMessageBodyError::NotEmptyViolated => {
            RejectionReason::MissingField(ContactField::Message)
        }
        ContactMessageBodyError::LenCharMaxViolated => {
            RejectionReason::TooLarge(ContactField::Message)
        }
    })?;

    Ok(ContactSubmission {
        sender_name,
        sender_email,
        message_body,
    })
}

/// Parses `local@domain.tld`, rejecting single label domains and address
/// literals.
fn parse_email(email: &str) -> Option<EmailAddress> {
    let address = email.parse::<EmailAddress>().ok()?;
    let domain = address.domain();

    let valid_domain = domain.contains('.')
        && domain.split('.').all(|label| {
            !label.is_empty() && label.chars().all(|c| c.is_alphanumeric() || c == '-')
        });

    valid_domain.then_some(address)
}

/// Result of relaying a contact submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Rejected(RejectionReason),
    /// The transport failed in a way that may succeed on retry.
    TransientFailure(String),
    /// The transport failed in a way no retry will fix.
    PermanentFailure(String),
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use relay_utils::assert_matches;

    use super::*;

    fn check(name: &str, email: &str, message: &str) -> Result<ContactSubmission, RejectionReason> {
        validate(name, email, message, &ContactLimits::default())
    }

    #[test]
    fn ok() {
        let submission = check("  Ada ", " ada@example.com", "Hello\n").unwrap();

        assert_eq!(**submission.sender_name(), "Ada");
        assert_eq!(submission.sender_email().as_str(), "ada@example.com");
        assert_eq!(**submission.message_body(), "Hello");
        assert_eq!(submission.reply_to().name(), Some("Ada"));
        assert_eq!(submission.reply_to().email(), "ada@example.com");
    }

    #[test]
    fn missing_name_or_message() {
        for (name, email, message, field) in [
            ("", "ada@example.com", "Hello", ContactField::Name),
            ("   ", "ada@example.com", "Hello", ContactField::Name),
            ("\t\n", "not an email", "Hello", ContactField::Name),
            ("Ada", "ada@example.com", "", ContactField::Message),
            ("Ada", "", " \n ", ContactField::Message),
            ("", "", "", ContactField::Name),
        ] {
            assert_eq!(
                check(name, email, message),
                Err(RejectionReason::MissingField(field))
            );
        }
    }

    #[test]
    fn invalid_email() {
        for email in [
            "",
            "ada",
            "ada@",
            "@example.com",
            "ada@example",
            "ada@@example.com",
            "ada@example.",
            "ada@.com",
            "ada@exa mple.com",
            "ada@[127.0.0.1]",
        ] {
            assert_eq!(
                check("Ada", email, "Hello"),
                Err(RejectionReason::InvalidEmail),
                "{email:?} should be rejected"
            );
        }
    }

    #[test]
    fn too_large() {
        let long_name = "a".repeat(ContactSenderName::MAX_LENGTH + 1);
        assert_eq!(
            check(&long_name, "ada@example.com", "Hello"),
            Err(RejectionReason::TooLarge(ContactField::Name))
        );

        let long_message = "a".repeat(ContactMessageBody::MAX_LENGTH + 1);
        assert_eq!(
            check("Ada", "ada@example.com", &long_message),
            Err(RejectionReason::TooLarge(ContactField::Message))
        );

        let long_email = format!("{}@example.com", "a".repeat(60));
        let limits = ContactLimits::new(200, 40, 10_000).unwrap();
        assert_eq!(
            validate("Ada", &long_email, "Hello", &limits),
            Err(RejectionReason::TooLarge(ContactField::Email))
        );
    }

    #[test]
    fn size_limits_count_chars() {
        let name = "ä".repeat(ContactSenderName::MAX_LENGTH);
        check(&name, "ada@example.com", "Hello").unwrap();
    }

    #[test]
    fn configured_limits() {
        let limits = ContactLimits::new(3, 254, 5).unwrap();

        assert_eq!(
            validate("Adam", "ada@example.com", "Hi", &limits),
            Err(RejectionReason::TooLarge(ContactField::Name))
        );
        assert_eq!(
            validate("Ada", "ada@example.com", "Hello!", &limits),
            Err(RejectionReason::TooLarge(ContactField::Message))
        );
        validate("Ada", "ada@example.com", "Hello", &limits).unwrap();
    }

    #[test]
    fn limits_above_ceiling() {
        assert_eq!(
            ContactLimits::new(201, 254, 10_000),
            Err(ContactLimitsError {
                field: ContactField::Name,
                max: 200
            })
        );
        assert_matches!(
            ContactLimits::new(200, 254, 0),
            Err(ContactLimitsError {
                field: ContactField::Message,
                ..
            })
        );
    }

    #[test]
    fn name_control_chars() {
        let submission = check("Ada\r\nBcc: eve@example.com", "ada@example.com", "Hello").unwrap();
        assert_eq!(**submission.sender_name(), "Ada  Bcc: eve@example.com");

        assert_eq!(
            check("\u{7}", "ada@example.com", "Hello"),
            Err(RejectionReason::MissingField(ContactField::Name))
        );
    }

    #[test]
    fn rejection_reason_code() {
        assert_eq!(
            RejectionReason::MissingField(ContactField::Message).code(),
            "missing_field"
        );
        assert_eq!(RejectionReason::InvalidEmail.field(), ContactField::Email);
        assert_eq!(
            serde_json::to_value(ContactField::Message).unwrap(),
            serde_json::json!("message")
        );
    }

    #[test]
    fn request_defaults_missing_fields() {
        let request: ContactRequest = serde_json::from_str(r#"{"name": "Ada"}"#).unwrap();
        assert_eq!(
            request,
            ContactRequest {
                name: "Ada".into(),
                ..Default::default()
            }
        );
    }
}
