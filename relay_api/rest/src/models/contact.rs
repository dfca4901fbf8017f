use relay_models::contact::{ContactField, ContactRequest, RejectionReason};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiContactRequest {
    /// Display name of the visitor
    pub name: String,
    /// Email address replies should go to
    pub email: String,
    /// Content of the message
    pub message: String,
}

impl From<ApiContactRequest> for ContactRequest {
    fn from(value: ApiContactRequest) -> Self {
        Self {
            name: value.name,
            email: value.email,
            message: value.message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiContactResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<ContactField>,
}

impl ApiContactResponse {
    pub fn success() -> Self {
        Self {
            success: true,
            reason: None,
            field: None,
        }
    }

    pub fn failure() -> Self {
        Self {
            success: false,
            reason: None,
            field: None,
        }
    }

    pub fn rejected(reason: RejectionReason) -> Self {
        Self {
            success: false,
            reason: Some(reason.code()),
            field: Some(reason.field()),
        }
    }

    pub fn invalid_body() -> Self {
        Self {
            reason: Some("invalid_body"),
            ..Self::failure()
        }
    }

    pub fn too_large() -> Self {
        Self {
            reason: Some("too_large"),
            ..Self::failure()
        }
    }
}
