//! Public types for the email submission API
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SubmitEmailRequest {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmitEmailResponse {
    pub success: bool,
    pub message: String,
}

impl SubmitEmailResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
