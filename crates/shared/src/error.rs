use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    Storage,
}

/// Rejection of a submitted registration form. The `Display` text is shown
/// to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter full name.")]
    MissingName,
    #[error("Please enter a valid email address.")]
    InvalidEmail,
}

impl ValidationError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::Validation
    }

    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingName => "name",
            Self::InvalidEmail => "email",
        }
    }
}
