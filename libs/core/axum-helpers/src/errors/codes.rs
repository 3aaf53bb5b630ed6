//! Stable error codes attached to every translated error in the logs.
//!
//! Clients only see the `message` body. The codes exist so log queries and
//! alerts can key on a number instead of free text.
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! assert_eq!(ErrorCode::ValidationError.as_str(), "VALIDATION_ERROR");
//! assert_eq!(ErrorCode::ValidationError.code(), 1001);
//! ```

use strum::{Display, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    ValidationError,
    InvalidPath,
    InvalidJson,
    NotFound,
    InvalidQuery,
    Conflict,
    BadRequest,

    // Server errors
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// Integer code for structured logs.
    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::InvalidPath => 1002,
            Self::InvalidJson => 1003,
            Self::NotFound => 1004,
            Self::InternalError => 1005,
            Self::InvalidQuery => 1006,
            Self::Conflict => 1008,
            Self::BadRequest => 1010,
        }
    }
}
