//! HTTP-facing error surface.
//!
//! Transport adapters map service errors to a status code and a JSON body of
//! the form `{"error": {"code": ..., "message": ...}}`. Internal failures are
//! reported with a fixed message; their details only reach the logs.

use serde::{Deserialize, Serialize};

use crate::identity::domain::IdentityDomainError;
use crate::identity::ports::UserRepositoryError;
use crate::identity::services::AccountError;
use crate::task::services::TaskLifecycleError;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Machine-readable error code and caller-safe message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Stable error code, e.g. `NOT_FOUND`.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

/// Serialisable error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error details.
    pub error: ErrorDetail,
}

/// Errors that map onto an HTTP response.
pub trait HttpError: std::error::Error {
    /// Returns the HTTP status code.
    fn status_code(&self) -> u16;

    /// Returns the stable error code.
    fn error_code(&self) -> &'static str;

    /// Builds the response body.
    fn body(&self) -> ErrorBody {
        let message = if self.status_code() >= 500 {
            INTERNAL_MESSAGE.to_owned()
        } else {
            self.to_string()
        };
        ErrorBody {
            error: ErrorDetail {
                code: self.error_code().to_owned(),
                message,
            },
        }
    }
}

impl HttpError for TaskLifecycleError {
    fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::InvalidArgument(_) => 400,
            Self::Internal(_) => 500,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::InvalidArgument(_) => "BAD_REQUEST",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl HttpError for AccountError {
    fn status_code(&self) -> u16 {
        match self {
            Self::InvalidCredentials => 401,
            Self::Domain(IdentityDomainError::PasswordHashing(_)) => 500,
            Self::Domain(_) => 400,
            Self::Repository(
                UserRepositoryError::DuplicateUser(_) | UserRepositoryError::DuplicateUsername(_),
            ) => 409,
            Self::Repository(UserRepositoryError::Persistence(_)) | Self::Token(_) => 500,
        }
    }

    fn error_code(&self) -> &'static str {
        match self.status_code() {
            400 => "BAD_REQUEST",
            401 => "UNAUTHORIZED",
            409 => "CONFLICT",
            _ => "INTERNAL_ERROR",
        }
    }
}
