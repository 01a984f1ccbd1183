// Error taxonomy for the credential sign-in flow.
//
// Two layers: `ApiError` is what crosses the endpoint boundary (status + code
// + message), `CoreError` is the internal catch-all that configuration,
// adapter, and callback code raise.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error codes surfaced by the credential sign-in endpoints.
///
/// `AccountNotFound` and `AccountHasPassword` are semantically distinct but
/// collapse to `InvalidCredentials` at the boundary unless a passthrough
/// policy re-authorizes them (see the plugin's error pipeline).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Validation,
    InvalidCredentials,
    EmailRequired,
    EmailNotVerified,
    UserNotFound,
    NoUserDataProvided,
    AccountNotFound,
    AccountHasPassword,
    FailedToCreateUser,
    FailedToCreateSession,
    UnexpectedError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::EmailRequired => "EMAIL_REQUIRED",
            Self::EmailNotVerified => "EMAIL_NOT_VERIFIED",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::NoUserDataProvided => "NO_USER_DATA_PROVIDED",
            Self::AccountNotFound => "ACCOUNT_NOT_FOUND",
            Self::AccountHasPassword => "ACCOUNT_HAS_PASSWORD",
            Self::FailedToCreateUser => "FAILED_TO_CREATE_USER",
            Self::FailedToCreateSession => "FAILED_TO_CREATE_SESSION",
            Self::UnexpectedError => "UNEXPECTED_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::Validation => "invalid request body",
            Self::InvalidCredentials => "invalid credentials",
            Self::EmailRequired => "email is required",
            Self::EmailNotVerified => "email not verified",
            Self::UserNotFound => "user not found",
            Self::NoUserDataProvided => {
                "no user data provided by the authentication callback"
            }
            Self::AccountNotFound => "account not found for the given provider",
            Self::AccountHasPassword => {
                "account has a password set, cannot login with credentials provider"
            }
            Self::FailedToCreateUser => "failed to create user",
            Self::FailedToCreateSession => "failed to create session",
            Self::UnexpectedError => "unexpected error",
        };
        write!(f, "{msg}")
    }
}

/// HTTP status codes used by the endpoint error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpStatus {
    Ok = 200,
    BadRequest = 400,
    Unauthorized = 401,
    Forbidden = 403,
    NotFound = 404,
    UnprocessableEntity = 422,
    InternalServerError = 500,
}

impl HttpStatus {
    pub fn status_code(&self) -> u16 {
        *self as u16
    }
}

impl fmt::Display for HttpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status_code())
    }
}

/// The error shape that crosses the endpoint boundary.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{status} {}: {message}", .code.as_str())]
pub struct ApiError {
    pub status: HttpStatus,
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: HttpStatus, code: ErrorCode) -> Self {
        Self {
            message: code.to_string(),
            status,
            code,
        }
    }

    pub fn with_message(status: HttpStatus, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn unauthorized(code: ErrorCode) -> Self {
        Self::new(HttpStatus::Unauthorized, code)
    }

    pub fn forbidden(code: ErrorCode) -> Self {
        Self::new(HttpStatus::Forbidden, code)
    }

    pub fn unprocessable(code: ErrorCode) -> Self {
        Self::new(HttpStatus::UnprocessableEntity, code)
    }

    pub fn internal(code: ErrorCode) -> Self {
        Self::new(HttpStatus::InternalServerError, code)
    }

    /// JSON body for the error response.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "code": self.code.as_str(),
            "message": self.message,
        })
    }
}

/// Internal (non-HTTP) error raised by configuration, adapters, and
/// verification callbacks.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Verification error: {0}")]
    Verification(String),

    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl CoreError {
    /// The structured API error inside this error, when one exists.
    pub fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }
}

/// Unified result type for credauth operations.
pub type Result<T> = std::result::Result<T, CoreError>;
