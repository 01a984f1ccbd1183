// Flow errors and the two-stage error pipeline.
//
// The flow raises a `FlowError`: the public `ApiError` that will cross the
// endpoint boundary plus, when the public error is a deliberate downgrade,
// the original structured error. The configured passthrough policy then gets
// one chance to surface a downgraded original before it is discarded.

use std::sync::Arc;

use credauth_core::error::{ApiError, CoreError, ErrorCode};

/// Error codes the credentials plugin can surface, exported the way the
/// host framework exposes plugin error tables.
pub const ERROR_CODES: &[ErrorCode] = &[
    ErrorCode::Validation,
    ErrorCode::InvalidCredentials,
    ErrorCode::EmailRequired,
    ErrorCode::EmailNotVerified,
    ErrorCode::UserNotFound,
    ErrorCode::NoUserDataProvided,
    ErrorCode::AccountNotFound,
    ErrorCode::AccountHasPassword,
    ErrorCode::FailedToCreateUser,
    ErrorCode::FailedToCreateSession,
    ErrorCode::UnexpectedError,
];

/// An error raised somewhere in the sign-in flow.
#[derive(Debug)]
pub struct FlowError {
    /// What crosses the endpoint boundary unless passthrough intervenes.
    pub public: ApiError,
    /// The original structured error, kept only for downgraded failures.
    /// `None` means the public error IS the real error.
    pub original: Option<CoreError>,
}

impl FlowError {
    /// A failure surfaced as-is, with nothing held back.
    pub fn direct(public: ApiError) -> Self {
        Self {
            public,
            original: None,
        }
    }

    /// A failure downgraded to generic `INVALID_CREDENTIALS`, retaining the
    /// original for the passthrough policy.
    pub fn downgraded(original: CoreError) -> Self {
        Self {
            public: ApiError::unauthorized(ErrorCode::InvalidCredentials),
            original: Some(original),
        }
    }

    /// Downgrade a semantically-distinct refusal (wrapped as an `ApiError`
    /// so matchers can target its code).
    pub fn downgraded_api(original: ApiError) -> Self {
        Self::downgraded(CoreError::Api(original))
    }
}

/// Matcher for the passthrough policy: matches the original error's status
/// plus optional code and message-substring constraints.
#[derive(Debug, Clone)]
pub struct PassThroughMatcher {
    pub status: u16,
    pub code: Option<ErrorCode>,
    pub message: Option<String>,
}

impl PassThroughMatcher {
    pub fn status(status: u16) -> Self {
        Self {
            status,
            code: None,
            message: None,
        }
    }

    pub fn code(status: u16, code: ErrorCode) -> Self {
        Self {
            status,
            code: Some(code),
            message: None,
        }
    }

    fn matches(&self, err: &ApiError) -> bool {
        if err.status.status_code() != self.status {
            return false;
        }
        if let Some(code) = self.code {
            if err.code != code {
                return false;
            }
        }
        if let Some(message) = &self.message {
            if !err.message.contains(message.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Custom passthrough mapping: receives the original error, may return a
/// replacement to surface instead of the generic downgrade.
pub type PassThroughFn = Arc<dyn Fn(&CoreError) -> Option<ApiError> + Send + Sync>;

/// Policy deciding whether a downgraded original error may cross the
/// endpoint boundary.
#[derive(Clone, Default)]
pub enum PassThrough {
    /// Downgraded errors stay generic (default).
    #[default]
    None,
    /// Surface originals whose structured form matches one of the matchers.
    Matchers(Vec<PassThroughMatcher>),
    /// Arbitrary mapping over the original error.
    Custom(PassThroughFn),
}

impl PassThrough {
    /// Resolve a flow error to the `ApiError` that crosses the boundary.
    pub fn resolve(&self, err: FlowError) -> ApiError {
        let original = match err.original {
            Some(original) => original,
            None => return err.public,
        };
        match self {
            PassThrough::None => err.public,
            PassThrough::Matchers(matchers) => match original.as_api_error() {
                Some(api) if matchers.iter().any(|m| m.matches(api)) => api.clone(),
                _ => err.public,
            },
            PassThrough::Custom(f) => f(&original).unwrap_or(err.public),
        }
    }
}

impl std::fmt::Debug for PassThrough {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PassThrough::None => write!(f, "PassThrough::None"),
            PassThrough::Matchers(m) => f.debug_tuple("PassThrough::Matchers").field(m).finish(),
            PassThrough::Custom(_) => write!(f, "PassThrough::Custom(..)"),
        }
    }
}
