// Construction-time host options the sign-in flow reads.
//
// Fixed when the auth instance is built; never mutated at runtime.

use crate::logger::LoggerConfig;

/// Host auth options.
#[derive(Debug, Clone)]
pub struct AuthOptions {
    /// Application name for branding.
    pub app_name: Option<String>,
    /// Secret used to sign session cookies.
    pub secret: String,
    /// Base path for auth routes (default: "/api/auth").
    pub base_path: String,
    /// Session issuance configuration.
    pub session: SessionOptions,
    /// Native email/password flow configuration.
    pub email_and_password: EmailAndPasswordOptions,
    /// Email verification dispatch configuration.
    pub email_verification: EmailVerificationOptions,
    /// Logger configuration.
    pub logger: LoggerConfig,
}

impl AuthOptions {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            app_name: None,
            secret: secret.into(),
            base_path: "/api/auth".to_string(),
            session: SessionOptions::default(),
            email_and_password: EmailAndPasswordOptions::default(),
            email_verification: EmailVerificationOptions::default(),
            logger: LoggerConfig::default(),
        }
    }
}

/// Session issuance configuration.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Session TTL in seconds (default: 604800 = 7 days).
    pub expires_in: u64,
    /// TTL in seconds when the client did not ask to be remembered
    /// (default: 86400 = 1 day).
    pub dont_remember_expires_in: u64,
    /// Name of the session token cookie.
    pub cookie_name: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            expires_in: 60 * 60 * 24 * 7,
            dont_remember_expires_in: 60 * 60 * 24,
            cookie_name: "credauth.session_token".to_string(),
        }
    }
}

/// Native email/password flow configuration.
///
/// Only the verification gate matters to the credentials plugin: when
/// `require_email_verification` is set, an unverified existing user is
/// rejected before any account or session work.
#[derive(Debug, Clone, Default)]
pub struct EmailAndPasswordOptions {
    pub enabled: bool,
    pub require_email_verification: bool,
}

/// Email verification dispatch configuration.
#[derive(Debug, Clone, Default)]
pub struct EmailVerificationOptions {
    /// Send a verification email right after sign-up even when verification
    /// is not required for sign-in.
    pub send_on_sign_up: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = AuthOptions::new("secret-at-least-32-characters-long!!");
        assert_eq!(options.base_path, "/api/auth");
        assert_eq!(options.session.expires_in, 604_800);
        assert_eq!(options.session.dont_remember_expires_in, 86_400);
        assert!(!options.email_and_password.require_email_verification);
        assert!(!options.email_verification.send_on_sign_up);
    }
}
