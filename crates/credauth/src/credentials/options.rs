// Construction-time configuration for the credentials plugin.

use std::sync::Arc;

use super::callback::VerifyCredentials;
use super::error::PassThrough;
use super::schema::{DefaultCredentialsSchema, InputSchema};

/// Provider id reserved by the host's native email/password flow. An account
/// under this provider carrying a password hash is never signable-in through
/// this plugin.
pub const CREDENTIAL_PROVIDER_ID: &str = "credential";

/// Static configuration, fixed at plugin-construction time.
pub struct CredentialsOptions {
    /// The credential verification callback.
    pub callback: Arc<dyn VerifyCredentials>,
    /// Request body schema (default: `{email, password, rememberMe?}`).
    pub input_schema: Arc<dyn InputSchema>,
    /// Create a local user on first successful verification.
    pub auto_sign_up: bool,
    /// Attach this provider's account to a user that already exists under a
    /// different provider. Only effective together with `auto_sign_up`.
    pub link_account_if_existing: bool,
    /// Provider discriminator stored on created accounts.
    pub provider_id: String,
    /// Endpoint path registered on the host router.
    pub path: String,
    /// Policy for surfacing downgraded errors.
    pub pass_through: PassThrough,
}

impl CredentialsOptions {
    pub fn new(callback: Arc<dyn VerifyCredentials>) -> Self {
        Self {
            callback,
            input_schema: Arc::new(DefaultCredentialsSchema),
            auto_sign_up: false,
            link_account_if_existing: false,
            provider_id: CREDENTIAL_PROVIDER_ID.to_string(),
            path: "/sign-in/credentials".to_string(),
            pass_through: PassThrough::None,
        }
    }

    pub fn with_auto_sign_up(mut self, enabled: bool) -> Self {
        self.auto_sign_up = enabled;
        self
    }

    pub fn with_link_account_if_existing(mut self, enabled: bool) -> Self {
        self.link_account_if_existing = enabled;
        self
    }

    pub fn with_provider_id(mut self, provider_id: impl Into<String>) -> Self {
        self.provider_id = provider_id.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_input_schema(mut self, schema: Arc<dyn InputSchema>) -> Self {
        self.input_schema = schema;
        self
    }

    pub fn with_pass_through(mut self, policy: PassThrough) -> Self {
        self.pass_through = policy;
        self
    }
}

impl std::fmt::Debug for CredentialsOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsOptions")
            .field("provider_id", &self.provider_id)
            .field("path", &self.path)
            .field("auto_sign_up", &self.auto_sign_up)
            .field("link_account_if_existing", &self.link_account_if_existing)
            .field("pass_through", &self.pass_through)
            .finish()
    }
}
