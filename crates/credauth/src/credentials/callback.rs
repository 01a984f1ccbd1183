// The verification callback contract.
//
// The caller supplies the actual credential check (password compare, LDAP
// bind, external API call). The flow treats it as a black box that either
// vouches for an identity or doesn't.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use credauth_core::error::Result;

use crate::context::AuthContext;

/// Caller-supplied credential verification.
///
/// `Ok(None)` means the credentials did not check out; so does `Err(_)`.
/// Both collapse to a generic invalid-credentials failure at the boundary
/// unless a passthrough policy re-authorizes the original error.
#[async_trait]
pub trait VerifyCredentials: Send + Sync {
    async fn verify(&self, ctx: &AuthContext, input: &Value) -> Result<Option<CallbackOutcome>>;
}

/// Per-request hook invoked on the sign-up branch, before the user is
/// created. Returning `Ok(None)` vetoes the request.
#[async_trait]
pub trait SignUpHook: Send + Sync {
    async fn on_sign_up(
        &self,
        user_data: serde_json::Map<String, Value>,
    ) -> Result<Option<serde_json::Map<String, Value>>>;
}

/// Per-request hook invoked on the sign-in branch, before any mutation.
/// Receives the existing user and the linked account when one exists.
/// Returning `Ok(None)` vetoes the request.
#[async_trait]
pub trait SignInHook: Send + Sync {
    async fn on_sign_in(
        &self,
        user_data: serde_json::Map<String, Value>,
        user: &Value,
        account: Option<&Value>,
    ) -> Result<Option<serde_json::Map<String, Value>>>;
}

/// Per-request hook invoked when an account record is about to be created.
/// Returns extra fields to persist on the account. Errors here are not
/// downgraded; at this point the user already exists and partial state
/// should surface loudly.
#[async_trait]
pub trait LinkAccountHook: Send + Sync {
    async fn on_link_account(&self, user: &Value) -> Result<serde_json::Map<String, Value>>;
}

/// What a successful verification callback hands back to the flow.
#[derive(Default, Clone)]
pub struct CallbackOutcome {
    /// Identity email. Falls back to the parsed input's `email` field.
    pub email: Option<String>,
    /// Partial user fields to merge on sign-up / sign-in.
    pub user_data: serde_json::Map<String, Value>,
    pub on_sign_up: Option<Arc<dyn SignUpHook>>,
    pub on_sign_in: Option<Arc<dyn SignInHook>>,
    pub on_link_account: Option<Arc<dyn LinkAccountHook>>,
}

impl CallbackOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_user_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.user_data.insert(key.into(), value.into());
        self
    }

    pub fn with_sign_up_hook(mut self, hook: Arc<dyn SignUpHook>) -> Self {
        self.on_sign_up = Some(hook);
        self
    }

    pub fn with_sign_in_hook(mut self, hook: Arc<dyn SignInHook>) -> Self {
        self.on_sign_in = Some(hook);
        self
    }

    pub fn with_link_account_hook(mut self, hook: Arc<dyn LinkAccountHook>) -> Self {
        self.on_link_account = Some(hook);
        self
    }
}

impl std::fmt::Debug for CallbackOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackOutcome")
            .field("email", &self.email)
            .field("user_fields", &self.user_data.keys().collect::<Vec<_>>())
            .field("has_sign_up_hook", &self.on_sign_up.is_some())
            .field("has_sign_in_hook", &self.on_sign_in.is_some())
            .field("has_link_account_hook", &self.on_link_account.is_some())
            .finish()
    }
}
