// Verification-email dispatch, owned by the host application.

use async_trait::async_trait;
use serde_json::Value;

use credauth_core::error::Result;

/// Host-provided verification email dispatcher.
///
/// Called after sign-up when `email_verification.send_on_sign_up` is set,
/// and during sign-in when the user is unverified and verification is
/// required. Dispatch failures are logged, not surfaced to the client.
#[async_trait]
pub trait VerificationEmailSender: Send + Sync {
    async fn send_verification_email(&self, user: &Value) -> Result<()>;
}
