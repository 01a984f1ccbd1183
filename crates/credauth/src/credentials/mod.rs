// Credential sign-in plugin.
//
// Registers one POST endpoint on the host router. Given an
// externally-verified identity assertion from the configured callback, the
// flow decides whether to sign up a new local user, sign in an existing one,
// or link a new authentication method to an existing account.

pub mod callback;
pub mod error;
pub mod flow;
pub mod options;
pub mod schema;

use std::sync::Arc;

use serde_json::Value;

use credauth_core::error::ErrorCode;
use credauth_core::plugin::{
    AuthPlugin, HttpMethod, PluginEndpoint, PluginHandlerFn, PluginHandlerRequest,
    PluginHandlerResponse,
};

use crate::context::AuthContext;
use crate::cookies::session_cookie_header;

pub use callback::{CallbackOutcome, LinkAccountHook, SignInHook, SignUpHook, VerifyCredentials};
pub use error::{FlowError, PassThrough, PassThroughMatcher, ERROR_CODES};
pub use options::{CredentialsOptions, CREDENTIAL_PROVIDER_ID};
pub use schema::{DefaultCredentialsSchema, InputSchema, ValidationError};

/// The credential sign-in plugin.
#[derive(Debug)]
pub struct CredentialsPlugin {
    id: String,
    options: Arc<CredentialsOptions>,
}

impl CredentialsPlugin {
    pub fn new(options: CredentialsOptions) -> Self {
        Self::with_id("credentials", options)
    }

    /// Variants (e.g. the LDAP plugin) register under their own id.
    pub fn with_id(id: impl Into<String>, options: CredentialsOptions) -> Self {
        Self {
            id: id.into(),
            options: Arc::new(options),
        }
    }

    pub fn options(&self) -> &CredentialsOptions {
        &self.options
    }
}

impl AuthPlugin for CredentialsPlugin {
    fn id(&self) -> &str {
        &self.id
    }

    fn endpoints(&self) -> Vec<PluginEndpoint> {
        let options = self.options.clone();
        let handler: PluginHandlerFn = Arc::new(move |ctx, request| {
            let options = options.clone();
            Box::pin(async move { handle_sign_in(ctx, options, request).await })
        });

        vec![
            PluginEndpoint::new(self.options.path.clone(), HttpMethod::Post, handler)
                .with_metadata("summary", Value::String("Sign in with credentials".into()))
                .with_metadata(
                    "description",
                    Value::String(
                        "Verifies the submitted credentials through the configured \
                         callback and signs the user in, creating the user and \
                         provider account when auto sign-up permits."
                            .into(),
                    ),
                ),
        ]
    }

    fn error_codes(&self) -> Vec<ErrorCode> {
        ERROR_CODES.to_vec()
    }
}

async fn handle_sign_in(
    ctx: Arc<dyn std::any::Any + Send + Sync>,
    options: Arc<CredentialsOptions>,
    request: PluginHandlerRequest,
) -> PluginHandlerResponse {
    let ctx = match AuthContext::from_any(ctx) {
        Some(ctx) => ctx,
        None => {
            return PluginHandlerResponse::error(
                500,
                ErrorCode::UnexpectedError.as_str(),
                &ErrorCode::UnexpectedError.to_string(),
            );
        }
    };

    match flow::run(&ctx, &options, &request).await {
        Ok(success) => {
            let body = serde_json::json!({
                "token": success.token,
                "user": success.user,
            });
            let response = PluginHandlerResponse::ok(body);
            match &success.token {
                Some(token) => {
                    match session_cookie_header(&ctx.options, token, success.dont_remember) {
                        Ok(cookie) => response.with_set_cookie(cookie),
                        Err(e) => {
                            ctx.logger
                                .error(&format!("failed to issue session cookie: {e}"));
                            PluginHandlerResponse::error(
                                500,
                                ErrorCode::UnexpectedError.as_str(),
                                &ErrorCode::UnexpectedError.to_string(),
                            )
                        }
                    }
                }
                None => response,
            }
        }
        Err(err) => {
            let api = options.pass_through.resolve(err);
            if api.status.status_code() >= 500 {
                ctx.logger.error(&format!("sign-in failed: {api}"));
            } else {
                ctx.logger.debug(&format!("sign-in rejected: {api}"));
            }
            PluginHandlerResponse::error(api.status.status_code(), api.code.as_str(), &api.message)
        }
    }
}
