// The credential sign-in state machine.
//
// VALIDATE -> VERIFY_CALLBACK -> RESOLVE_EMAIL -> FIND_USER
//   FIND_USER = none & !auto_sign_up -> FAIL(INVALID_CREDENTIALS)
//   FIND_USER = none & auto_sign_up  -> SIGN_UP -> [early return on pending
//     verification] -> CREATE_ACCOUNT -> FINALIZE
//   FIND_USER = found & unverified & required -> FAIL(EMAIL_NOT_VERIFIED)
//   FIND_USER = found -> SIGN_IN -> FIND_ACCOUNT -> {FAIL | defer link}
//     -> ON_SIGN_IN -> link if deferred -> UPDATE_USER -> FINALIZE
// FINALIZE -> CREATE_SESSION -> RETURN {token, user}
//
// Steps run strictly sequentially; no step starts before its predecessor's
// result is known. All failures close with no session side effects.

use serde_json::Value;

use credauth_core::error::{ApiError, CoreError, ErrorCode, HttpStatus};
use credauth_core::plugin::PluginHandlerRequest;

use crate::context::AuthContext;
use crate::internal_adapter::parse_user_output;

use super::callback::CallbackOutcome;
use super::error::FlowError;
use super::options::{CredentialsOptions, CREDENTIAL_PROVIDER_ID};

/// Successful terminal state of the flow.
#[derive(Debug)]
pub struct SignInSuccess {
    /// `None` only in the pending-email-verification early return.
    pub token: Option<String>,
    /// Public user projection (no password fields).
    pub user: Value,
    /// Whether the session cookie should be a browser-session cookie.
    pub dont_remember: bool,
}

pub async fn run(
    ctx: &AuthContext,
    options: &CredentialsOptions,
    request: &PluginHandlerRequest,
) -> Result<SignInSuccess, FlowError> {
    // VALIDATE
    let parsed = options.input_schema.parse(&request.body).map_err(|e| {
        FlowError::direct(ApiError::with_message(
            HttpStatus::UnprocessableEntity,
            ErrorCode::Validation,
            e.to_string(),
        ))
    })?;

    // VERIFY_CALLBACK
    let outcome = match options.callback.verify(ctx, &parsed).await {
        Ok(Some(outcome)) => outcome,
        Ok(None) => {
            return Err(FlowError::downgraded(CoreError::Other(
                "verification callback returned no identity".into(),
            )));
        }
        Err(original) => return Err(FlowError::downgraded(original)),
    };

    // RESOLVE_EMAIL
    let email = outcome
        .email
        .clone()
        .or_else(|| parsed.get("email").and_then(Value::as_str).map(String::from))
        .ok_or_else(|| FlowError::direct(ApiError::unprocessable(ErrorCode::EmailRequired)))?
        .to_lowercase();

    // FIND_USER
    let existing = ctx
        .adapter
        .find_user_by_email(&email)
        .await
        .map_err(|e| internal_error(ctx, ErrorCode::UnexpectedError, &e.to_string()))?;

    // Only an explicit `rememberMe: true` opts into the long-lived session.
    let dont_remember = !matches!(parsed.get("rememberMe"), Some(Value::Bool(true)));

    let finalized = match existing {
        None if !options.auto_sign_up => {
            return Err(FlowError::downgraded_api(ApiError::unauthorized(
                ErrorCode::UserNotFound,
            )));
        }
        None => sign_up(ctx, options, &outcome, &email).await?,
        Some(user) => sign_in(ctx, options, &outcome, user, &email).await?,
    };

    let user = match finalized {
        Branch::PendingVerification(user) => {
            return Ok(SignInSuccess {
                token: None,
                user: parse_user_output(user),
                dont_remember,
            });
        }
        Branch::Resolved(user) => user,
    };

    // FINALIZE
    let user_id = user
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| internal_error(ctx, ErrorCode::UnexpectedError, "user record has no id"))?;
    let session = ctx
        .adapter
        .create_session(user_id, dont_remember)
        .await
        .map_err(|e| internal_error(ctx, ErrorCode::FailedToCreateSession, &e.to_string()))?;
    let token = session
        .get("token")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            internal_error(ctx, ErrorCode::FailedToCreateSession, "session has no token")
        })?
        .to_string();

    Ok(SignInSuccess {
        token: Some(token),
        user: parse_user_output(user),
        dont_remember,
    })
}

enum Branch {
    /// User resolved; continue to session creation.
    Resolved(Value),
    /// Sign-up succeeded but email verification is pending; no session.
    PendingVerification(Value),
}

async fn sign_up(
    ctx: &AuthContext,
    options: &CredentialsOptions,
    outcome: &CallbackOutcome,
    email: &str,
) -> Result<Branch, FlowError> {
    // The hook sees the resolved email alongside the callback's fields;
    // what it returns is stripped of `email` before persisting.
    let mut user_data = if let Some(hook) = &outcome.on_sign_up {
        let mut hook_input = outcome.user_data.clone();
        hook_input.insert("email".to_string(), Value::String(email.to_string()));
        match hook.on_sign_up(hook_input).await {
            Ok(Some(data)) => strip_email(data),
            Ok(None) => {
                return Err(FlowError::downgraded_api(ApiError::unauthorized(
                    ErrorCode::NoUserDataProvided,
                )));
            }
            Err(original) => return Err(FlowError::downgraded(original)),
        }
    } else {
        strip_email(outcome.user_data.clone())
    };

    // Computed name fallback: local part of the email
    if !user_data.contains_key("name") {
        let local = email.split('@').next().unwrap_or(email);
        user_data.insert("name".to_string(), Value::String(local.to_string()));
    }
    user_data.insert("email".to_string(), Value::String(email.to_string()));
    user_data.insert("emailVerified".to_string(), Value::Bool(false));

    let user = ctx
        .adapter
        .create_user(Value::Object(user_data))
        .await
        .map_err(|e| internal_error(ctx, ErrorCode::FailedToCreateUser, &e.to_string()))?;

    // The account exists either way; only the session waits on verification.
    link_account(ctx, options, outcome, &user).await?;

    let verification_required = ctx.options.email_and_password.require_email_verification;
    if verification_required || ctx.options.email_verification.send_on_sign_up {
        dispatch_verification_email(ctx, &user).await;
    }
    if verification_required {
        return Ok(Branch::PendingVerification(user));
    }

    Ok(Branch::Resolved(user))
}

async fn sign_in(
    ctx: &AuthContext,
    options: &CredentialsOptions,
    outcome: &CallbackOutcome,
    user: Value,
    email: &str,
) -> Result<Branch, FlowError> {
    // Verification gate runs before any account or session work
    let verified = user
        .get("emailVerified")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if ctx.options.email_and_password.require_email_verification && !verified {
        dispatch_verification_email(ctx, &user).await;
        return Err(FlowError::direct(ApiError::forbidden(
            ErrorCode::EmailNotVerified,
        )));
    }

    let user_id = user
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| internal_error(ctx, ErrorCode::UnexpectedError, "user record has no id"))?
        .to_string();

    // FIND_ACCOUNT
    let account = ctx
        .adapter
        .find_account(&user_id, &options.provider_id)
        .await
        .map_err(|e| internal_error(ctx, ErrorCode::UnexpectedError, &e.to_string()))?;

    let link_deferred = match &account {
        Some(account) => {
            // A credential-provider account carrying a password hash belongs
            // to the host's native email/password flow; this plugin never
            // verifies that password, so it must refuse the sign-in.
            let has_password = account
                .get("password")
                .map(|p| !p.is_null())
                .unwrap_or(false);
            let provider = account.get("providerId").and_then(Value::as_str);
            if provider == Some(CREDENTIAL_PROVIDER_ID) && has_password {
                return Err(FlowError::downgraded_api(ApiError::unauthorized(
                    ErrorCode::AccountHasPassword,
                )));
            }
            false
        }
        None => {
            if !options.auto_sign_up || !options.link_account_if_existing {
                return Err(FlowError::downgraded_api(ApiError::unauthorized(
                    ErrorCode::AccountNotFound,
                )));
            }
            // Link after on_sign_in succeeds so a veto can't orphan an account
            true
        }
    };

    // ON_SIGN_IN: the hook sees the resolved email, but it is stripped
    // from whatever the hook hands back before the merge.
    let user_data = if let Some(hook) = &outcome.on_sign_in {
        let mut hook_input = outcome.user_data.clone();
        hook_input.insert("email".to_string(), Value::String(email.to_string()));
        match hook.on_sign_in(hook_input, &user, account.as_ref()).await {
            Ok(Some(data)) => strip_email(data),
            Ok(None) => {
                return Err(FlowError::downgraded_api(ApiError::unauthorized(
                    ErrorCode::NoUserDataProvided,
                )));
            }
            Err(original) => return Err(FlowError::downgraded(original)),
        }
    } else {
        strip_email(outcome.user_data.clone())
    };

    if link_deferred {
        link_account(ctx, options, outcome, &user).await?;
    }

    // UPDATE_USER: shallow field merge, only when the hook/callback left
    // something to persist
    let user = if user_data.is_empty() {
        user
    } else {
        ctx.adapter
            .update_user(&user_id, Value::Object(user_data))
            .await
            .map_err(|e| internal_error(ctx, ErrorCode::UnexpectedError, &e.to_string()))?
    };

    Ok(Branch::Resolved(user))
}

/// Create the provider account for a user. `on_link_account` failures are
/// not downgraded: the user already exists and partial state should surface
/// loudly.
async fn link_account(
    ctx: &AuthContext,
    options: &CredentialsOptions,
    outcome: &CallbackOutcome,
    user: &Value,
) -> Result<(), FlowError> {
    let user_id = user
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| internal_error(ctx, ErrorCode::UnexpectedError, "user record has no id"))?;

    let mut data = serde_json::Map::new();
    if let Some(hook) = &outcome.on_link_account {
        let extra = hook.on_link_account(user).await.map_err(|e| {
            internal_error(ctx, ErrorCode::UnexpectedError, &e.to_string())
        })?;
        data.extend(extra);
    }
    data.insert("userId".to_string(), Value::String(user_id.to_string()));
    data.insert(
        "providerId".to_string(),
        Value::String(options.provider_id.clone()),
    );
    data.entry("accountId".to_string())
        .or_insert_with(|| Value::String(user_id.to_string()));

    ctx.adapter
        .link_account(Value::Object(data))
        .await
        .map_err(|e| internal_error(ctx, ErrorCode::UnexpectedError, &e.to_string()))?;
    Ok(())
}

/// Email is an identity field, not a free-form attribute; hooks get to read
/// it, but it never rides in through the merge set.
fn strip_email(mut data: serde_json::Map<String, Value>) -> serde_json::Map<String, Value> {
    data.remove("email");
    data
}

async fn dispatch_verification_email(ctx: &AuthContext, user: &Value) {
    if let Some(sender) = &ctx.email_sender {
        if let Err(e) = sender.send_verification_email(user).await {
            ctx.logger
                .error(&format!("verification email dispatch failed: {e}"));
        }
    }
}

fn internal_error(ctx: &AuthContext, code: ErrorCode, detail: &str) -> FlowError {
    ctx.logger.error(&format!("sign-in flow failed: {detail}"));
    FlowError::direct(ApiError::internal(code))
}
