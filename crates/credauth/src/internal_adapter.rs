// Higher-level persistence operations built on top of the raw Adapter trait.
//
// The sign-in flow never touches model names or timestamps directly; it goes
// through this trait for every mutation. Records travel as
// `serde_json::Value` with camelCase keys, matching the typed models in
// credauth-core.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use credauth_core::db::adapter::{Adapter, WhereClause};
use credauth_core::db::models::{Account, Session, User};
use credauth_core::error::CoreError;
use credauth_core::options::SessionOptions;
use credauth_core::utils::{generate_id, generate_random_string};

/// Length of generated session tokens.
const SESSION_TOKEN_LENGTH: usize = 32;

/// Errors from the internal adapter.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Record not found")]
    NotFound,

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<CoreError> for AdapterError {
    fn from(e: CoreError) -> Self {
        Self::Database(e.to_string())
    }
}

impl From<AdapterError> for CoreError {
    fn from(e: AdapterError) -> Self {
        CoreError::Database(e.to_string())
    }
}

/// High-level persistence operations the sign-in flow uses.
///
/// Each method is a single-record operation that returns the persisted
/// record or fails. Uniqueness constraint violations surface as
/// `AdapterError::Database`.
#[async_trait]
pub trait InternalAdapter: Send + Sync {
    /// Create a new user, filling in id and timestamps.
    async fn create_user(&self, data: Value) -> Result<Value, AdapterError>;

    /// Find a user by email. The caller is responsible for lowercasing.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<Value>, AdapterError>;

    /// Shallow-merge fields into an existing user.
    async fn update_user(&self, id: &str, data: Value) -> Result<Value, AdapterError>;

    /// Find the account for a (user, provider) pair.
    async fn find_account(
        &self,
        user_id: &str,
        provider_id: &str,
    ) -> Result<Option<Value>, AdapterError>;

    /// Link an authentication method to a user (create an account record).
    async fn link_account(&self, data: Value) -> Result<Value, AdapterError>;

    /// Create a session for a user. `dont_remember` selects the short TTL
    /// and marks the session for a browser-session cookie.
    async fn create_session(
        &self,
        user_id: &str,
        dont_remember: bool,
    ) -> Result<Value, AdapterError>;
}

/// Strip internal fields from a user record before it crosses the endpoint
/// boundary. Password hashes must never appear in responses.
pub fn parse_user_output(mut user: Value) -> Value {
    if let Some(obj) = user.as_object_mut() {
        obj.remove("password");
    }
    user
}

/// Concrete internal adapter backed by a raw `Adapter`.
///
/// Translates the high-level operations into raw CRUD calls against the
/// "user", "account", and "session" models.
#[derive(Debug)]
pub struct ConcreteInternalAdapter {
    adapter: Arc<dyn Adapter>,
    session: SessionOptions,
}

impl ConcreteInternalAdapter {
    pub fn new(adapter: Arc<dyn Adapter>, session: SessionOptions) -> Self {
        Self { adapter, session }
    }
}

fn now_rfc3339() -> Value {
    Value::String(chrono::Utc::now().to_rfc3339())
}

/// Ensure id/createdAt/updatedAt are present on a record about to be created.
fn stamp_new_record(data: &mut Value) {
    if let Some(obj) = data.as_object_mut() {
        let needs_id = obj.get("id").map(|v| v.is_null()).unwrap_or(true);
        if needs_id {
            obj.insert("id".to_string(), Value::String(generate_id()));
        }
        obj.entry("createdAt".to_string()).or_insert_with(now_rfc3339);
        obj.entry("updatedAt".to_string()).or_insert_with(now_rfc3339);
    }
}

#[async_trait]
impl InternalAdapter for ConcreteInternalAdapter {
    async fn create_user(&self, mut data: Value) -> Result<Value, AdapterError> {
        stamp_new_record(&mut data);
        if let Some(obj) = data.as_object_mut() {
            obj.entry("emailVerified".to_string())
                .or_insert(Value::Bool(false));
        }
        // Round-trip through the typed model so a malformed record fails
        // here instead of surfacing as a corrupt row later.
        let user: User =
            serde_json::from_value(data).map_err(|e| AdapterError::Serialization(e.to_string()))?;
        let record = serde_json::to_value(&user)
            .map_err(|e| AdapterError::Serialization(e.to_string()))?;
        Ok(self.adapter.create("user", record).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<Value>, AdapterError> {
        Ok(self
            .adapter
            .find_one("user", &[WhereClause::eq("email", email)])
            .await?)
    }

    async fn update_user(&self, id: &str, mut data: Value) -> Result<Value, AdapterError> {
        if let Some(obj) = data.as_object_mut() {
            obj.insert("updatedAt".to_string(), now_rfc3339());
        }
        self.adapter
            .update("user", &[WhereClause::eq("id", id)], data)
            .await?
            .ok_or(AdapterError::NotFound)
    }

    async fn find_account(
        &self,
        user_id: &str,
        provider_id: &str,
    ) -> Result<Option<Value>, AdapterError> {
        Ok(self
            .adapter
            .find_one(
                "account",
                &[
                    WhereClause::eq("userId", user_id).and(),
                    WhereClause::eq("providerId", provider_id),
                ],
            )
            .await?)
    }

    async fn link_account(&self, mut data: Value) -> Result<Value, AdapterError> {
        stamp_new_record(&mut data);
        let account: Account =
            serde_json::from_value(data).map_err(|e| AdapterError::Serialization(e.to_string()))?;
        let record = serde_json::to_value(&account)
            .map_err(|e| AdapterError::Serialization(e.to_string()))?;
        Ok(self.adapter.create("account", record).await?)
    }

    async fn create_session(
        &self,
        user_id: &str,
        dont_remember: bool,
    ) -> Result<Value, AdapterError> {
        let ttl_seconds = if dont_remember {
            self.session.dont_remember_expires_in
        } else {
            self.session.expires_in
        };
        let now = chrono::Utc::now();
        let session = Session {
            id: generate_id(),
            token: generate_random_string(SESSION_TOKEN_LENGTH),
            expires_at: now + chrono::Duration::seconds(ttl_seconds as i64),
            user_id: user_id.to_string(),
            ip_address: None,
            user_agent: None,
            created_at: now,
            updated_at: now,
        };
        let record = serde_json::to_value(&session)
            .map_err(|e| AdapterError::Serialization(e.to_string()))?;
        Ok(self.adapter.create("session", record).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use credauth_memory::MemoryAdapter;

    fn internal() -> ConcreteInternalAdapter {
        ConcreteInternalAdapter::new(Arc::new(MemoryAdapter::new()), SessionOptions::default())
    }

    #[tokio::test]
    async fn create_user_fills_defaults() {
        let adapter = internal();
        let user = adapter
            .create_user(serde_json::json!({"name": "Alice", "email": "alice@x.com"}))
            .await
            .unwrap();
        assert!(user["id"].is_string());
        assert_eq!(user["emailVerified"], false);
        assert!(user["createdAt"].is_string());
    }

    #[tokio::test]
    async fn create_user_keeps_extension_fields() {
        let adapter = internal();
        let user = adapter
            .create_user(serde_json::json!({
                "name": "Alice", "email": "alice@x.com", "department": "engineering",
            }))
            .await
            .unwrap();
        assert_eq!(user["department"], "engineering");
    }

    #[tokio::test]
    async fn create_user_rejects_malformed_records() {
        let adapter = internal();
        let err = adapter
            .create_user(serde_json::json!({"email": "no-name@x.com", "name": 7}))
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::Serialization(_)));
    }

    #[tokio::test]
    async fn update_user_missing_is_not_found() {
        let adapter = internal();
        let err = adapter
            .update_user("nope", serde_json::json!({"name": "x"}))
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::NotFound));
    }

    #[tokio::test]
    async fn find_account_by_user_and_provider() {
        let adapter = internal();
        adapter
            .link_account(serde_json::json!({
                "userId": "u1", "providerId": "ldap", "accountId": "u1",
            }))
            .await
            .unwrap();

        let found = adapter.find_account("u1", "ldap").await.unwrap();
        assert!(found.is_some());
        assert!(adapter.find_account("u1", "credential").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn session_ttl_honors_dont_remember() {
        let adapter = internal();
        let long = adapter.create_session("u1", false).await.unwrap();
        let short = adapter.create_session("u1", true).await.unwrap();

        let parse = |s: &Value| {
            chrono::DateTime::parse_from_rfc3339(s["expiresAt"].as_str().unwrap()).unwrap()
        };
        assert!(parse(&long) > parse(&short));
        assert_eq!(long["token"].as_str().unwrap().len(), 32);
        assert_ne!(long["token"], short["token"]);
    }

    #[test]
    fn parse_user_output_strips_password() {
        let user = serde_json::json!({"id": "u1", "email": "a@x.com", "password": "hash"});
        let public = parse_user_output(user);
        assert!(public.get("password").is_none());
        assert_eq!(public["id"], "u1");
    }
}
