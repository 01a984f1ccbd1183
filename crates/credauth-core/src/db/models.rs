// Typed views of the host-owned tables the sign-in flow touches.
//
// Records are stored and queried as `serde_json::Value`; these structs are
// the camelCase wire shapes used at the API edge. Plugin-defined extension
// fields ride along in `extra`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A local user. Created by the sign-up branch, field-merged on sign-in,
/// never deleted by this plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub email_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Extension fields merged in by verification callbacks.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl User {
    pub fn new(id: String, name: String, email: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            email: email.to_lowercase(),
            email_verified: false,
            image: None,
            created_at: now,
            updated_at: now,
            extra: serde_json::Map::new(),
        }
    }
}

/// One authentication method bound to a user.
///
/// At most one account per (`userId`, `providerId`) pair is canonical. An
/// account with `providerId == "credential"` and a non-null `password`
/// belongs to the host's native email/password flow and is off-limits to
/// the credentials plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    /// Provider-specific identifier; defaults to the owning user's id.
    pub account_id: String,
    /// Provider discriminator, e.g. "credential" or "ldap".
    pub provider_id: String,
    pub user_id: String,
    /// Hashed password — only present on native email/password accounts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Extra fields supplied by an `on_link_account` hook.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// An authenticated session issued by the host framework.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_new_lowercases_email() {
        let user = User::new("u1".into(), "Alice".into(), "Alice@Example.COM".into());
        assert_eq!(user.email, "alice@example.com");
        assert!(!user.email_verified);
    }

    #[test]
    fn user_extra_fields_flatten() {
        let mut user = User::new("u1".into(), "Alice".into(), "a@x.com".into());
        user.extra
            .insert("department".into(), serde_json::json!("engineering"));
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["department"], "engineering");
        assert_eq!(value["emailVerified"], false);
    }

    #[test]
    fn account_password_omitted_when_absent() {
        let account = Account {
            id: "a1".into(),
            account_id: "u1".into(),
            provider_id: "ldap".into(),
            user_id: "u1".into(),
            password: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            extra: serde_json::Map::new(),
        };
        let value = serde_json::to_value(&account).unwrap();
        assert!(value.get("password").is_none());
        assert_eq!(value["providerId"], "ldap");
    }
}
