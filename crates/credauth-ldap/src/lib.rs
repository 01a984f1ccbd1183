//! # credauth-ldap
//!
//! LDAP-backed variant of the credential sign-in plugin. The directory is
//! the verification callback: the plugin binds a service account, searches
//! for the user entry, rebinds as that entry with the submitted password,
//! and on success feeds the entry's attributes into the credential sign-in
//! flow under the `"ldap"` provider id.
//!
//! ```no_run
//! use credauth_ldap::{ldap, LdapOptions};
//!
//! let plugin = ldap(
//!     LdapOptions::new(
//!         "ldaps://directory.corp:636",
//!         "cn=service,dc=corp,dc=com",
//!         "service-password",
//!         "ou=people,dc=corp,dc=com",
//!     )
//!     .with_auto_sign_up(true),
//! );
//! ```

pub mod connector;
pub mod schema;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use credauth::context::AuthContext;
use credauth::credentials::{
    CallbackOutcome, CredentialsOptions, CredentialsPlugin, PassThrough, VerifyCredentials,
};
use credauth_core::error::{CoreError, Result as CoreResult};

use connector::{Ldap3Connector, LdapConnection, LdapConnector, LdapEntry};
use schema::{default_username_validator, LdapSignInSchema, UsernameValidator};

/// Maps a bound directory entry to extra user fields to persist.
pub type AttributeMapper =
    Arc<dyn Fn(&LdapEntry) -> serde_json::Map<String, Value> + Send + Sync>;

/// Configuration for the LDAP sign-in plugin.
pub struct LdapOptions {
    pub connection: LdapConnection,
    /// Domain appended to the username when the entry has no `mail`
    /// attribute (default: "ldap.local").
    pub email_domain: String,
    pub auto_sign_up: bool,
    pub link_account_if_existing: bool,
    pub path: String,
    pub username_validator: Option<UsernameValidator>,
    /// Folds directory attributes into the user record on sign-up/sign-in.
    pub map_attributes: Option<AttributeMapper>,
    pub pass_through: PassThrough,
    /// Transport override, used by tests to run against a mock directory.
    pub connector: Option<Arc<dyn LdapConnector>>,
}

impl LdapOptions {
    pub fn new(
        url: impl Into<String>,
        admin_dn: impl Into<String>,
        admin_password: impl Into<String>,
        base_dn: impl Into<String>,
    ) -> Self {
        Self {
            connection: LdapConnection::new(url, admin_dn, admin_password, base_dn),
            email_domain: "ldap.local".to_string(),
            auto_sign_up: false,
            link_account_if_existing: false,
            path: "/sign-in/ldap".to_string(),
            username_validator: None,
            map_attributes: None,
            pass_through: PassThrough::None,
            connector: None,
        }
    }

    pub fn with_username_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.connection.username_attribute = attribute.into();
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connection.connect_timeout = timeout;
        self
    }

    pub fn with_email_domain(mut self, domain: impl Into<String>) -> Self {
        self.email_domain = domain.into();
        self
    }

    pub fn with_auto_sign_up(mut self, enabled: bool) -> Self {
        self.auto_sign_up = enabled;
        self
    }

    pub fn with_link_account_if_existing(mut self, enabled: bool) -> Self {
        self.link_account_if_existing = enabled;
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_username_validator(mut self, validator: UsernameValidator) -> Self {
        self.username_validator = Some(validator);
        self
    }

    pub fn with_attribute_mapper(mut self, mapper: AttributeMapper) -> Self {
        self.map_attributes = Some(mapper);
        self
    }

    pub fn with_pass_through(mut self, policy: PassThrough) -> Self {
        self.pass_through = policy;
        self
    }

    pub fn with_connector(mut self, connector: Arc<dyn LdapConnector>) -> Self {
        self.connector = Some(connector);
        self
    }
}

/// Build the LDAP sign-in plugin.
pub fn ldap(options: LdapOptions) -> CredentialsPlugin {
    let validator: UsernameValidator = options
        .username_validator
        .unwrap_or_else(|| Arc::new(default_username_validator));
    let connector: Arc<dyn LdapConnector> = options
        .connector
        .unwrap_or_else(|| Arc::new(Ldap3Connector));

    let verifier = LdapVerifier {
        connection: options.connection,
        connector,
        email_domain: options.email_domain,
        map_attributes: options.map_attributes,
    };

    let credentials = CredentialsOptions::new(Arc::new(verifier))
        .with_input_schema(Arc::new(LdapSignInSchema::new(validator)))
        .with_provider_id("ldap")
        .with_path(options.path)
        .with_auto_sign_up(options.auto_sign_up)
        .with_link_account_if_existing(options.link_account_if_existing)
        .with_pass_through(options.pass_through);

    CredentialsPlugin::with_id("ldap", credentials)
}

/// Verification callback that authenticates against the directory.
struct LdapVerifier {
    connection: LdapConnection,
    connector: Arc<dyn LdapConnector>,
    email_domain: String,
    map_attributes: Option<AttributeMapper>,
}

#[async_trait]
impl VerifyCredentials for LdapVerifier {
    async fn verify(
        &self,
        _ctx: &AuthContext,
        input: &Value,
    ) -> CoreResult<Option<CallbackOutcome>> {
        let username = input
            .get("username")
            .and_then(Value::as_str)
            .ok_or_else(|| CoreError::Other("validated input has no username".into()))?;
        let password = input
            .get("password")
            .and_then(Value::as_str)
            .ok_or_else(|| CoreError::Other("validated input has no password".into()))?;

        let entry = self
            .connector
            .authenticate(&self.connection, username, password)
            .await
            .map_err(|e| CoreError::Verification(e.to_string()))?;

        let email = entry
            .first("mail")
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}@{}", username.to_lowercase(), self.email_domain));
        let name = entry
            .first("displayName")
            .or_else(|| entry.first("cn"))
            .unwrap_or(username)
            .to_string();

        let mut outcome = CallbackOutcome::new()
            .with_email(email)
            .with_user_field("name", name);
        if let Some(mapper) = &self.map_attributes {
            outcome.user_data.extend(mapper(&entry));
        }
        Ok(Some(outcome))
    }
}
