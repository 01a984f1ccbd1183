// LDAP transport: admin bind, user search, user bind.
//
// The connector is a trait so tests can run against a mock directory; the
// real implementation drives `ldap3`. Sequence per authentication attempt:
// connect, bind as the service account, search for the user entry under the
// base DN, then bind as the found entry with the submitted password.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use ldap3::{LdapConnAsync, LdapConnSettings, Scope, SearchEntry};

/// Connection parameters for the directory.
#[derive(Clone)]
pub struct LdapConnection {
    /// Directory URL, `ldap://` or `ldaps://`.
    pub url: String,
    /// Service account DN used for the search bind.
    pub admin_dn: String,
    pub admin_password: String,
    /// Subtree searched for user entries.
    pub base_dn: String,
    /// Attribute matched against the submitted username (default: "uid").
    pub username_attribute: String,
    pub connect_timeout: Duration,
    /// Verify the server certificate on `ldaps://` connections.
    pub verify_certificates: bool,
}

impl LdapConnection {
    pub fn new(
        url: impl Into<String>,
        admin_dn: impl Into<String>,
        admin_password: impl Into<String>,
        base_dn: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            admin_dn: admin_dn.into(),
            admin_password: admin_password.into(),
            base_dn: base_dn.into(),
            username_attribute: "uid".to_string(),
            connect_timeout: Duration::from_millis(5000),
            verify_certificates: true,
        }
    }
}

impl fmt::Debug for LdapConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LdapConnection")
            .field("url", &self.url)
            .field("admin_dn", &self.admin_dn)
            .field("admin_password", &"<redacted>")
            .field("base_dn", &self.base_dn)
            .field("username_attribute", &self.username_attribute)
            .finish()
    }
}

/// A directory entry returned by a successful bind.
#[derive(Debug, Clone)]
pub struct LdapEntry {
    pub dn: String,
    pub attributes: HashMap<String, Vec<String>>,
}

impl LdapEntry {
    /// First value of an attribute, when present.
    pub fn first(&self, attribute: &str) -> Option<&str> {
        self.attributes
            .get(attribute)
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}

/// Directory-side failures. Messages never carry submitted passwords.
#[derive(Debug, thiserror::Error)]
pub enum LdapError {
    #[error("failed to connect to the directory: {0}")]
    Connect(String),

    #[error("service account bind failed: {0}")]
    AdminBind(String),

    #[error("directory search failed: {0}")]
    Search(String),

    #[error("no directory entry matched the username")]
    UserNotFound,

    #[error("user bind rejected by the directory")]
    InvalidCredentials,
}

/// The transport the LDAP verifier authenticates through.
#[async_trait]
pub trait LdapConnector: Send + Sync {
    /// Authenticate a username/password pair, returning the bound entry's
    /// attributes on success.
    async fn authenticate(
        &self,
        connection: &LdapConnection,
        username: &str,
        password: &str,
    ) -> Result<LdapEntry, LdapError>;
}

/// Connector backed by the `ldap3` client.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ldap3Connector;

#[async_trait]
impl LdapConnector for Ldap3Connector {
    async fn authenticate(
        &self,
        connection: &LdapConnection,
        username: &str,
        password: &str,
    ) -> Result<LdapEntry, LdapError> {
        let settings = LdapConnSettings::new()
            .set_conn_timeout(connection.connect_timeout)
            .set_no_tls_verify(!connection.verify_certificates);

        let (conn, mut ldap) = LdapConnAsync::with_settings(settings, &connection.url)
            .await
            .map_err(|e| LdapError::Connect(e.to_string()))?;
        ldap3::drive!(conn);

        ldap.simple_bind(&connection.admin_dn, &connection.admin_password)
            .await
            .and_then(|res| res.success())
            .map_err(|e| LdapError::AdminBind(e.to_string()))?;

        let filter = format!(
            "({}={})",
            connection.username_attribute,
            ldap3::ldap_escape(username)
        );
        let (entries, _) = ldap
            .search(&connection.base_dn, Scope::Subtree, &filter, vec!["*"])
            .await
            .and_then(|res| res.success())
            .map_err(|e| LdapError::Search(e.to_string()))?;

        let entry = entries
            .into_iter()
            .next()
            .map(SearchEntry::construct)
            .ok_or(LdapError::UserNotFound)?;

        // Rebind as the found entry to verify the submitted password
        ldap.simple_bind(&entry.dn, password)
            .await
            .and_then(|res| res.success())
            .map_err(|_| LdapError::InvalidCredentials)?;

        let _ = ldap.unbind().await;

        Ok(LdapEntry {
            dn: entry.dn,
            attributes: entry.attrs,
        })
    }
}
