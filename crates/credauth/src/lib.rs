//! # credauth
//!
//! Credential sign-in plugin for a pluggable auth framework. The caller
//! supplies a verification callback (password compare, LDAP bind, external
//! API); the plugin owns the decision procedure that signs up, signs in, or
//! links an authentication method, enforcing the invariants that keep
//! cross-provider credentials from colliding.
//!
//! ```no_run
//! use std::sync::Arc;
//! use credauth::context::AuthContext;
//! use credauth::credentials::{CredentialsOptions, CredentialsPlugin};
//! use credauth_core::options::AuthOptions;
//! use credauth_memory::MemoryAdapter;
//!
//! # fn callback() -> Arc<dyn credauth::credentials::VerifyCredentials> { unimplemented!() }
//! let ctx = AuthContext::new(
//!     AuthOptions::new("a-secret-that-is-at-least-32-chars!!"),
//!     Arc::new(MemoryAdapter::new()),
//! );
//! let plugin = CredentialsPlugin::new(
//!     CredentialsOptions::new(callback()).with_auto_sign_up(true),
//! );
//! ```

pub mod context;
pub mod cookies;
pub mod credentials;
pub mod internal_adapter;
pub mod verification;

pub use context::AuthContext;
pub use credentials::CredentialsPlugin;
pub use internal_adapter::{AdapterError, ConcreteInternalAdapter, InternalAdapter};
pub use verification::VerificationEmailSender;
