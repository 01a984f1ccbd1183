// The runtime context handed to plugin handlers.
//
// Built once at startup from the host options and a storage adapter; shared
// across requests as `Arc<AuthContext>`. Plugin handlers receive it
// type-erased as `Arc<dyn Any + Send + Sync>` and downcast it back.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use credauth_core::db::adapter::Adapter;
use credauth_core::logger::AuthLogger;
use credauth_core::options::AuthOptions;

use crate::internal_adapter::{ConcreteInternalAdapter, InternalAdapter};
use crate::verification::VerificationEmailSender;

/// Shared per-instance auth state.
pub struct AuthContext {
    pub options: AuthOptions,
    /// Raw storage adapter, for direct record lookups.
    pub database: Arc<dyn Adapter>,
    /// High-level persistence operations.
    pub adapter: Arc<dyn InternalAdapter>,
    pub logger: AuthLogger,
    /// Optional verification email dispatcher.
    pub email_sender: Option<Arc<dyn VerificationEmailSender>>,
}

impl AuthContext {
    pub fn new(options: AuthOptions, database: Arc<dyn Adapter>) -> Self {
        let adapter = Arc::new(ConcreteInternalAdapter::new(
            database.clone(),
            options.session.clone(),
        ));
        let logger = AuthLogger::new(options.logger.clone());
        Self {
            options,
            database,
            adapter,
            logger,
            email_sender: None,
        }
    }

    pub fn with_email_sender(mut self, sender: Arc<dyn VerificationEmailSender>) -> Self {
        self.email_sender = Some(sender);
        self
    }

    /// Recover the context from the type-erased handle plugin handlers get.
    pub fn from_any(ctx: Arc<dyn Any + Send + Sync>) -> Option<Arc<Self>> {
        ctx.downcast::<Self>().ok()
    }
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("base_path", &self.options.base_path)
            .field("has_email_sender", &self.email_sender.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use credauth_memory::MemoryAdapter;

    #[test]
    fn downcast_from_any() {
        let ctx = AuthContext::new(
            AuthOptions::new("test-secret-at-least-32-characters!!"),
            Arc::new(MemoryAdapter::new()),
        );
        let erased: Arc<dyn Any + Send + Sync> = Arc::new(ctx);
        let recovered = AuthContext::from_any(erased).unwrap();
        assert_eq!(recovered.options.base_path, "/api/auth");
    }
}
