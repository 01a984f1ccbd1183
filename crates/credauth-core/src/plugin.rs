// Plugin contract — how sign-in providers register endpoints on the host.
//
// Each plugin contributes one or more endpoints. Handlers are type-erased
// async functions taking an opaque context (`Arc<dyn Any>` — concretely the
// host's `AuthContext`) so this crate has no dependency on the runtime crate.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

use crate::error::ErrorCode;

/// The request context passed to a plugin handler.
#[derive(Debug, Clone, Default)]
pub struct PluginHandlerRequest {
    /// The request body (JSON). Empty object `{}` for GET requests.
    pub body: Value,
    /// Query parameters as a JSON object.
    pub query: Value,
    /// HTTP headers.
    pub headers: HashMap<String, String>,
}

impl PluginHandlerRequest {
    pub fn with_body(body: Value) -> Self {
        Self {
            body,
            ..Default::default()
        }
    }
}

/// The response returned by a plugin handler.
#[derive(Debug, Clone)]
pub struct PluginHandlerResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body (JSON).
    pub body: Value,
    /// Additional response headers to set (Set-Cookie included).
    pub headers: Vec<(String, String)>,
}

impl PluginHandlerResponse {
    /// A 200 OK response with a JSON body.
    pub fn ok(body: Value) -> Self {
        Self {
            status: 200,
            body,
            headers: Vec::new(),
        }
    }

    /// An error response with the given status and code.
    pub fn error(status: u16, code: &str, message: &str) -> Self {
        Self {
            status,
            body: serde_json::json!({
                "code": code,
                "message": message,
            }),
            headers: Vec::new(),
        }
    }

    /// Append a Set-Cookie header.
    pub fn with_set_cookie(mut self, value: String) -> Self {
        self.headers.push(("Set-Cookie".to_string(), value));
        self
    }
}

/// Type-erased async plugin handler function.
///
/// The context is `Arc<dyn Any + Send + Sync>` (concretely the runtime's
/// `AuthContext`) to avoid a circular dependency between the contract crate
/// and the runtime crate.
pub type PluginHandlerFn = Arc<
    dyn Fn(
            Arc<dyn std::any::Any + Send + Sync>,
            PluginHandlerRequest,
        ) -> Pin<Box<dyn Future<Output = PluginHandlerResponse> + Send>>
        + Send
        + Sync,
>;

/// HTTP methods for plugin endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

/// An API endpoint provided by a plugin.
pub struct PluginEndpoint {
    /// The route path (e.g. "/sign-in/credentials").
    pub path: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Documentation metadata (summary, description).
    pub metadata: HashMap<String, Value>,
    /// The handler function.
    pub handler: PluginHandlerFn,
}

impl PluginEndpoint {
    pub fn new(path: impl Into<String>, method: HttpMethod, handler: PluginHandlerFn) -> Self {
        Self {
            path: path.into(),
            method,
            metadata: HashMap::new(),
            handler,
        }
    }

    pub fn with_metadata(mut self, key: &str, value: Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }
}

impl Clone for PluginEndpoint {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            method: self.method,
            metadata: self.metadata.clone(),
            handler: self.handler.clone(),
        }
    }
}

impl fmt::Debug for PluginEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginEndpoint")
            .field("path", &self.path)
            .field("method", &self.method)
            .finish()
    }
}

/// The plugin trait sign-in providers implement.
pub trait AuthPlugin: Send + Sync + fmt::Debug {
    /// Unique identifier for this plugin (e.g. "credentials", "ldap").
    fn id(&self) -> &str;

    /// Human-readable plugin name.
    fn name(&self) -> &str {
        self.id()
    }

    /// The endpoints this plugin registers on the host router.
    fn endpoints(&self) -> Vec<PluginEndpoint>;

    /// Error codes this plugin can surface.
    fn error_codes(&self) -> Vec<ErrorCode> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_builders() {
        let ok = PluginHandlerResponse::ok(serde_json::json!({"token": "t"}));
        assert_eq!(ok.status, 200);
        assert!(ok.headers.is_empty());

        let err = PluginHandlerResponse::error(401, "INVALID_CREDENTIALS", "invalid credentials");
        assert_eq!(err.status, 401);
        assert_eq!(err.body["code"], "INVALID_CREDENTIALS");

        let with_cookie = ok.with_set_cookie("credauth.session_token=abc".into());
        assert_eq!(with_cookie.headers.len(), 1);
        assert_eq!(with_cookie.headers[0].0, "Set-Cookie");
    }

    #[test]
    fn endpoint_metadata() {
        let handler: PluginHandlerFn = Arc::new(|_ctx, _req| {
            Box::pin(async { PluginHandlerResponse::ok(serde_json::json!({})) })
        });
        let endpoint = PluginEndpoint::new("/sign-in/credentials", HttpMethod::Post, handler)
            .with_metadata("summary", serde_json::json!("Sign in with credentials"));
        assert_eq!(endpoint.path, "/sign-in/credentials");
        assert_eq!(
            endpoint.metadata["summary"],
            serde_json::json!("Sign in with credentials")
        );
    }
}
