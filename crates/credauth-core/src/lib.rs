//! # credauth-core
//!
//! Contract types for the credauth credential sign-in plugin: the storage
//! adapter trait, typed models, the error taxonomy, the structured logger,
//! construction-time options, and the plugin interface that sign-in
//! providers implement.

pub mod db;
pub mod error;
pub mod logger;
pub mod options;
pub mod plugin;
pub mod utils;

// Re-exports for convenience
pub use db::adapter::{Adapter, WhereClause};
pub use db::models::{Account, Session, User};
pub use error::{ApiError, CoreError, ErrorCode, HttpStatus};
pub use logger::{AuthLogger, LogHandler, LogLevel, LoggerConfig};
pub use options::AuthOptions;
pub use plugin::{AuthPlugin, PluginEndpoint, PluginHandlerFn};
