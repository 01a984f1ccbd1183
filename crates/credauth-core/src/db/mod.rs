pub mod adapter;
pub mod models;

pub use adapter::{Adapter, AdapterResult, FindManyQuery, Operator, WhereClause};
pub use models::{Account, Session, User};
