//! In-memory storage adapter, intended for tests and local development.

mod adapter;

pub use adapter::MemoryAdapter;
