//! Database and per-user state storage

pub mod db;
pub mod store;

// Re-exports for convenience
pub use db::{create_pool, get_connection, DbConnection, DbPool, Table};
pub use store::UserStore;
