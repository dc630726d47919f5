//! Pairscope - Telegram bot proxying the DexScreener pair API
//!
//! This library provides all the functionality of the Pairscope bot:
//! DexScreener queries, per-user state persistence, and the Telegram
//! keyboard protocol for paging and detail toggling.
//!
//! # Module Structure
//!
//! - `core`: Configuration, errors, and logging
//! - `storage`: SQLite pool and the per-user key-value store
//! - `dex`: DexScreener HTTP client, payload types, and the filter suffix
//! - `telegram`: Bot integration, handlers, and rendering

pub mod core;
pub mod dex;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use core::{config, init_logger, AppError, AppResult};
pub use dex::{DexClient, TokenPair};
pub use storage::{create_pool, DbConnection, DbPool, UserStore};
pub use telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};
