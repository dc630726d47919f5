//! Telegram bot integration and handlers

pub mod bot;
pub mod commands;
pub mod format;
pub mod keyboards;
pub mod notifications;
pub mod schema;
pub mod types;

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_commands, Command};
pub use schema::schema;
pub use types::{HandlerDeps, HandlerError};
