use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Configuration constants for the bot
///
/// Environment variables are read once at startup. The bot token itself is
/// read by teloxide from `TELOXIDE_TOKEN`.

/// Path to the SQLite database file
pub static DATABASE_PATH: Lazy<String> =
    Lazy::new(|| env::var("DATABASE_PATH").unwrap_or_else(|_| "pairscope.sqlite".to_string()));

/// Path to the log file
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "pairscope.log".to_string()));

/// Public webhook URL. When unset the bot falls back to long polling.
pub static WEBHOOK_URL: Lazy<Option<String>> = Lazy::new(|| env::var("WEBHOOK_URL").ok());

/// Secret token Telegram echoes back in webhook requests
pub static WEBHOOK_SECRET: Lazy<Option<String>> = Lazy::new(|| env::var("SECRET_TOKEN").ok());

/// Address the webhook HTTP server binds to
pub static HOST: Lazy<String> = Lazy::new(|| env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()));

/// Port the webhook HTTP server binds to
pub static PORT: Lazy<u16> = Lazy::new(|| {
    env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080)
});

/// Chat ids that receive error reports (comma-separated in the env)
pub static DEVELOPER_CHAT_IDS: Lazy<Vec<i64>> = Lazy::new(|| {
    env::var("DEVELOPER_CHAT_IDS")
        .unwrap_or_default()
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect()
});

/// DEX data provider configuration
pub mod dex {
    use super::{env, Lazy};

    /// Base URL of the DexScreener latest/dex API
    pub static API_URL: Lazy<String> = Lazy::new(|| {
        env::var("DEX_API_URL").unwrap_or_else(|_| "https://api.dexscreener.com/latest/dex".to_string())
    });
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for outbound HTTP requests (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}
