//! DEX data provider integration (DexScreener API)

pub mod client;
pub mod filter;
pub mod types;

// Re-exports for convenience
pub use client::DexClient;
pub use types::TokenPair;
