//! Shared handler dependencies

use std::sync::Arc;

use crate::dex::DexClient;
use crate::storage::UserStore;

/// Dependencies threaded through every handler endpoint
#[derive(Clone)]
pub struct HandlerDeps {
    pub store: Arc<UserStore>,
    pub dex: Arc<DexClient>,
}

impl HandlerDeps {
    pub fn new(store: Arc<UserStore>, dex: Arc<DexClient>) -> Self {
        Self { store, dex }
    }
}

/// Error type of the dispatcher handler tree
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;
