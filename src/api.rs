//! HTTP surface for the chat flows and the signing hand-off

mod handlers;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::runtime::ProductionManager;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<ProductionManager>,
}

impl AppState {
    pub fn new(manager: ProductionManager) -> Self {
        Self {
            manager: Arc::new(manager),
        }
    }
}
