//! Shared application state.

use std::sync::Arc;

use domain::{CategoryService, PropertyService, TransactionService};
use record_store::LedgerStore;

use crate::config::Config;

/// Shared application state accessible from all handlers.
pub struct AppState<S> {
    pub properties: PropertyService<S>,
    pub categories: CategoryService<S>,
    pub transactions: TransactionService<S>,
}

impl<S: LedgerStore + Clone> AppState<S> {
    /// Wires every service onto one store, applying the configured policies.
    pub fn new(store: S, config: &Config) -> Arc<Self> {
        Arc::new(Self {
            properties: PropertyService::new(store.clone())
                .with_unique_names(config.unique_property_names),
            categories: CategoryService::new(store.clone())
                .with_delete_policy(config.category_delete_policy),
            transactions: TransactionService::new(store),
        })
    }
}
