//! Shared application state for all routes. Registry and config are read-only after startup.

use crate::config::{CrudConfig, Registry, ResourceEntry};
use crate::error::{AppError, StoreError};
use crate::store::Persistence;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Persistence>,
    pub registry: Arc<Registry>,
    pub config: Arc<CrudConfig>,
}

impl AppState {
    pub fn new(store: impl Persistence + 'static, registry: Registry, config: CrudConfig) -> Self {
        AppState {
            store: Arc::new(store),
            registry: Arc::new(registry),
            config: Arc::new(config),
        }
    }

    pub fn entry(&self, resource: &str) -> Result<&ResourceEntry, AppError> {
        self.registry
            .get(resource)
            .ok_or_else(|| StoreError::UnknownResource(resource.to_string()).into())
    }
}
