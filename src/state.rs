use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::Datastore;
use crate::storage::EvidenceStorage;

/// Shared handler dependencies
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Datastore>,
    pub storage: Arc<dyn EvidenceStorage>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Datastore>, storage: Arc<dyn EvidenceStorage>, config: AppConfig) -> Self {
        Self {
            store,
            storage,
            config: Arc::new(config),
        }
    }
}
