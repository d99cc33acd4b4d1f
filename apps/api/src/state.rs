use std::sync::Arc;

use crate::config::Config;
use crate::files::FileStore;
use crate::listing::PageDefaults;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub files: Arc<FileStore>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, store: Store) -> Self {
        let files = FileStore::new(config.upload_dir.clone());
        Self {
            store: Arc::new(store),
            files: Arc::new(files),
            config,
        }
    }

    /// Stand-in for network and database time on every data call.
    pub async fn simulate_latency(&self) {
        if !self.config.mock_latency.is_zero() {
            tokio::time::sleep(self.config.mock_latency).await;
        }
    }

    pub fn page_defaults(&self) -> PageDefaults {
        PageDefaults {
            default_limit: self.config.default_page_size,
            max_limit: self.config.max_page_size,
        }
    }
}
