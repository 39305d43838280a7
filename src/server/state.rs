use axum::extract::FromRef;
use std::sync::{Arc, RwLock};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::catalog::{AlbumRecord, CatalogSource};

use super::ServerConfig;

/// The local catalog currently served. Readers take a cheap snapshot of the
/// inner `Arc`; a refresh swaps in a whole new catalog.
pub type GuardedLocalCatalog = Arc<RwLock<Arc<Vec<AlbumRecord>>>>;
pub type OptionalCatalogSource = Option<Arc<dyn CatalogSource>>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub local_catalog: GuardedLocalCatalog,
    pub catalog_source: OptionalCatalogSource,
    pub shutdown: CancellationToken,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        local_catalog: Vec<AlbumRecord>,
        catalog_source: OptionalCatalogSource,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            local_catalog: Arc::new(RwLock::new(Arc::new(local_catalog))),
            catalog_source,
            shutdown,
        }
    }

    pub fn local_catalog_snapshot(&self) -> Arc<Vec<AlbumRecord>> {
        self.local_catalog
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn replace_local_catalog(&self, albums: Vec<AlbumRecord>) {
        let mut guard = self
            .local_catalog
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(albums);
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}

impl FromRef<ServerState> for GuardedLocalCatalog {
    fn from_ref(input: &ServerState) -> Self {
        input.local_catalog.clone()
    }
}

impl FromRef<ServerState> for OptionalCatalogSource {
    fn from_ref(input: &ServerState) -> Self {
        input.catalog_source.clone()
    }
}
