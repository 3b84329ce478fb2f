use axum::extract::FromRef;

use crate::collection_store::CollectionStore;
use crate::ingestion::BatchIngestor;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedCollectionStore = Arc<dyn CollectionStore>;
/// The ingestor is absent when no image storage is configured; the upload
/// endpoint answers 503 in that case.
pub type OptionalIngestor = Option<Arc<BatchIngestor>>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub collection_store: GuardedCollectionStore,
    pub ingestor: OptionalIngestor,
}

impl FromRef<ServerState> for GuardedCollectionStore {
    fn from_ref(input: &ServerState) -> Self {
        input.collection_store.clone()
    }
}

impl FromRef<ServerState> for OptionalIngestor {
    fn from_ref(input: &ServerState) -> Self {
        input.ingestor.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
