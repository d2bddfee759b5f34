use std::sync::Arc;

use crate::db::{CatalogReader, CatalogWriter, InMemoryStore};
use crate::services::{
    CatalogBrowser, CatalogService, Projector, RandomSource, RatingAggregator, Recommender,
    StatisticsEngine,
};

/// Shared application state
///
/// Every service holds its own handle to the same store; nothing here is
/// mutated after construction.
#[derive(Clone)]
pub struct AppState {
    pub projector: Projector,
    pub ratings: RatingAggregator,
    pub statistics: StatisticsEngine,
    pub recommender: Recommender,
    pub browser: CatalogBrowser,
    pub catalog: CatalogService,
}

impl AppState {
    /// Wires every service to one store and one random source
    pub fn new<S>(store: Arc<S>, random: Arc<dyn RandomSource>) -> Self
    where
        S: CatalogReader + CatalogWriter + 'static,
    {
        let reader: Arc<dyn CatalogReader> = store.clone();
        let writer: Arc<dyn CatalogWriter> = store;

        Self {
            projector: Projector::new(reader.clone()),
            ratings: RatingAggregator::new(reader.clone()),
            statistics: StatisticsEngine::new(reader.clone()),
            recommender: Recommender::new(reader.clone(), random),
            browser: CatalogBrowser::new(reader.clone()),
            catalog: CatalogService::new(reader, writer),
        }
    }

    /// State backed by an empty in-memory store
    pub fn in_memory(random: Arc<dyn RandomSource>) -> Self {
        Self::new(Arc::new(InMemoryStore::new()), random)
    }
}
