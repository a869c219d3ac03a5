pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod store;

use std::sync::Arc;

use crate::config::{StoreBackend, StoreConfig};

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;
pub use repository::Repository;
pub use store::{
    new_document_id, CollectionPath, DocumentPath, DocumentStore, Filter, OrderBy, Query,
    StoreError,
};

/// Open the configured document store backend.
pub async fn connect(config: &StoreConfig) -> Result<Arc<dyn DocumentStore>, StoreError> {
    match config.backend {
        StoreBackend::Postgres => Ok(Arc::new(PgDocumentStore::connect(config).await?)),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory document store; data is lost on restart");
            Ok(Arc::new(MemoryDocumentStore::new()))
        }
    }
}
