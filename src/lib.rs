//! SHINee Collection Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod collection_store;
pub mod config;
pub mod image_store;
pub mod ingestion;
pub mod server;
pub mod sqlite_persistence;
pub mod stats;

// Re-export commonly used types for convenience
pub use collection_store::{CollectionStore, SqliteCollectionStore};
pub use image_store::{ImageStore, SupabaseImageStore};
pub use ingestion::BatchIngestor;
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
