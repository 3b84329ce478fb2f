//! Image blob storage.
//!
//! Uploaded item photos live in an external object store; the metadata rows
//! only ever hold the public URL returned from here. The store and the
//! collection database fail independently, so callers decide what a partial
//! failure means.

mod supabase;

use async_trait::async_trait;
use thiserror::Error;

pub use supabase::SupabaseImageStore;

/// Errors from an image storage backend.
#[derive(Debug, Error)]
pub enum ImageStoreError {
    #[error("image storage rejected the upload with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("failed to reach image storage: {0}")]
    Unreachable(#[from] reqwest::Error),
}

/// Trait for image storage backends.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store one object and return its publicly resolvable URL.
    ///
    /// `file_name` is the client-side name, used only to carry the
    /// extension through to the stored object name.
    async fn put_object(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
        file_name: &str,
    ) -> Result<String, ImageStoreError>;
}
