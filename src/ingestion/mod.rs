//! Batch ingestion of random items with their images.
//!
//! Items arrive as positionally aligned arrays (kind, member tag, file) for
//! one edition. Each item is uploaded to the image store and then persisted
//! as a metadata row, strictly in input order. The two writes are not
//! transactionally linked, and neither are the items: the first failure
//! aborts the rest of the batch while everything persisted before it stays
//! persisted. The workflow only talks to the two collaborator traits, so a
//! stricter implementation (staged uploads, compensating deletes) can be
//! swapped in behind the same contract.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::collection_store::{CollectionStore, NewRandomItem};
use crate::image_store::{ImageStore, ImageStoreError};

/// One file attached to a batch slot.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    /// Content type as declared by the client; may be empty.
    pub content_type: String,
    /// Client-side file name, used for the stored object's extension.
    pub file_name: String,
}

/// One slot of an ingestion batch. `payload == None` models a submitted
/// form slot with no file chosen: the slot is skipped entirely but still
/// occupies its index, so later slots keep their pairing.
#[derive(Debug, Clone)]
pub struct ItemUpload {
    pub item_type: String,
    pub member_name: String,
    pub payload: Option<ImagePayload>,
}

impl ItemUpload {
    /// Zip the three parallel arrays of an upload request into batch slots,
    /// rejecting misaligned lengths up front.
    pub fn from_parallel_arrays(
        item_types: Vec<String>,
        member_names: Vec<String>,
        payloads: Vec<Option<ImagePayload>>,
    ) -> Result<Vec<ItemUpload>, IngestError> {
        if item_types.len() != member_names.len() || item_types.len() != payloads.len() {
            return Err(IngestError::MisalignedBatch {
                item_types: item_types.len(),
                member_names: member_names.len(),
                files: payloads.len(),
            });
        }
        Ok(item_types
            .into_iter()
            .zip(member_names)
            .zip(payloads)
            .map(|((item_type, member_name), payload)| ItemUpload {
                item_type,
                member_name,
                payload,
            })
            .collect())
    }
}

/// Errors from the ingestion workflow. The upload and persist variants
/// carry the 0-based index of the failing slot and how many items had
/// already been persisted, because those items are NOT rolled back.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(
        "batch arrays are misaligned: {item_types} item types, {member_names} member names, {files} files"
    )]
    MisalignedBatch {
        item_types: usize,
        member_names: usize,
        files: usize,
    },

    #[error("upload failed for item {index} ({persisted} already persisted): {source}")]
    Upload {
        index: usize,
        persisted: usize,
        #[source]
        source: ImageStoreError,
    },

    #[error("failed to persist item {index} ({persisted} already persisted): {source}")]
    Persist {
        index: usize,
        persisted: usize,
        #[source]
        source: anyhow::Error,
    },
}

impl IngestError {
    /// Index of the failing slot, if the batch got past validation.
    pub fn failed_index(&self) -> Option<usize> {
        match self {
            IngestError::MisalignedBatch { .. } => None,
            IngestError::Upload { index, .. } | IngestError::Persist { index, .. } => Some(*index),
        }
    }

    /// How many items were durably written before the failure.
    pub fn persisted_count(&self) -> usize {
        match self {
            IngestError::MisalignedBatch { .. } => 0,
            IngestError::Upload { persisted, .. } | IngestError::Persist { persisted, .. } => {
                *persisted
            }
        }
    }
}

/// Sequential batch ingestion over an image store and a collection store.
pub struct BatchIngestor {
    image_store: Arc<dyn ImageStore>,
    collection_store: Arc<dyn CollectionStore>,
}

impl BatchIngestor {
    pub fn new(
        image_store: Arc<dyn ImageStore>,
        collection_store: Arc<dyn CollectionStore>,
    ) -> Self {
        Self {
            image_store,
            collection_store,
        }
    }

    /// Ingest a batch of items for one edition, in input order.
    ///
    /// Returns the count of items persisted. An empty batch (or one made
    /// only of empty slots) succeeds with 0 without touching either store.
    pub async fn ingest(
        &self,
        edition_id: &str,
        items: Vec<ItemUpload>,
    ) -> Result<usize, IngestError> {
        let mut persisted = 0usize;

        for (index, item) in items.into_iter().enumerate() {
            let Some(payload) = item.payload else {
                debug!("Skipping empty slot {} for edition {}", index, edition_id);
                continue;
            };

            let image_url = self
                .image_store
                .put_object(payload.bytes, &payload.content_type, &payload.file_name)
                .await
                .map_err(|source| IngestError::Upload {
                    index,
                    persisted,
                    source,
                })?;

            self.collection_store
                .insert_random_item(NewRandomItem {
                    edition_id: edition_id.to_string(),
                    item_type: item.item_type,
                    member_name: item.member_name,
                    image_url,
                })
                .map_err(|source| IngestError::Persist {
                    index,
                    persisted,
                    source,
                })?;

            persisted += 1;
        }

        info!(
            "Ingested {} random item(s) for edition {}",
            persisted, edition_id
        );
        Ok(persisted)
    }
}
