//! Random item routes.
//!
//! Provides endpoints for:
//! - Bulk-registering collectible items with their photos (multipart)
//! - Listing registered items, optionally filtered to one edition

use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::ingestion::{ImagePayload, IngestError, ItemUpload};

use super::server::ErrorResponse;
use super::state::{GuardedCollectionStore, OptionalIngestor, ServerState};

// Generous cap for a batch of photos; a single item photo is a few MB.
const MAX_UPLOAD_BODY_BYTES: usize = 100 * 1024 * 1024;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub count: usize,
}

/// Failure body for a batch that died partway: items persisted before the
/// failing index are still in the database, so the caller needs both
/// numbers to reconcile.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFailureResponse {
    pub error: String,
    pub failed_index: Option<usize>,
    pub persisted_count: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemsQuery {
    #[serde(default)]
    edition_id: Option<String>,
}

/// POST /upload - bulk-register items for one edition (multipart/form-data).
///
/// Expects positionally aligned `names`, `memberNames` and `images` fields;
/// an image part with no content marks a "no file chosen" slot, which is
/// skipped without shifting the pairing of later slots.
async fn upload_items(
    State(ingestor): State<OptionalIngestor>,
    mut multipart: Multipart,
) -> Response {
    let Some(ingestor) = ingestor else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: "Image storage is not configured".to_string(),
            }),
        )
            .into_response();
    };

    let mut disc_id: Option<String> = None;
    let mut edition_id: Option<String> = None;
    let mut item_types: Vec<String> = Vec::new();
    let mut member_names: Vec<String> = Vec::new();
    let mut payloads: Vec<Option<ImagePayload>> = Vec::new();

    // Process multipart fields
    while let Ok(Some(field)) = multipart.next_field().await {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "discId" => {
                if let Ok(value) = field.text().await {
                    disc_id = Some(value);
                }
            }
            "editionId" => {
                if let Ok(value) = field.text().await {
                    edition_id = Some(value);
                }
            }
            "names" => match field.text().await {
                Ok(value) => item_types.push(value),
                Err(e) => {
                    warn!("Failed to read item type field: {}", e);
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(ErrorResponse {
                            error: "Failed to read item type field".to_string(),
                        }),
                    )
                        .into_response();
                }
            },
            "memberNames" => match field.text().await {
                Ok(value) => member_names.push(value),
                Err(e) => {
                    warn!("Failed to read member name field: {}", e);
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(ErrorResponse {
                            error: "Failed to read member name field".to_string(),
                        }),
                    )
                        .into_response();
                }
            },
            "images" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let content_type = field.content_type().unwrap_or("").to_string();
                match field.bytes().await {
                    Ok(bytes) if bytes.is_empty() => {
                        // A form slot submitted with no file chosen.
                        payloads.push(None);
                    }
                    Ok(bytes) => payloads.push(Some(ImagePayload {
                        bytes: bytes.to_vec(),
                        content_type,
                        file_name,
                    })),
                    Err(e) => {
                        warn!("Failed to read image field: {}", e);
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(ErrorResponse {
                                error: "Failed to read image field".to_string(),
                            }),
                        )
                            .into_response();
                    }
                }
            }
            _ => {}
        }
    }

    let edition_id = match edition_id {
        Some(id) if !id.is_empty() => id,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "No editionId provided".to_string(),
                }),
            )
                .into_response();
        }
    };

    debug!(
        "Upload request for edition {} (disc {:?}): {} slot(s)",
        edition_id,
        disc_id,
        item_types.len()
    );

    let items = match ItemUpload::from_parallel_arrays(item_types, member_names, payloads) {
        Ok(items) => items,
        Err(err) => {
            warn!("Rejected upload for edition {}: {}", edition_id, err);
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: err.to_string(),
                }),
            )
                .into_response();
        }
    };

    match ingestor.ingest(&edition_id, items).await {
        Ok(count) => Json(UploadResponse {
            message: format!("Stored {} random item(s) for edition {}", count, edition_id),
            count,
        })
        .into_response(),
        Err(err) => {
            error!("Upload batch failed for edition {}: {:#}", edition_id, err);
            let status = match err {
                IngestError::MisalignedBatch { .. } => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (
                status,
                Json(UploadFailureResponse {
                    error: err.to_string(),
                    failed_index: err.failed_index(),
                    persisted_count: err.persisted_count(),
                }),
            )
                .into_response()
        }
    }
}

/// GET /items?editionId= - registered items, newest batch last.
///
/// The frontend sends the literal string "undefined" when no edition is
/// selected, so that and an empty value both mean "no filter".
async fn get_items(
    State(store): State<GuardedCollectionStore>,
    Query(query): Query<ItemsQuery>,
) -> Response {
    let edition_id = query
        .edition_id
        .as_deref()
        .filter(|id| !id.is_empty() && *id != "undefined");

    match store.list_random_items(edition_id) {
        Ok(items) => Json(items).into_response(),
        Err(err) => {
            error!("Failed to list random items: {:#}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to list random items".to_string(),
                }),
            )
                .into_response()
        }
    }
}

pub fn random_item_routes() -> Router<ServerState> {
    let upload_route = Router::new()
        .route("/upload", post(upload_items))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES));

    upload_route.route("/items", get(get_items))
}
