//! Master data routes.
//!
//! Selection-list lookups for the item registration screen: all discs, and
//! the editions belonging to one disc.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::error;

use super::server::ErrorResponse;
use super::state::{GuardedCollectionStore, ServerState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EditionsQuery {
    disc_id: String,
}

/// GET /discs - all discs for the album selection list.
async fn get_discs(State(store): State<GuardedCollectionStore>) -> Response {
    match store.list_discs() {
        Ok(discs) => Json(discs).into_response(),
        Err(err) => {
            error!("Failed to list discs: {:#}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to list discs".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// GET /editions?discId= - editions belonging to the selected disc.
async fn get_editions(
    State(store): State<GuardedCollectionStore>,
    Query(query): Query<EditionsQuery>,
) -> Response {
    match store.list_editions_by_disc(&query.disc_id) {
        Ok(editions) => Json(editions).into_response(),
        Err(err) => {
            error!("Failed to list editions for {}: {:#}", query.disc_id, err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to list editions".to_string(),
                }),
            )
                .into_response()
        }
    }
}

pub fn master_routes() -> Router<ServerState> {
    Router::new()
        .route("/discs", get(get_discs))
        .route("/editions", get(get_editions))
}
