use anyhow::Result;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use crate::collection_store::FlagUpdate;
use crate::image_store::ImageStore;
use crate::ingestion::BatchIngestor;
use crate::stats::collection_stats;
use std::sync::Arc;
use tower_http::services::ServeDir;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::master_routes::master_routes;
use super::random_item_routes::random_item_routes;
use super::{log_requests, state::*, ServerConfig};

#[derive(Debug, Serialize)]
pub(super) struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub version: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PurchaseBody {
    pub is_purchased: bool,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct WishlistBody {
    pub is_wishlist: bool,
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    Json(stats)
}

/// GET /api/shinee/discography - full listing, newest release first.
async fn get_discography(State(store): State<GuardedCollectionStore>) -> Response {
    match store.list_discography_ordered() {
        Ok(rows) => Json(rows).into_response(),
        Err(err) => {
            error!("Failed to list discography: {:#}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to list discography".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// GET /api/editions/wishlist - rows currently flagged as wishlist.
async fn get_wishlist(State(store): State<GuardedCollectionStore>) -> Response {
    match store.list_wishlist_rows() {
        Ok(rows) => Json(rows).into_response(),
        Err(err) => {
            error!("Failed to list wishlist: {:#}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to list wishlist".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// GET /api/stats - completion percentages for the progress bars, flattened
/// to one map keyed by "total" plus artist and country labels.
async fn get_stats(State(store): State<GuardedCollectionStore>) -> Response {
    match collection_stats(store.as_ref()) {
        Ok(stats) => Json(serde_json::Value::Object(stats.to_wire_map())).into_response(),
        Err(err) => {
            error!("Failed to compute stats: {:#}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to compute stats".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// PATCH /api/editions/{id}/purchase - unconditional flag overwrite.
async fn patch_purchase(
    State(store): State<GuardedCollectionStore>,
    Path(edition_id): Path<String>,
    Json(body): Json<PurchaseBody>,
) -> Response {
    match store.update_purchase_flag(&edition_id, body.is_purchased) {
        Ok(FlagUpdate::Updated) => StatusCode::OK.into_response(),
        Ok(FlagUpdate::NotFound) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => {
            warn!(
                "Failed to update purchase flag for {}: {:#}",
                edition_id, err
            );
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// PATCH /api/editions/{id}/wishlist - unconditional flag overwrite.
async fn patch_wishlist(
    State(store): State<GuardedCollectionStore>,
    Path(edition_id): Path<String>,
    Json(body): Json<WishlistBody>,
) -> Response {
    match store.update_wishlist_flag(&edition_id, body.is_wishlist) {
        Ok(FlagUpdate::Updated) => StatusCode::OK.into_response(),
        Ok(FlagUpdate::NotFound) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => {
            warn!(
                "Failed to update wishlist flag for {}: {:#}",
                edition_id, err
            );
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub fn make_app(
    config: ServerConfig,
    collection_store: GuardedCollectionStore,
    image_store: Option<Arc<dyn ImageStore>>,
) -> Router {
    let ingestor = image_store
        .map(|images| Arc::new(BatchIngestor::new(images, collection_store.clone())));
    let state = ServerState {
        config: config.clone(),
        start_time: Instant::now(),
        collection_store,
        ingestor,
    };

    let api_routes: Router = Router::new()
        .route("/shinee/discography", get(get_discography))
        .route("/stats", get(get_stats))
        .route("/editions/wishlist", get(get_wishlist))
        .route("/editions/{id}/purchase", patch(patch_purchase))
        .route("/editions/{id}/wishlist", patch(patch_wishlist))
        .nest("/master", master_routes())
        .nest("/random", random_item_routes())
        .with_state(state.clone());

    let home_router: Router = match &config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    let app = home_router.nest("/api", api_routes);
    app.layer(middleware::from_fn_with_state(state, log_requests))
}

pub async fn run_server(
    config: ServerConfig,
    collection_store: GuardedCollectionStore,
    image_store: Option<Arc<dyn ImageStore>>,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, collection_store, image_store);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    Ok(axum::serve(listener, app).await?)
}
