//! HTTP server for the snapshot endpoint
//!
//! Serves `/get/width/{width}/height/{height}/quality/{quality}/scale/{scale}/page/{page_type}/url/{url}`.

use crate::error::{AppError, Result};
use crate::types::{CaptureRequest, SnapshotPath};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use page_capture::Capturer;
use snapshot_cache::SnapshotCache;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

const SNAPSHOT_ROUTE: &str =
    "/get/width/{width}/height/{height}/quality/{quality}/scale/{scale}/page/{page_type}/url/{url}";

/// Shared state for the HTTP server
pub struct ServerState {
    pub cache: SnapshotCache,
    pub capturer: Capturer,
}

impl ServerState {
    pub fn new(cache: SnapshotCache, capturer: Capturer) -> Self {
        Self { cache, capturer }
    }
}

pub type SharedState = Arc<ServerState>;

/// Create the HTTP router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route(SNAPSHOT_ROUTE, get(get_snapshot))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(state: SharedState, port: u16) -> std::io::Result<()> {
    let router = create_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("Server is running on http://localhost:{}", port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await
}

/// Render or serve a cached snapshot
async fn get_snapshot(
    State(state): State<SharedState>,
    Path(path): Path<SnapshotPath>,
) -> std::result::Result<Response, AppError> {
    let request = CaptureRequest::try_from(path).map_err(AppError::BadRequest)?;
    let (data, from_cache) = fetch_or_capture(&state, &request).await?;

    let cache_header = if from_cache { "HIT" } else { "MISS" };
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE.as_str(), "image/jpeg"),
            ("x-cache", cache_header),
        ],
        data,
    )
        .into_response())
}

/// Serve from the cache directory, or capture and store on a miss.
///
/// The existence check and the write are not atomic: concurrent identical
/// misses each render and the last write wins.
async fn fetch_or_capture(
    state: &ServerState,
    request: &CaptureRequest,
) -> Result<(Vec<u8>, bool)> {
    let key = request.cache_key();

    if let Some(data) = state.cache.get(&key).await? {
        info!(key = %key, url = %request.url, "Returning cached snapshot");
        return Ok((data, true));
    }

    let data = state
        .capturer
        .capture(&request.url, &request.capture_options())
        .await?;

    let path = state.cache.put(&key, &data).await?;
    let stats = state.cache.stats();
    info!(
        key = %key,
        path = ?path,
        size = data.len(),
        hits = stats.hits,
        misses = stats.misses,
        "Cached new snapshot"
    );

    Ok((data, false))
}
