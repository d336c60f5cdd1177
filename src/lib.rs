pub mod config;
pub mod database;
pub mod error;
pub mod flash;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod state;
pub mod storage;
pub mod upload;
pub mod validation;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{Json, Redirect},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

async fn handle_404() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "status": "error",
            "message": "Halaman tidak ditemukan."
        })),
    )
}

/// Builds the full application: movie routes, cover files, middleware.
pub fn app(state: AppState, max_body_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let images = ServeDir::new(state.covers.images_dir());
    let storage = ServeDir::new(state.covers.disk_root());

    Router::new()
        .route("/", get(|| async { Redirect::to("/movies") }))
        .merge(routes::movie::router())
        .nest_service("/images", images)
        .nest_service("/storage", storage)
        .fallback(handle_404)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
