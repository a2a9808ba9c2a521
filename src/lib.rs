pub mod auth;
pub mod blob;
pub mod config;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod middleware;
pub mod resources;
pub mod store;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use blob::BlobStore;
use resources::{Brand, Category, Product};
use store::DocumentStore;

/// Shared handler state: the document store and the image blob store.
///
/// Both are trait objects so the binary can swap Postgres for the in-memory
/// store (and disk blobs for in-memory blobs) without touching any handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub blobs: Arc<dyn BlobStore>,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api/users", handlers::users::routes())
        // Token-gated resource groups
        .nest("/api/products", handlers::resource::routes::<Product>())
        .nest("/api/categories", handlers::resource::routes::<Category>())
        .nest("/api/brands", handlers::resource::routes::<Brand>())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Ecom Admin API",
            "version": version,
            "description": "E-commerce admin panel backend built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "users": "/api/users/RegisterApi, /api/users/LoginApi (public - token acquisition)",
                "products": "/api/products/* (protected)",
                "categories": "/api/categories/* (protected)",
                "brands": "/api/brands/* (protected)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "store": "ok"
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "store unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "store_error": e.to_string()
                }
            })),
        ),
    }
}
