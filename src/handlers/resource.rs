use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{middleware, Json, Router};
use serde_json::{json, Value};

use crate::blob::StoredBlob;
use crate::error::ApiError;
use crate::gateway::{Gateway, GatewayError, ResourceKind};
use crate::middleware::require_token;
use crate::AppState;

use super::payload::ResourcePayload;

/// Token-gated CRUD route group for one resource kind.
pub fn routes<K: ResourceKind>() -> Router<AppState> {
    Router::new()
        .route("/Add", post(add::<K>))
        .route("/list", get(list::<K>))
        .route("/GetById/:id", get(get_by_id::<K>))
        .route("/Update/:id", put(update::<K>))
        .route("/Delete/:id", delete(remove::<K>))
        .route_layer(middleware::from_fn(require_token))
}

async fn add<K: ResourceKind>(
    State(state): State<AppState>,
    payload: ResourcePayload<K::Create>,
) -> Response {
    let ResourcePayload { body, image } = payload;

    // Store the upload first; the guard discards it if the create fails.
    let blob = match image {
        Some(ref upload) => match StoredBlob::create(state.blobs.clone(), upload).await {
            Ok(blob) => Some(blob),
            Err(err) => {
                tracing::error!("Failed to store {} upload: {}", K::DISPLAY, err);
                return ApiError::internal().into_response();
            }
        },
        None => None,
    };

    let gateway = Gateway::<K>::new(state.store.clone());
    match gateway
        .create(body, blob.as_ref().map(StoredBlob::reference))
        .await
    {
        Ok(doc) => {
            if let Some(blob) = blob {
                blob.keep();
            }
            (
                StatusCode::CREATED,
                Json(json!({
                    "message": format!("{} inserted successfully", K::DISPLAY),
                    "status": true,
                    "insertedData": doc,
                })),
            )
                .into_response()
        }
        Err(GatewayError::Duplicate { existing }) => ApiError::duplicate(
            format!("Duplicate {0}. This {0} already exists.", K::DISPLAY),
            existing.map(Value::from).unwrap_or(Value::Null),
        )
        .into_response(),
        Err(GatewayError::Validation(message)) => ApiError::bad_request(message).into_response(),
        Err(err) => {
            tracing::error!("Failed to create {}: {:?}", K::DISPLAY, err);
            ApiError::internal().into_response()
        }
    }
}

async fn list<K: ResourceKind>(State(state): State<AppState>) -> Response {
    let gateway = Gateway::<K>::new(state.store.clone());
    match gateway.list().await {
        Ok(docs) => (
            StatusCode::OK,
            Json(json!({
                "message": format!("{} Data Fetch Successfully", K::DISPLAY),
                "data": docs,
            })),
        )
            .into_response(),
        Err(err) => {
            store_failure(format!("Error fetching {} list", lower::<K>()), &err).into_response()
        }
    }
}

async fn get_by_id<K: ResourceKind>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let gateway = Gateway::<K>::new(state.store.clone());
    match gateway.get(&id).await {
        Ok(doc) => (
            StatusCode::OK,
            Json(json!({
                "message": format!("{} Details Successfully", K::DISPLAY),
                "status": true,
                "data": doc,
            })),
        )
            .into_response(),
        Err(GatewayError::InvalidId) => ApiError::bad_request("Invalid ID format").into_response(),
        Err(GatewayError::NotFound) => {
            ApiError::not_found(format!("{} Not Found", K::DISPLAY)).into_response()
        }
        Err(err) => store_failure(format!("Error fetching {}", lower::<K>()), &err).into_response(),
    }
}

async fn update<K: ResourceKind>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: ResourcePayload<K::Patch>,
) -> Response {
    let ResourcePayload { body, image } = payload;

    let blob = match image {
        Some(ref upload) => match StoredBlob::create(state.blobs.clone(), upload).await {
            Ok(blob) => Some(blob),
            Err(err) => {
                tracing::error!("Failed to store {} upload: {}", K::DISPLAY, err);
                return ApiError::store_failure(
                    format!("Error updating {}", lower::<K>()),
                    "failed to store upload",
                )
                .into_response();
            }
        },
        None => None,
    };

    let gateway = Gateway::<K>::new(state.store.clone());
    match gateway
        .update(&id, body, blob.as_ref().map(StoredBlob::reference))
        .await
    {
        Ok(doc) => {
            if let Some(blob) = blob {
                blob.keep();
            }
            (
                StatusCode::OK,
                Json(json!({
                    "message": format!("{} updated successfully", K::DISPLAY),
                    "status": true,
                    "updatedData": doc,
                })),
            )
                .into_response()
        }
        Err(GatewayError::NotFound) => {
            ApiError::not_found(format!("{} Not Found", K::DISPLAY)).into_response()
        }
        Err(err) => store_failure(format!("Error updating {}", lower::<K>()), &err).into_response(),
    }
}

async fn remove<K: ResourceKind>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let gateway = Gateway::<K>::new(state.store.clone());
    match gateway.soft_delete(&id).await {
        Ok(doc) => (
            StatusCode::OK,
            Json(json!({
                "message": format!("{} soft-deleted successfully", K::DISPLAY),
                "status": true,
                "deletedData": doc,
            })),
        )
            .into_response(),
        Err(GatewayError::InvalidId) => ApiError::bad_request("Invalid ID format").into_response(),
        Err(GatewayError::NotFound) => {
            ApiError::not_found(format!("{} not found", K::DISPLAY)).into_response()
        }
        Err(err) => store_failure(format!("Error deleting {}", lower::<K>()), &err).into_response(),
    }
}

fn lower<K: ResourceKind>() -> String {
    K::DISPLAY.to_lowercase()
}

fn store_failure(message: String, err: &GatewayError) -> ApiError {
    tracing::error!("{}: {:?}", message, err);
    let detail = err.to_string();
    ApiError::store_failure(message, detail)
}
