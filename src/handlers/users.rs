use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth;
use crate::error::ApiError;
use crate::gateway::{Gateway, GatewayError, ResourceKind};
use crate::resources::user::{self, User, UserCreate};
use crate::store::Filter;
use crate::AppState;

/// Account routes; the only part of the API reachable without a token.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/RegisterApi", post(register))
        .route("/LoginApi", post(login))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

async fn register(
    State(state): State<AppState>,
    payload: Result<Json<UserCreate>, JsonRejection>,
) -> Response {
    let Ok(Json(input)) = payload else {
        return ApiError::bad_request("Invalid request body").into_response();
    };

    let gateway = Gateway::<User>::new(state.store.clone());
    match gateway.create(input, None).await {
        Ok(mut doc) => {
            // Stored, never echoed
            doc.remove("password");
            (
                StatusCode::CREATED,
                Json(json!({
                    "message": "User inserted successfully",
                    "status": true,
                    "insertedData": doc,
                })),
            )
                .into_response()
        }
        Err(GatewayError::Duplicate { existing }) => {
            let data = existing
                .map(|mut doc| {
                    doc.remove("password");
                    Value::from(doc)
                })
                .unwrap_or(Value::Null);
            ApiError::duplicate("Duplicate User. This User already exists.", data).into_response()
        }
        Err(GatewayError::Validation(message)) => ApiError::bad_request(message).into_response(),
        Err(err) => {
            tracing::error!("Failed to register user: {:?}", err);
            ApiError::internal().into_response()
        }
    }
}

async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(request)) = payload else {
        return ApiError::bad_request("Invalid request body").into_response();
    };

    if !user::is_valid_email(&request.email) {
        return ApiError::bad_request("Invalid email format").into_response();
    }

    let by_email = Filter::new().eq("email", request.email.as_str());
    let account = match state.store.find_one(User::COLLECTION, &by_email).await {
        Ok(Some(account)) => account,
        Ok(None) => {
            // Same answer as a bad password; the response must not reveal
            // which half of the pair was wrong.
            return ApiError::unauthorized("Incorrect password or user not found").into_response();
        }
        Err(err) => {
            tracing::error!("Login lookup failed: {:?}", err);
            return ApiError::internal().into_response();
        }
    };

    // Stored passwords are unhashed legacy data; comparison is plaintext
    let stored = account.get("password").and_then(Value::as_str);
    if stored != Some(request.password.as_str()) {
        return ApiError::unauthorized("Incorrect password or user not found").into_response();
    }

    let Some(user_id) = account.id() else {
        tracing::error!("Stored user record has no id: {}", request.email);
        return ApiError::internal().into_response();
    };

    match auth::issue_token(user_id, &request.email) {
        Ok(token) => (
            StatusCode::OK,
            Json(json!({
                "message": "Login successful",
                "status": true,
                "token": token,
                "user": {
                    "id": user_id,
                    "name": account.get("name"),
                    "email": account.get("email"),
                    "mobile": account.get("mobile"),
                },
            })),
        )
            .into_response(),
        Err(err) => {
            tracing::error!("Failed to issue token: {}", err);
            ApiError::internal().into_response()
        }
    }
}
