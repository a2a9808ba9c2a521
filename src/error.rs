// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

/// HTTP boundary error reproducing the admin panel's legacy wire shapes.
///
/// Most errors are `{"message": ...}` JSON; not-found adds `"status": false`,
/// duplicates attach the conflicting record under `"data"`, and the create
/// and login failure paths answer with a bare text body. That mix is the
/// published contract, so it is kept rather than unified.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    Duplicate { message: String, existing: Value },

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error, bare text body
    Internal,

    // 500 Internal Server Error, JSON body with a narrowed error field
    StoreFailure { message: String, detail: String },
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Duplicate { .. } => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Internal => 500,
            ApiError::StoreFailure { .. } => 500,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Duplicate { message, .. } => message,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Internal => "Internal Server Error",
            ApiError::StoreFailure { message, .. } => message,
        }
    }

    /// Convert to JSON response body; `Internal` has none (text body)
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::Duplicate { message, existing } => {
                json!({ "message": message, "data": existing })
            }
            ApiError::NotFound(message) => {
                json!({ "message": message, "status": false })
            }
            ApiError::StoreFailure { message, detail } => {
                json!({ "message": message, "error": detail })
            }
            _ => json!({ "message": self.message() }),
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn duplicate(message: impl Into<String>, existing: Value) -> Self {
        ApiError::Duplicate { message: message.into(), existing }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal() -> Self {
        ApiError::Internal
    }

    pub fn store_failure(message: impl Into<String>, detail: impl Into<String>) -> Self {
        ApiError::StoreFailure { message: message.into(), detail: detail.into() }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match self {
            ApiError::Internal => (status, "Internal Server Error").into_response(),
            _ => (status, Json(self.to_json())).into_response(),
        }
    }
}
