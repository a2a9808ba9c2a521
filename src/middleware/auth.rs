use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::{self, Claims};
use crate::error::ApiError;
use crate::store::DocumentId;

/// Authenticated user context extracted from the verified token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: DocumentId,
    pub email: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.email,
        }
    }
}

/// Token gate layered onto every resource router.
///
/// No token at all is 401; a token that fails verification is 403. Those
/// two messages are the published contract of the admin panel.
pub async fn require_token(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&headers)
        .ok_or_else(|| ApiError::unauthorized("Access token missing"))?;

    let claims = auth::verify_token(&token)
        .map_err(|_| ApiError::forbidden("Invalid or expired token"))?;

    // Inject user context for downstream handlers
    let auth_user = AuthUser::from(claims);
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// The legacy service took the second whitespace-separated word without
/// checking the scheme, so `Basic xyz` yields a token that fails
/// verification (403) rather than a missing-token 401. Clients depend on
/// that split, so it is preserved.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers.get("authorization")?.to_str().ok()?;
    auth_str
        .split_whitespace()
        .nth(1)
        .map(|token| token.to_string())
}
