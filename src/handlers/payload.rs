use async_trait::async_trait;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::blob::{self, UploadedImage};
use crate::error::ApiError;

/// Typed request body plus the optional `image` upload.
///
/// Create/update routes accept either `application/json` or
/// `multipart/form-data`; with multipart, text parts become fields and the
/// `image` part is filtered before its bytes are read. The admin panel
/// frontend posts forms, the API tests post JSON, both land here.
pub struct ResourcePayload<T> {
    pub body: T,
    pub image: Option<UploadedImage>,
}

#[async_trait]
impl<S, T> FromRequest<S> for ResourcePayload<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if !content_type.starts_with("multipart/form-data") {
            let Json(body) = Json::<T>::from_request(req, state)
                .await
                .map_err(|_| ApiError::bad_request("Invalid request body"))?;
            return Ok(Self { body, image: None });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|_| ApiError::bad_request("Invalid request body"))?;

        let mut fields = Map::new();
        let mut image = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|_| ApiError::bad_request("Invalid request body"))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == "image" {
                let original_name = field.file_name().unwrap_or("upload").to_string();
                let declared_type = field.content_type().unwrap_or_default().to_string();
                if !blob::is_allowed_image(&original_name, &declared_type) {
                    return Err(ApiError::bad_request(blob::UPLOAD_REJECTION));
                }
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::bad_request("Invalid request body"))?;
                image = Some(UploadedImage { original_name, bytes: bytes.to_vec() });
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|_| ApiError::bad_request("Invalid request body"))?;
                fields.insert(name, Value::String(text));
            }
        }

        let body = serde_json::from_value(Value::Object(fields))
            .map_err(|_| ApiError::bad_request("Invalid request body"))?;
        Ok(Self { body, image })
    }
}
