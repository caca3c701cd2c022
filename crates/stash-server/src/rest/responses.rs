//! JSON envelope shared by the REST handlers.
//!
//! Successful calls answer `{"success":true,"data":...}`. Failures answer
//! `{"success":false,"error":{"code":...,"message":...}}` with the HTTP
//! status taken from the [`StashError`] variant.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use stash_core::{ErrorResponse, StashError};
use tracing::{debug, error};

/// Body of every JSON reply.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorResponse>,
}

impl<T> Envelope<T> {
    /// Wraps a handler result.
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl Envelope<()> {
    /// Describes a failed call.
    pub fn failure(err: &StashError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorResponse::from_error(err)),
        }
    }
}

/// Service failure surfaced by a handler.
#[derive(Debug)]
pub struct ApiError(pub StashError);

impl ApiError {
    /// HTTP status for the wrapped error.
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<StashError> for ApiError {
    fn from(err: StashError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), code = self.0.error_code(), "Request failed: {}", self.0);
        } else {
            debug!(status = status.as_u16(), code = self.0.error_code(), "Request rejected: {}", self.0);
        }

        (status, Json(Envelope::failure(&self.0))).into_response()
    }
}

/// Handler result answering 200 with the envelope.
pub type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

/// Answers 200 with `data`.
pub fn reply<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(Envelope::data(data)))
}

/// Answers 201 with the created resource.
#[derive(Debug)]
pub struct Created<T>(pub T);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(Envelope::data(self.0))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::{json, Value};

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_is_404_envelope() {
        let response = ApiError::from(StashError::not_found("User", 7)).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"]["code"], json!("NOT_FOUND"));
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn test_unavailable_cache_is_503() {
        let err = ApiError(StashError::cache_unavailable("down"));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = json_body(err.into_response()).await;
        assert_eq!(body["error"]["code"], json!("CACHE_UNAVAILABLE"));
    }

    #[tokio::test]
    async fn test_created_wraps_data_with_201() {
        let response = Created(json!({ "id": 1 })).into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body, json!({ "success": true, "data": { "id": 1 } }));
    }
}
