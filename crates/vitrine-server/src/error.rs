use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use vitrine_core::{EditorError, MediaError, ValidationError};
use vitrine_render::RenderError;
use vitrine_store::{AccessError, StoreError, SubmitError};

/// API error type that maps to JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("payload too large: {0}")]
    TooLarge(String),

    #[error("site has invalid fields")]
    Validation(Vec<ValidationError>),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "notFound", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "badRequest", msg.clone()),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Authentication required".to_string(),
            ),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::TooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, "tooLarge", msg.clone()),
            ApiError::Validation(errors) => {
                let fields: Vec<_> = errors
                    .iter()
                    .map(|e| json!({ "field": e.field(), "message": field_message(e) }))
                    .collect();
                let status = StatusCode::UNPROCESSABLE_ENTITY;
                let body = json!({
                    "error": {
                        "type": "validationError",
                        "message": self.to_string(),
                        "statusCode": status.as_u16(),
                        "fields": fields,
                    }
                });
                return (status, Json(body)).into_response();
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internalError",
                    "An internal error occurred".to_string(),
                )
            }
            ApiError::Store(StoreError::InvalidKey(key)) => (
                StatusCode::BAD_REQUEST,
                "badRequest",
                format!("Invalid id: {key}"),
            ),
            ApiError::Store(err) => {
                tracing::error!("Store error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internalError",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": {
                "type": error_type,
                "message": message,
                "statusCode": status.as_u16(),
            }
        });

        (status, Json(body)).into_response()
    }
}

fn field_message(error: &ValidationError) -> String {
    match error {
        ValidationError::Required { message, .. } => message.to_string(),
        other => other.to_string(),
    }
}

impl From<EditorError> for ApiError {
    fn from(err: EditorError) -> Self {
        match err {
            EditorError::UnknownSection(_) => ApiError::NotFound(err.to_string()),
            EditorError::SectionExists(_) => ApiError::Conflict(err.to_string()),
            EditorError::Validation(e) => ApiError::Validation(vec![e]),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Forbidden { .. } => ApiError::Forbidden(err.to_string()),
            AccessError::MissingSite => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<SubmitError> for ApiError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Invalid(errors) => ApiError::Validation(errors),
            SubmitError::Store(e) => ApiError::Store(e),
        }
    }
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::TooLarge { .. } => ApiError::TooLarge(err.to_string()),
            MediaError::UnsupportedType(_) => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

/// Convenience type alias for route handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_of(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_errors_list_fields() {
        let (status, body) = body_of(ApiError::Validation(vec![ValidationError::Required {
            field: "nomeDoSite",
            message: "O nome do site é obrigatório",
        }]))
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["fields"][0]["field"], "nomeDoSite");
        assert_eq!(
            body["error"]["fields"][0]["message"],
            "O nome do site é obrigatório"
        );
    }

    #[tokio::test]
    async fn store_failures_hide_details() {
        let (status, body) =
            body_of(ApiError::Store(StoreError::Unavailable("disk gone".to_string()))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["type"], "internalError");
        assert_eq!(body["error"]["statusCode"], 500);
    }

    #[test]
    fn maps_editor_errors() {
        assert!(matches!(
            ApiError::from(EditorError::UnknownSection("x".to_string())),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(EditorError::SectionExists("hero".to_string())),
            ApiError::Conflict(_)
        ));
    }

    #[test]
    fn maps_access_errors() {
        let forbidden = AccessError::Forbidden {
            uid: "ana".to_string(),
            client_id: "bob".to_string(),
        };

        assert!(matches!(ApiError::from(forbidden), ApiError::Forbidden(_)));
        assert!(matches!(
            ApiError::from(AccessError::MissingSite),
            ApiError::BadRequest(_)
        ));
    }

    #[test]
    fn card_order_overflow_is_a_bad_request() {
        assert!(matches!(
            ApiError::from(EditorError::CardOrderOverflow("benefits".to_string())),
            ApiError::BadRequest(_)
        ));
    }
}
