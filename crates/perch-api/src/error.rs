use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use perch_types::Error;

/// Wire form of a domain error. Both kinds surface as HTTP 400 with the
/// envelope `{"code": 400, "name": "InputError"|"AccessError", "message"}`,
/// matching the reference surface, which does not distinguish 401/403.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "code": 400,
            "name": self.0.kind_name(),
            "message": self.0.to_string(),
        }));
        (StatusCode::BAD_REQUEST, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn both_error_kinds_map_to_400_with_the_envelope() {
        let response = ApiError(Error::access("token invalid")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], 400);
        assert_eq!(body["name"], "AccessError");
        assert_eq!(body["message"], "token invalid");

        let response = ApiError(Error::input("channel does not exist")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["name"], "InputError");
    }
}
