//! Request extractors whose rejections render as `AppError`.
//!
//! Drop-in replacements for axum's `Json`, `Query` and `Path`: a malformed
//! body or parameter answers 400 with the usual `{"error": "..."}` body
//! instead of axum's plain-text rejection.

use axum::{
    extract::{
        FromRequest, FromRequestParts,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::AppError;

/// JSON body extractor and response.
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Query string extractor.
#[derive(Debug, Clone, Copy, Default, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct Query<T>(pub T);

/// Path parameter extractor.
#[derive(Debug, Clone, Copy, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct Path<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "JSON body rejected");
        let message = match rejection {
            JsonRejection::MissingJsonContentType(_) => "İstek gövdesi JSON olmalı",
            JsonRejection::JsonSyntaxError(_) => "İstek gövdesi okunamadı",
            _ => "İstek gövdesi geçersiz",
        };
        Self::BadRequest(message.to_string())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "query string rejected");
        Self::BadRequest("Sorgu parametreleri geçersiz".to_string())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "path parameter rejected");
        Self::BadRequest("Adres parametresi geçersiz".to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
        routing::{get, post},
    };
    use serde::Deserialize;
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Profile {
        age: i32,
    }

    #[derive(Debug, Deserialize)]
    struct Paging {
        #[allow(dead_code)]
        page: Option<i64>,
    }

    async fn echo_age(Json(profile): Json<Profile>) -> Json<i32> {
        Json(profile.age)
    }

    async fn paged(Query(_): Query<Paging>) -> StatusCode {
        StatusCode::OK
    }

    async fn by_id(Path(_id): Path<Uuid>) -> StatusCode {
        StatusCode::OK
    }

    fn router() -> Router {
        Router::new()
            .route("/echo", post(echo_age))
            .route("/paged", get(paged))
            .route("/items/{id}", get(by_id))
    }

    async fn error_of(response: Response) -> (StatusCode, serde_json::Value) {
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(body: &'static str) -> Request<Body> {
        Request::post("/echo")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body_round_trips() {
        let response = router().oneshot(post_json(r#"{"age":30}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"30");
    }

    #[tokio::test]
    async fn test_wrong_field_type_is_json_bad_request() {
        let response = router().oneshot(post_json(r#"{"age":"otuz"}"#)).await.unwrap();
        let (status, body) = error_of(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "İstek gövdesi geçersiz");
    }

    #[tokio::test]
    async fn test_syntax_error_is_json_bad_request() {
        let response = router().oneshot(post_json("{age:")).await.unwrap();
        let (status, body) = error_of(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "İstek gövdesi okunamadı");
    }

    #[tokio::test]
    async fn test_missing_content_type_is_json_bad_request() {
        let request = Request::post("/echo").body(Body::from(r#"{"age":30}"#)).unwrap();
        let response = router().oneshot(request).await.unwrap();
        let (status, body) = error_of(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "İstek gövdesi JSON olmalı");
    }

    #[tokio::test]
    async fn test_bad_query_and_path_are_json_bad_requests() {
        let request = Request::get("/paged?page=abc").body(Body::empty()).unwrap();
        let (status, body) = error_of(router().oneshot(request).await.unwrap()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Sorgu parametreleri geçersiz");

        let request = Request::get("/items/not-a-uuid").body(Body::empty()).unwrap();
        let (status, body) = error_of(router().oneshot(request).await.unwrap()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Adres parametresi geçersiz");
    }
}
