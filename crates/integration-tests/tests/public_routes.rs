//! Public routes that answer without the database.

use axum::http::{StatusCode, header};

use takviye_integration_tests::{TEST_BASE_URL, body_json, body_text, get, test_app};

#[tokio::test]
async fn test_health_is_ok() {
    let response = get(test_app(), "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_reports_unreachable_database() {
    let response = get(test_app(), "/health/ready", None).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_request_id_is_generated_and_echoed() {
    let response = get(test_app(), "/health", None).await;
    let id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert_eq!(id.len(), 36, "expected a UUID, got {id:?}");
}

#[tokio::test]
async fn test_robots_points_at_sitemap() {
    let response = get(test_app(), "/robots.txt", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap_or_default()
            .starts_with("text/plain")
    );
    let body = body_text(response).await;
    assert!(body.starts_with("User-agent: *"));
    assert!(body.contains("Disallow: /api/"));
    assert!(body.contains(&format!("Sitemap: {TEST_BASE_URL}/sitemap.xml")));
}

#[tokio::test]
async fn test_account_routes_require_token() {
    let response = get(test_app(), "/api/auth/me", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let response = get(test_app(), "/api/auth/me", Some("not-a-jwt")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
