//! Back-office gate: tokens and the role to module table.
//!
//! Denials are answered from the token alone. A token that passes is then
//! checked against the stored role, which needs the database.

use axum::http::StatusCode;

use takviye_core::Role;
use takviye_integration_tests::{body_json, get, test_state, token_for};

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let response = get(takviye_storefront::app(test_state()), "/api/admin/dashboard", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Oturum açmanız gerekiyor");
}

#[tokio::test]
async fn test_invalid_token_is_unauthorized() {
    let response = get(
        takviye_storefront::app(test_state()),
        "/api/admin/dashboard",
        Some("eyJhbGciOiJIUzI1NiJ9.e30.invalid"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_customer_is_forbidden() {
    let state = test_state();
    let token = token_for(&state, Role::Customer);
    let response = get(takviye_storefront::app(state), "/api/admin/dashboard", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_role_table_is_enforced_per_module() {
    let denied = [
        (Role::Editor, "/api/admin/orders"),
        (Role::Editor, "/api/admin/users"),
        (Role::OrderManager, "/api/admin/products"),
        (Role::Support, "/api/admin/coupons"),
        (Role::Admin, "/api/admin/users"),
        (Role::Admin, "/api/admin/settings"),
        (Role::Admin, "/api/admin/audit-logs"),
    ];
    for (role, path) in denied {
        let state = test_state();
        let token = token_for(&state, role);
        let response = get(takviye_storefront::app(state), path, Some(&token)).await;
        assert_eq!(
            response.status(),
            StatusCode::FORBIDDEN,
            "{} on {path}",
            role.as_str()
        );
    }
}

#[tokio::test]
async fn test_unknown_module_is_gated_before_not_found() {
    let state = test_state();
    let token = token_for(&state, Role::Admin);
    let response = get(
        takviye_storefront::app(state),
        "/api/admin/warehouses",
        Some(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_permitted_token_is_checked_against_stored_role() {
    let state = test_state();
    let token = token_for(&state, Role::SuperAdmin);
    let response = get(
        takviye_storefront::app(state),
        "/api/admin/warehouses",
        Some(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Internal server error");
}
