//! Tests against a running storefront with a migrated, seeded database.
//!
//! ```bash
//! tk-cli migrate && tk-cli seed crates/cli/seed/demo.yaml
//! cargo run -p takviye-storefront &
//! cargo test -p takviye-integration-tests -- --ignored
//! ```

#![allow(clippy::unwrap_used)]

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use takviye_integration_tests::live_base_url;

async fn get_json(client: &Client, path: &str) -> Value {
    let response = client
        .get(format!("{}{path}", live_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK, "GET {path}");
    response.json().await.unwrap()
}

#[tokio::test]
#[ignore = "needs a running storefront"]
async fn test_live_readiness() {
    let response = reqwest::get(format!("{}/health/ready", live_base_url()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "needs a running storefront"]
async fn test_live_catalog_lists_seeded_products() {
    let client = Client::new();
    let body = get_json(&client, "/api/products?limit=5").await;
    assert!(body["data"].as_array().is_some_and(|items| !items.is_empty()));

    let product = get_json(&client, "/api/products/d3-vitamini-1000-iu").await;
    assert_eq!(product["slug"], "d3-vitamini-1000-iu");
}

#[tokio::test]
#[ignore = "needs a running storefront"]
async fn test_live_guest_cart_round_trip() {
    let client = Client::new();
    let session = format!("guest-{}", std::process::id());
    let product = get_json(&client, "/api/products/d3-vitamini-1000-iu").await;

    let response = client
        .post(format!("{}/api/cart", live_base_url()))
        .header("x-session-id", &session)
        .json(&json!({ "productId": product["id"], "quantity": 2 }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let cart: Value = client
        .get(format!("{}/api/cart", live_base_url()))
        .header("x-session-id", &session)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(cart["items"].as_array().is_some_and(|items| !items.is_empty()));
}

#[tokio::test]
#[ignore = "needs a running storefront"]
async fn test_live_unknown_coupon_is_rejected() {
    let response = Client::new()
        .post(format!("{}/api/coupons/validate", live_base_url()))
        .json(&json!({ "code": "YOKBOYLEKUPON", "subtotal": "300.00" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
#[ignore = "needs a running storefront"]
async fn test_live_super_admin_reaches_not_found_on_unknown_module() {
    let Ok(token) = std::env::var("STOREFRONT_TEST_SUPER_ADMIN_TOKEN") else {
        return;
    };
    let response = Client::new()
        .get(format!("{}/api/admin/warehouses", live_base_url()))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Sayfa bulunamadı");
}
