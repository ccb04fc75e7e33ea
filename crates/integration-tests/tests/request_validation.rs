//! Malformed request bodies are rejected with a JSON 400 before any query.

use axum::http::StatusCode;
use serde_json::{Value, json};

use takviye_integration_tests::{body_json, post_json, test_app};

const GUEST_SESSION: (&str, &str) = ("x-session-id", "guest-validation-01");

async fn bad_request(uri: &str, body: &str, headers: &[(&str, &str)]) -> Value {
    let response = post_json(test_app(), uri, body, headers).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST, "POST {uri} {body}");
    let body = body_json(response).await;
    assert!(
        body["error"].as_str().is_some_and(|msg| !msg.is_empty()),
        "expected an error message, got {body}"
    );
    body
}

fn wizard_profile() -> Value {
    json!({
        "age": 30,
        "weight": 75.0,
        "goal": "kas",
        "trainingFrequency": 4,
        "dietType": "normal"
    })
}

#[tokio::test]
async fn test_wizard_rejects_unparseable_body() {
    let body = bad_request("/api/wizard/analyze", "{\"age\": 30,", &[]).await;
    assert_eq!(body["error"], "İstek gövdesi okunamadı");
}

#[tokio::test]
async fn test_wizard_rejects_wrong_types() {
    let mut profile = wizard_profile();
    profile["age"] = json!("otuz");
    let body = bad_request("/api/wizard/analyze", &profile.to_string(), &[]).await;
    assert_eq!(body["error"], "İstek gövdesi geçersiz");

    let mut profile = wizard_profile();
    profile["age"] = json!(-5);
    bad_request("/api/wizard/analyze", &profile.to_string(), &[]).await;

    let body = bad_request("/api/wizard/analyze", r#"{"age": 30}"#, &[]).await;
    assert_eq!(body["error"], "İstek gövdesi geçersiz");
}

#[tokio::test]
async fn test_wizard_rejects_out_of_range_profile() {
    for (field, value) in [("age", json!(7)), ("age", json!(140)), ("weight", json!(5.5))] {
        let mut profile = wizard_profile();
        profile[field] = value;
        let body = bad_request("/api/wizard/analyze", &profile.to_string(), &[]).await;
        assert_eq!(body["error"], "Yaş veya kilo geçersiz", "{field}");
    }

    let mut profile = wizard_profile();
    profile["goal"] = json!("  ");
    let body = bad_request("/api/wizard/analyze", &profile.to_string(), &[]).await;
    assert_eq!(body["error"], "Hedef seçmelisiniz");
}

#[tokio::test]
async fn test_checkout_rejects_malformed_body() {
    let body = bad_request("/api/checkout", "not json", &[GUEST_SESSION]).await;
    assert_eq!(body["error"], "İstek gövdesi okunamadı");

    let body = bad_request(
        "/api/checkout",
        r#"{"paymentMethod": "bitcoin"}"#,
        &[GUEST_SESSION],
    )
    .await;
    assert_eq!(body["error"], "İstek gövdesi geçersiz");
}

#[tokio::test]
async fn test_checkout_rejects_missing_fields_before_reading_cart() {
    let request = json!({
        "paymentMethod": "bank_transfer",
        "customerName": "",
        "customerEmail": "ayse@ornek.com.tr",
        "customerPhone": "05551234567",
        "shippingAddress": {
            "fullName": "Ayşe Kaya",
            "phone": "05551234567",
            "city": "İstanbul",
            "district": "Kadıköy",
            "addressLine": "Moda Cad. 1"
        }
    });
    let body = bad_request("/api/checkout", &request.to_string(), &[GUEST_SESSION]).await;
    assert_eq!(body["error"], "Ad soyad zorunludur");
}

#[tokio::test]
async fn test_cart_add_rejects_bad_product_id() {
    let body = bad_request(
        "/api/cart",
        r#"{"productId": "kreatin", "quantity": 1}"#,
        &[GUEST_SESSION],
    )
    .await;
    assert_eq!(body["error"], "İstek gövdesi geçersiz");
}
