//! Card payment gateway client.
//!
//! Charges are a JSON `POST {base_url}/payments` signed with HMAC-SHA256 over
//! the exact request body (hex, `x-signature` header) and authenticated with
//! the `x-api-key` header.

use hmac::{Hmac, Mac};
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use takviye_core::Money;
use takviye_core::types::money::CURRENCY_CODE;

use crate::config::PaymentConfig;

type HmacSha256 = Hmac<Sha256>;

/// Errors that can occur when charging a card.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway refused the card.
    #[error("payment declined: {0}")]
    Declined(String),

    /// Gateway returned an unexpected error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Card data as entered at checkout. Never logged.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    pub holder_name: String,
    pub number: String,
    pub expire_month: String,
    pub expire_year: String,
    pub cvc: String,
}

impl std::fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let digits: String = self.number.chars().filter(char::is_ascii_digit).collect();
        let last4 = digits.get(digits.len().saturating_sub(4)..).unwrap_or("");
        f.debug_struct("CardDetails")
            .field("holder_name", &self.holder_name)
            .field("number", &format!("**** {last4}"))
            .finish_non_exhaustive()
    }
}

/// Buyer contact sent with a charge.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Buyer<'b> {
    pub name: &'b str,
    pub email: &'b str,
    pub phone: &'b str,
}

/// One charge request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeRequest<'c> {
    /// Our reference, echoed back by the gateway.
    pub conversation_id: &'c str,
    pub amount: Money,
    pub currency: &'static str,
    pub card: &'c CardDetails,
    pub buyer: Buyer<'c>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChargeResponse {
    status: String,
    payment_id: Option<String>,
    error_message: Option<String>,
}

/// A successful charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charge {
    /// Gateway payment ID.
    pub reference: String,
}

/// Payment gateway client.
#[derive(Clone)]
pub struct PaymentClient {
    client: reqwest::Client,
    base_url: String,
    secret_key: SecretString,
}

impl PaymentClient {
    /// Create a new gateway client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &PaymentConfig) -> Result<Self, PaymentError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(config.api_key.expose_secret())
                .map_err(|e| PaymentError::InvalidRequest(format!("Invalid API key format: {e}")))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            secret_key: config.secret_key.clone(),
        })
    }

    /// Charge a card.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Declined` if the gateway refuses the card and
    /// `PaymentError::Http`/`PaymentError::Api` for transport or gateway faults.
    pub async fn charge(
        &self,
        conversation_id: &str,
        amount: Money,
        card: &CardDetails,
        buyer: Buyer<'_>,
    ) -> Result<Charge, PaymentError> {
        let request = ChargeRequest {
            conversation_id,
            amount,
            currency: CURRENCY_CODE,
            card,
            buyer,
        };
        let body = serde_json::to_vec(&request)
            .map_err(|e| PaymentError::InvalidRequest(e.to_string()))?;
        let signature = sign(self.secret_key.expose_secret(), &body);

        let response = self
            .client
            .post(format!("{}/payments", self.base_url))
            .header("x-signature", signature)
            .body(body)
            .send()
            .await?;
        let status = response.status();

        if status == StatusCode::PAYMENT_REQUIRED {
            let message = response
                .json::<ChargeResponse>()
                .await
                .ok()
                .and_then(|r| r.error_message)
                .unwrap_or_else(|| "kart reddedildi".to_string());
            return Err(PaymentError::Declined(message));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let charge: ChargeResponse = response.json().await?;
        match (charge.status.as_str(), charge.payment_id) {
            ("success", Some(reference)) => Ok(Charge { reference }),
            _ => Err(PaymentError::Declined(
                charge
                    .error_message
                    .unwrap_or_else(|| "ödeme onaylanmadı".to_string()),
            )),
        }
    }
}

/// Hex HMAC-SHA256 of `body` under `secret`.
#[must_use]
pub fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        // HMAC accepts keys of any length.
        Err(_) => return String::new(),
    };
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_matches_rfc4231_case_2() {
        assert_eq!(
            sign("Jefe", b"what do ya want for nothing?"),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_card_debug_masks_number() {
        let card = CardDetails {
            holder_name: "AYSE YILMAZ".to_string(),
            number: "5528 7900 0000 0008".to_string(),
            expire_month: "12".to_string(),
            expire_year: "2030".to_string(),
            cvc: "123".to_string(),
        };
        let debug = format!("{card:?}");
        assert!(debug.contains("**** 0008"));
        assert!(!debug.contains("5528"));
        assert!(!debug.contains("123\""));
    }

    #[test]
    fn test_charge_request_shape() {
        let card = CardDetails {
            holder_name: "A".to_string(),
            number: "1".to_string(),
            expire_month: "1".to_string(),
            expire_year: "2030".to_string(),
            cvc: "000".to_string(),
        };
        let request = ChargeRequest {
            conversation_id: "TK-20250101-1234",
            amount: Money::from_kurus(54_980),
            currency: CURRENCY_CODE,
            card: &card,
            buyer: Buyer {
                name: "Ayşe",
                email: "ayse@ornek.com",
                phone: "05551112233",
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["conversationId"], "TK-20250101-1234");
        assert_eq!(json["amount"], "549.80");
        assert_eq!(json["currency"], "TRY");
        assert_eq!(json["card"]["expireYear"], "2030");
    }
}
