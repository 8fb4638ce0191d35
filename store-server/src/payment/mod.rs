//! Lemon Squeezy integration via REST API (no SDK dependency)
//!
//! Two concerns live here:
//! - creating a hosted checkout session for the full-advance payment method
//! - verifying webhook signatures over the raw request body
//!
//! The provider's metadata channel only accepts string values, so every
//! numeric or structured field is stringified on the way out and parsed back
//! when the webhook arrives.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use shared::util::now_millis;
use thiserror::Error;

const CHECKOUT_ENDPOINT: &str = "https://api.lemonsqueezy.com/v1/checkouts";

/// Checkout creation failures
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("No products in cart")]
    EmptyCart,

    #[error("Missing {0}")]
    MissingCredentials(&'static str),

    #[error("{0}")]
    Provider(String),

    #[error("Checkout request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<CheckoutError> for shared::AppError {
    fn from(err: CheckoutError) -> Self {
        use shared::error::ErrorCode;
        match err {
            CheckoutError::EmptyCart => Self::new(ErrorCode::CartEmpty),
            CheckoutError::MissingCredentials(name) => {
                Self::with_message(ErrorCode::PaymentConfigMissing, format!("Missing {name}"))
            }
            CheckoutError::Provider(detail) => {
                Self::with_message(ErrorCode::CheckoutFailed, detail)
            }
            CheckoutError::Http(e) => Self::with_message(
                ErrorCode::CheckoutFailed,
                format!("Checkout request failed: {e}"),
            ),
        }
    }
}

/// One line of the checkout, already priced from the catalog
#[derive(Debug, Clone)]
pub struct CheckoutLine {
    pub product_id: String,
    pub product_name: String,
    /// Unit price at checkout time (discount price if set, else base price)
    pub unit_price: f64,
    pub quantity: i64,
    pub carret_value: f64,
}

impl CheckoutLine {
    fn line_total(&self) -> f64 {
        self.unit_price * self.carret_value * self.quantity as f64
    }
}

/// Total the same way the order builder computes it:
/// sum of (price x carat x quantity) plus delivery charges.
pub fn compute_total(lines: &[CheckoutLine], delivery_charges: f64) -> f64 {
    let subtotal: f64 = lines.iter().map(CheckoutLine::line_total).sum();
    if delivery_charges > 0.0 {
        subtotal + delivery_charges
    } else {
        subtotal
    }
}

/// Total in minor currency units (integer cents) for the provider
pub fn total_in_cents(total: f64) -> i64 {
    (total * 100.0).round() as i64
}

/// Human-readable description: first 3 product names, "+N more" if truncated
pub fn checkout_description(lines: &[CheckoutLine]) -> String {
    let names: Vec<&str> = lines
        .iter()
        .take(3)
        .map(|l| l.product_name.as_str())
        .collect();
    let list = names.join(", ");
    if lines.len() > 3 {
        format!("{} and {} more", list, lines.len() - 3)
    } else {
        list
    }
}

#[derive(Debug, Serialize)]
struct CustomOrderItem<'a> {
    product_id: &'a str,
    product_name: &'a str,
    quantity: i64,
    unit_price: f64,
    caret_value: f64,
}

/// Custom metadata for the checkout. The provider only carries string values,
/// so everything is stringified here and parsed back in the webhook handler.
pub fn build_custom_data(
    user_id: &str,
    lines: &[CheckoutLine],
    delivery_charges: f64,
    total: f64,
) -> serde_json::Value {
    let items: Vec<CustomOrderItem> = lines
        .iter()
        .map(|l| CustomOrderItem {
            product_id: &l.product_id,
            product_name: &l.product_name,
            quantity: l.quantity,
            unit_price: l.unit_price,
            caret_value: l.carret_value,
        })
        .collect();

    serde_json::json!({
        "user_id": user_id,
        "order_items": serde_json::to_string(&items).unwrap_or_default(),
        "delivery_charges": delivery_charges.to_string(),
        "total_amount": total.to_string(),
        "timestamp": now_millis().to_string(),
    })
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    detail: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    errors: Vec<ProviderError>,
}

/// Create a Lemon Squeezy checkout session and return the hosted checkout URL.
///
/// Fails fast (before any network call) when the cart is empty or provider
/// credentials are absent.
pub async fn create_checkout_session(
    api_key: &str,
    store_id: &str,
    variant_id: &str,
    frontend_url: &str,
    user_id: &str,
    lines: &[CheckoutLine],
    delivery_charges: f64,
) -> Result<String, CheckoutError> {
    if lines.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    if api_key.is_empty() {
        return Err(CheckoutError::MissingCredentials("LEMONSQUEEZY_API_KEY"));
    }
    if store_id.is_empty() {
        return Err(CheckoutError::MissingCredentials("LEMONSQUEEZY_STORE_ID"));
    }
    if variant_id.is_empty() {
        return Err(CheckoutError::MissingCredentials("LEMONSQUEEZY_VARIANT_ID"));
    }

    let total = compute_total(lines, delivery_charges);
    let plural = if lines.len() > 1 { "s" } else { "" };

    let payload = serde_json::json!({
        "data": {
            "type": "checkouts",
            "attributes": {
                "checkout_data": {
                    "custom": build_custom_data(user_id, lines, delivery_charges, total),
                },
                "product_options": {
                    "name": format!("Order - {} item{}", lines.len(), plural),
                    "description": checkout_description(lines),
                    "redirect_url": format!("{frontend_url}/checkout-success"),
                },
                "custom_price": total_in_cents(total),
            },
            "relationships": {
                "store": {
                    "data": { "type": "stores", "id": store_id },
                },
                "variant": {
                    "data": { "type": "variants", "id": variant_id },
                },
            },
        },
    });

    let client = reqwest::Client::new();
    let response = client
        .post(CHECKOUT_ENDPOINT)
        .bearer_auth(api_key)
        .header("Accept", "application/vnd.api+json")
        .header("Content-Type", "application/vnd.api+json")
        .json(&payload)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let body: ProviderErrorBody = response.json().await.unwrap_or(ProviderErrorBody {
            errors: Vec::new(),
        });
        let detail = body
            .errors
            .first()
            .and_then(|e| e.detail.clone().or_else(|| e.title.clone()))
            .unwrap_or_else(|| format!("Checkout creation failed ({status})"));
        return Err(CheckoutError::Provider(detail));
    }

    let body: serde_json::Value = response.json().await?;
    body["data"]["attributes"]["url"]
        .as_str()
        .map(String::from)
        .ok_or_else(|| CheckoutError::Provider("Checkout response missing url".into()))
}

/// Verify a webhook signature: hex HMAC-SHA256 of the exact raw body.
///
/// The comparison is constant-time via `Mac::verify_slice`. The raw bytes
/// must arrive untouched from ingress; re-serialized JSON will not match.
pub fn verify_webhook_signature(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
) -> Result<(), &'static str> {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).map_err(|_| "HMAC key error")?;
    mac.update(payload);

    let sig_bytes = hex::decode(sig_header.trim()).map_err(|_| "Invalid signature hex")?;
    mac.verify_slice(&sig_bytes)
        .map_err(|_| "Webhook signature mismatch")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(payload: &[u8], secret: &str) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    fn ruby_line(qty: i64, carret: f64) -> CheckoutLine {
        CheckoutLine {
            product_id: "product:ruby".into(),
            product_name: "Ruby Ring".into(),
            unit_price: 1000.0,
            quantity: qty,
            carret_value: carret,
        }
    }

    #[test]
    fn total_multiplies_price_by_carat_and_quantity() {
        let total = compute_total(&[ruby_line(2, 3.0)], 200.0);
        assert_eq!(total, 6200.0);
        assert_eq!(total_in_cents(total), 620_000);
    }

    #[test]
    fn cents_are_rounded_not_truncated() {
        assert_eq!(total_in_cents(10.005), 1001);
        assert_eq!(total_in_cents(10.004), 1000);
    }

    #[test]
    fn description_truncates_after_three_names() {
        let mut lines = vec![ruby_line(1, 1.0); 5];
        for (i, line) in lines.iter_mut().enumerate() {
            line.product_name = format!("Gem {}", i + 1);
        }
        assert_eq!(
            checkout_description(&lines),
            "Gem 1, Gem 2, Gem 3 and 2 more"
        );
        assert_eq!(checkout_description(&lines[..2]), "Gem 1, Gem 2");
    }

    #[test]
    fn custom_data_values_are_all_strings() {
        let data = build_custom_data("user:alice", &[ruby_line(2, 3.0)], 200.0, 6200.0);
        let obj = data.as_object().unwrap();
        assert!(obj.values().all(|v| v.is_string()));
        assert_eq!(obj["delivery_charges"], "200");
        assert_eq!(obj["total_amount"], "6200");

        // order_items round-trips through its stringified form
        let items: serde_json::Value =
            serde_json::from_str(obj["order_items"].as_str().unwrap()).unwrap();
        assert_eq!(items[0]["product_id"], "product:ruby");
        assert_eq!(items[0]["quantity"], 2);
    }

    #[test]
    fn valid_signature_is_accepted() {
        let body = br#"{"meta":{"event_name":"order_created"}}"#;
        let sig = sign(body, "hush");
        assert!(verify_webhook_signature(body, &sig, "hush").is_ok());
    }

    #[test]
    fn tampered_body_is_rejected() {
        let body = br#"{"meta":{"event_name":"order_created"}}"#;
        let sig = sign(body, "hush");
        let tampered = br#"{"meta":{"event_name":"order_refunded"}}"#;
        assert!(verify_webhook_signature(tampered, &sig, "hush").is_err());
    }

    #[test]
    fn wrong_secret_and_garbage_hex_are_rejected() {
        let body = b"payload";
        let sig = sign(body, "hush");
        assert!(verify_webhook_signature(body, &sig, "other").is_err());
        assert!(verify_webhook_signature(body, "not-hex!", "hush").is_err());
    }

    #[test]
    fn checkout_fails_fast_without_credentials() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let lines = [ruby_line(1, 1.0)];

        let err = rt
            .block_on(create_checkout_session(
                "",
                "store",
                "variant",
                "http://localhost",
                "user:alice",
                &lines,
                0.0,
            ))
            .unwrap_err();
        assert!(matches!(err, CheckoutError::MissingCredentials(_)));

        let err = rt
            .block_on(create_checkout_session(
                "key",
                "store",
                "variant",
                "http://localhost",
                "user:alice",
                &[],
                0.0,
            ))
            .unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
    }
}
