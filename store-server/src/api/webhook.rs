//! Payment webhook handler
//!
//! POST /api/orders/lemonsqueezy-webhook — raw body, HMAC verified.
//!
//! The handler acknowledges every verified event with 200 so the provider
//! stops retrying; events that cannot be matched to an order are logged and
//! swallowed. A missing or mismatched signature gets 401, a malformed or
//! unprocessable request 400.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use serde_json::{Value, json};
use surrealdb::RecordId;

use crate::orders::OrderService;
use crate::payment;
use crate::state::AppState;

const SIGNATURE_HEADER: &str = "x-signature";

fn reply(status: StatusCode, body: Value) -> (StatusCode, Json<Value>) {
    (status, Json(body))
}

/// Handle incoming payment events.
///
/// Must receive the raw body, untouched by any JSON extractor, because the
/// signature covers the exact bytes the provider sent.
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    // An absent signature is the same trust-boundary violation as a wrong one.
    let Some(sig_header) = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok()) else {
        tracing::warn!("webhook missing signature header");
        return reply(
            StatusCode::UNAUTHORIZED,
            json!({"error": "Missing signature header"}),
        );
    };

    let secret = &state.config().lemonsqueezy_webhook_secret;
    if let Err(e) = payment::verify_webhook_signature(&body, sig_header, secret) {
        tracing::warn!(error = e, "webhook signature verification failed");
        return reply(
            StatusCode::UNAUTHORIZED,
            json!({"error": "Invalid signature"}),
        );
    }

    let event: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "webhook body is not valid JSON");
            return reply(StatusCode::BAD_REQUEST, json!({"error": "Invalid payload"}));
        }
    };

    let event_name = event["meta"]["event_name"].as_str().unwrap_or("");
    tracing::info!(event_name, "payment webhook received");

    let service = OrderService::new(state.products(), state.orders());
    let outcome = match event_name {
        "order_created" => handle_order_created(&service, &event).await,
        "order_refunded" => handle_order_refunded(&service, &event).await,
        other => {
            tracing::info!(event_name = other, "ignoring unhandled webhook event");
            Ok(())
        }
    };

    // A processing failure gets a 400-class response so the provider retries
    // the delivery later.
    if let Err(e) = outcome {
        tracing::error!(error = %e, event_name, "webhook processing failed");
        return reply(
            StatusCode::BAD_REQUEST,
            json!({"error": "Webhook processing failed"}),
        );
    }

    reply(StatusCode::OK, json!({"received": true}))
}

/// A completed checkout: match the customer's most recent pending order and
/// mark it paid. An unmatched event is acknowledged, not failed; a missing or
/// malformed custom payload is likewise swallowed after a warning, since
/// retrying it can never succeed.
async fn handle_order_created(service: &OrderService, event: &Value) -> shared::AppResult<()> {
    let Some(user_id) = event["meta"]["custom_data"]["user_id"].as_str() else {
        tracing::warn!("order_created event missing custom user_id");
        return Ok(());
    };
    let Ok(user_id) = user_id.parse::<RecordId>() else {
        tracing::warn!(user_id, "order_created event has malformed user_id");
        return Ok(());
    };
    let external_order_id = event["data"]["id"].as_str().unwrap_or("");

    service.record_payment(&user_id, external_order_id).await?;
    Ok(())
}

async fn handle_order_refunded(service: &OrderService, event: &Value) -> shared::AppResult<()> {
    let Some(external_order_id) = event["data"]["id"].as_str() else {
        tracing::warn!("order_refunded event missing provider order id");
        return Ok(());
    };

    service.record_refund(external_order_id).await?;
    Ok(())
}
