//! Order endpoints
//!
//! Placement accepts guests (cart lines in the request body) as well as
//! authenticated customers (server-side cart). Everything after placement is
//! scoped: customers see and cancel their own orders, admins see everything
//! and may force any status.

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use shared::error::ErrorCode;
use shared::models::{Address, CartItemInput, Order, OrderStatus, PaymentMethod};
use shared::{ApiResponse, AppError, AppResult};
use surrealdb::RecordId;

use crate::auth::{AdminUser, CurrentUser, OptionalUser};
use crate::cart::{CartStore, GuestCart, ServerCart};
use crate::orders::OrderService;
use crate::payment;
use crate::state::AppState;

fn order_service(state: &AppState) -> OrderService {
    OrderService::new(state.products(), state.orders())
}

fn parse_user_id(user: &CurrentUser) -> AppResult<RecordId> {
    user.id
        .parse()
        .map_err(|_| AppError::invalid_token("Malformed user id in token"))
}

/// Accept either a bare key or the full "order:key" form in the path
fn order_record_id(raw: &str) -> RecordId {
    if raw.contains(':') {
        raw.parse()
            .unwrap_or_else(|_| RecordId::from_table_key("order", raw))
    } else {
        RecordId::from_table_key("order", raw)
    }
}

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub billing_address: Address,
    pub shipping_address: Address,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub delivery_charges: f64,
    /// Guest checkout: the client-side cart snapshot. Ignored for
    /// authenticated callers, whose server-side cart is authoritative.
    #[serde(default)]
    pub items: Option<Vec<CartItemInput>>,
}

/// POST /api/orders
pub async fn place_order(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Json(req): Json<PlaceOrderRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    if req.delivery_charges < 0.0 {
        return Err(AppError::validation("Delivery charges cannot be negative"));
    }
    let service = order_service(&state);

    let order = match user {
        Some(user) => {
            let user_id = parse_user_id(&user)?;
            let cart = ServerCart::new(state.carts(), user_id.clone());
            service
                .place_order(
                    Some(user_id),
                    &cart,
                    req.billing_address,
                    req.shipping_address,
                    req.payment_method,
                    req.delivery_charges,
                )
                .await?
        }
        None => {
            let lines = req.items.unwrap_or_default();
            let cart = GuestCart::from_lines(lines);
            service
                .place_order(
                    None,
                    &cart,
                    req.billing_address,
                    req.shipping_address,
                    req.payment_method,
                    req.delivery_charges,
                )
                .await?
        }
    };

    Ok(Json(ApiResponse::success(order)))
}

/// GET /api/orders/my
pub async fn my_orders(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<Order>>>> {
    let user_id = parse_user_id(&user)?;
    let orders = state.orders().find_by_user(&user_id).await?;
    Ok(Json(ApiResponse::success(orders)))
}

/// GET /api/orders (admin console)
pub async fn all_orders(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> AppResult<Json<ApiResponse<Vec<Order>>>> {
    let orders = state.orders().find_all().await?;
    Ok(Json(ApiResponse::success(orders)))
}

/// GET /api/orders/{id} — owner or admin
pub async fn get_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = state
        .orders()
        .find_by_id(&order_record_id(&id))
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

    let is_owner = order
        .user_id
        .as_ref()
        .is_some_and(|owner| owner.to_string() == user.id);
    if !is_owner && !user.is_admin() {
        return Err(AppError::new(ErrorCode::PermissionDenied));
    }

    Ok(Json(ApiResponse::success(order)))
}

/// PUT /api/orders/{id} — customer cancellation
pub async fn cancel_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = order_service(&state)
        .cancel_order(&user, &order_record_id(&id))
        .await?;
    Ok(Json(ApiResponse::success(order)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// PUT /api/orders/{id}/status — privileged status override
pub async fn set_order_status(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = order_service(&state)
        .admin_set_status(&order_record_id(&id), req.status)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}

#[derive(Debug, Serialize)]
pub struct CheckoutSessionResponse {
    pub url: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct CheckoutSessionRequest {
    #[serde(default)]
    pub delivery_charges: f64,
}

/// POST /api/orders/create-checkout-session
///
/// Prices the caller's server-side cart and returns the hosted checkout URL.
pub async fn create_checkout_session(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<CheckoutSessionRequest>,
) -> AppResult<Json<ApiResponse<CheckoutSessionResponse>>> {
    let user_id = parse_user_id(&user)?;
    let cart = ServerCart::new(state.carts(), user_id);
    let items = cart.get().await?;

    let lines = order_service(&state).checkout_lines(&items).await?;
    let config = state.config();
    let url = payment::create_checkout_session(
        &config.lemonsqueezy_api_key,
        &config.lemonsqueezy_store_id,
        &config.lemonsqueezy_variant_id,
        &config.frontend_url,
        &user.id,
        &lines,
        req.delivery_charges,
    )
    .await?;

    Ok(Json(ApiResponse::success(CheckoutSessionResponse { url })))
}
