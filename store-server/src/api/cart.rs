//! Cart endpoints
//!
//! All cart routes require authentication; guests keep their cart client-side
//! and only hand it over at order placement. Every read and mutation responds
//! with the resolved cart view (product records joined in), since that is what
//! the storefront renders.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use shared::models::serde_helpers;
use shared::models::{CartItemInput, ResolvedCart, ResolvedCartItem};
use shared::{ApiResponse, AppError, AppResult};
use surrealdb::RecordId;

use crate::auth::CurrentUser;
use crate::cart::{CartStore, ServerCart};
use crate::state::AppState;

fn parse_user_id(user: &CurrentUser) -> AppResult<RecordId> {
    user.id
        .parse()
        .map_err(|_| AppError::invalid_token("Malformed user id in token"))
}

/// The caller's cart with product records joined in.
///
/// Lines whose product has vanished from the catalog are dropped from the
/// view rather than failing the whole cart.
async fn resolved_view(state: &AppState, user_id: &RecordId) -> AppResult<ResolvedCart> {
    let cart = state.carts().get_or_create(user_id).await?;

    let products = state.products();
    let mut items = Vec::with_capacity(cart.items.len());
    for item in cart.items {
        match products.find_by_id(&item.product_id).await? {
            Some(product) => items.push(ResolvedCartItem {
                product,
                quantity: item.quantity,
                finger_size: item.finger_size,
                carret_value: item.carret_value,
                msg_note: item.msg_note,
            }),
            None => {
                tracing::warn!(product = %item.product_id, "cart line references missing product");
            }
        }
    }

    Ok(ResolvedCart {
        id: cart.id,
        items,
        updated_at: cart.updated_at,
    })
}

/// GET /api/cart
pub async fn get_cart(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<ResolvedCart>>> {
    let user_id = parse_user_id(&user)?;
    Ok(Json(ApiResponse::success(
        resolved_view(&state, &user_id).await?,
    )))
}

/// POST /api/cart/items — add a line, merging on the variant triple
pub async fn add_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<CartItemInput>,
) -> AppResult<Json<ApiResponse<ResolvedCart>>> {
    if input.quantity <= 0 {
        return Err(AppError::validation("Quantity must be positive"));
    }
    let user_id = parse_user_id(&user)?;
    ServerCart::new(state.carts(), user_id.clone())
        .add(input)
        .await?;
    Ok(Json(ApiResponse::success(
        resolved_view(&state, &user_id).await?,
    )))
}

/// PUT /api/cart/items — set a line's quantity (zero removes it)
pub async fn update_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<CartItemInput>,
) -> AppResult<Json<ApiResponse<ResolvedCart>>> {
    let user_id = parse_user_id(&user)?;
    ServerCart::new(state.carts(), user_id.clone())
        .update_quantity(input)
        .await?;
    Ok(Json(ApiResponse::success(
        resolved_view(&state, &user_id).await?,
    )))
}

#[derive(Debug, Deserialize)]
pub struct RemoveItemRequest {
    #[serde(with = "serde_helpers::record_id")]
    pub product_id: RecordId,
    #[serde(default)]
    pub finger_size: Option<f64>,
    #[serde(default = "default_carret")]
    pub carret_value: f64,
}

fn default_carret() -> f64 {
    1.0
}

/// DELETE /api/cart/items — remove the line matching the variant triple
pub async fn remove_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<RemoveItemRequest>,
) -> AppResult<Json<ApiResponse<ResolvedCart>>> {
    let user_id = parse_user_id(&user)?;
    ServerCart::new(state.carts(), user_id.clone())
        .remove(req.product_id, req.finger_size, req.carret_value)
        .await?;
    Ok(Json(ApiResponse::success(
        resolved_view(&state, &user_id).await?,
    )))
}

/// DELETE /api/cart — empty the cart
pub async fn clear_cart(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<()>>> {
    let user_id = parse_user_id(&user)?;
    ServerCart::new(state.carts(), user_id).clear().await?;
    Ok(Json(ApiResponse::ok()))
}
