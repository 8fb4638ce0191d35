//! API routes for store-server

pub mod cart;
pub mod health;
pub mod orders;
pub mod webhook;

use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post, put};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Authenticated cart (server-side cart per customer)
    let cart = Router::new()
        .route("/api/cart", get(cart::get_cart).delete(cart::clear_cart))
        .route(
            "/api/cart/items",
            post(cart::add_item)
                .put(cart::update_item)
                .delete(cart::remove_item),
        );

    // Orders: placement is open to guests, the rest is scoped by extractors
    let orders = Router::new()
        .route("/api/orders", post(orders::place_order).get(orders::all_orders))
        .route("/api/orders/my", get(orders::my_orders))
        .route(
            "/api/orders/create-checkout-session",
            post(orders::create_checkout_session),
        )
        .route(
            "/api/orders/{id}",
            get(orders::get_order).put(orders::cancel_order),
        )
        .route("/api/orders/{id}/status", put(orders::set_order_status));

    // Payment webhook (signature-verified, raw body)
    let webhook = Router::new().route(
        "/api/orders/lemonsqueezy-webhook",
        post(webhook::handle_webhook),
    );

    Router::new()
        .route("/health", get(health::health_check))
        .merge(cart)
        .merge(orders)
        .merge(webhook)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
