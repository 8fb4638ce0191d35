//! store-server — gemstone storefront backend
//!
//! Order, cart and payment core for the storefront:
//! - server-side carts for authenticated customers, guest snapshots at checkout
//! - order placement with frozen line prices and sequential order numbers
//! - customer cancellation and privileged admin status overrides
//! - Lemon Squeezy hosted checkout and signature-verified payment webhooks

pub mod api;
pub mod auth;
pub mod cart;
pub mod config;
pub mod db;
pub mod orders;
pub mod payment;
pub mod state;
