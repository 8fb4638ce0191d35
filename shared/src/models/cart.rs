//! Cart model
//!
//! One server-side cart per authenticated customer. A line item's identity is
//! the (product, finger size, carat value) triple: the same product with a
//! different carat value is a different line, because price depends on it.

use super::Product;
use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// One product configuration a customer intends to buy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(with = "serde_helpers::record_id")]
    pub product_id: RecordId,
    pub quantity: i64,
    #[serde(default)]
    pub finger_size: Option<f64>,
    #[serde(default = "default_carret")]
    pub carret_value: f64,
    #[serde(default)]
    pub msg_note: Option<String>,
}

fn default_carret() -> f64 {
    1.0
}

impl CartItem {
    /// Whether this line matches the given variant key exactly.
    pub fn matches(&self, product_id: &RecordId, finger_size: Option<f64>, carret_value: f64) -> bool {
        &self.product_id == product_id
            && self.finger_size == finger_size
            && self.carret_value == carret_value
    }
}

/// Server-side cart document (one per authenticated owner)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub user_id: RecordId,
    #[serde(default)]
    pub items: Vec<CartItem>,
    pub updated_at: i64,
}

/// Cart line supplied by the client: add-to-cart payloads and guest-checkout
/// snapshots share this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItemInput {
    #[serde(with = "serde_helpers::record_id")]
    pub product_id: RecordId,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default)]
    pub finger_size: Option<f64>,
    #[serde(default = "default_carret")]
    pub carret_value: f64,
    #[serde(default)]
    pub msg_note: Option<String>,
}

fn default_quantity() -> i64 {
    1
}

impl From<CartItemInput> for CartItem {
    fn from(input: CartItemInput) -> Self {
        Self {
            product_id: input.product_id,
            quantity: input.quantity,
            finger_size: input.finger_size,
            carret_value: input.carret_value,
            msg_note: input.msg_note,
        }
    }
}

/// Cart line with its product reference resolved to the full record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedCartItem {
    pub product: Product,
    pub quantity: i64,
    #[serde(default)]
    pub finger_size: Option<f64>,
    pub carret_value: f64,
    #[serde(default)]
    pub msg_note: Option<String>,
}

/// Cart view returned to clients: product references joined in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedCart {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub items: Vec<ResolvedCartItem>,
    pub updated_at: i64,
}
