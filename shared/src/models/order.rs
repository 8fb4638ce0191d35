//! Order model
//!
//! Orders are immutable snapshots taken at checkout time. Only the status
//! field and its companion timestamps ever change after creation; line prices
//! are frozen so later catalog edits never affect a placed order.

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use std::fmt;
use surrealdb::RecordId;

/// Order lifecycle status
///
/// Happy path is forward-only: pending -> paid -> in_transit -> delivered.
/// Customers may cancel from pending or paid; admins may force any status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
    InTransit,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Whether a customer may still cancel an order in this status.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, Self::Pending | Self::Paid)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::InTransit => "in_transit",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// How the customer pays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Pay the full amount up front through the hosted checkout
    FullAdvance,
    /// Pay on delivery
    Cod,
}

/// Billing or shipping address captured at order time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub full_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// Frozen copy of a cart line, price captured at order time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(with = "serde_helpers::record_id")]
    pub product_id: RecordId,
    /// Unit price at order time (discount price if set, else base price)
    pub price: f64,
    pub quantity: i64,
    pub carret_value: f64,
    #[serde(default)]
    pub finger_size: Option<f64>,
    #[serde(default)]
    pub msg_note: Option<String>,
}

impl OrderItem {
    /// Line total: unit price x carat multiplier x quantity.
    pub fn line_total(&self) -> f64 {
        self.price * self.carret_value * self.quantity as f64
    }
}

/// Order document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    /// Owner; None for guest checkout
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub user_id: Option<RecordId>,
    /// Human-facing sequential number, starts at 1000
    pub order_number: i64,
    pub status: OrderStatus,
    pub billing_address: Address,
    pub shipping_address: Address,
    pub payment_method: PaymentMethod,
    /// Sum of line totals plus delivery charges, computed once at creation
    pub total_amount: f64,
    pub delivery_charges: f64,
    pub order_items: Vec<OrderItem>,
    pub created_at: i64,
    #[serde(default)]
    pub cancelled_at: Option<i64>,
    #[serde(default)]
    pub paid_at: Option<i64>,
    #[serde(default)]
    pub refunded_at: Option<i64>,
    /// Payment provider's order id, recorded when the payment webhook lands
    #[serde(default)]
    pub external_order_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellable_statuses() {
        assert!(OrderStatus::Pending.is_cancellable());
        assert!(OrderStatus::Paid.is_cancellable());
        assert!(!OrderStatus::InTransit.is_cancellable());
        assert!(!OrderStatus::Delivered.is_cancellable());
        assert!(!OrderStatus::Cancelled.is_cancellable());
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::InTransit).unwrap(),
            "\"in_transit\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentMethod::FullAdvance).unwrap(),
            "\"full_advance\""
        );
    }

    #[test]
    fn line_total_multiplies_carat() {
        let item = OrderItem {
            product_id: "product:ruby".parse().unwrap(),
            price: 1000.0,
            quantity: 2,
            carret_value: 3.0,
            finger_size: None,
            msg_note: None,
        };
        assert_eq!(item.line_total(), 6000.0);
    }
}
