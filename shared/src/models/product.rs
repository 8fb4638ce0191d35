//! Product catalog model
//!
//! Products are priced by weight: the effective line total is
//! `unit price x carat value x quantity`, so the catalog carries both a base
//! and an optional discount price plus the valid carat-rate range.

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Allowed carat-rate range for a product
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct CarretRate {
    #[serde(default)]
    pub min: f64,
    #[serde(default)]
    pub max: f64,
}

/// A single product image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductImage {
    pub url: String,
    #[serde(default)]
    pub is_primary: bool,
}

/// Product document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub category_id: Option<RecordId>,
    pub price: f64,
    #[serde(default)]
    pub discount_price: Option<f64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub stock_quantity: i64,
    #[serde(default)]
    pub carret_rate: CarretRate,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    pub created_at: i64,
}

fn default_true() -> bool {
    true
}

impl Product {
    /// Effective unit price: the discount price when one is set (and positive),
    /// otherwise the base price.
    pub fn unit_price(&self) -> f64 {
        self.discount_price
            .filter(|p| *p > 0.0)
            .unwrap_or(self.price)
    }
}

/// Payload for creating a product (admin tooling, seeding, tests)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub discount_price: Option<f64>,
    #[serde(default)]
    pub stock_quantity: i64,
    #[serde(default)]
    pub carret_rate: CarretRate,
    #[serde(default)]
    pub images: Vec<ProductImage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: f64, discount: Option<f64>) -> Product {
        Product {
            id: None,
            name: "Ruby Ring".into(),
            slug: "ruby-ring".into(),
            description: None,
            category_id: None,
            price,
            discount_price: discount,
            is_active: true,
            stock_quantity: 10,
            carret_rate: CarretRate::default(),
            images: vec![],
            created_at: 0,
        }
    }

    #[test]
    fn unit_price_prefers_discount() {
        assert_eq!(product(1000.0, Some(800.0)).unit_price(), 800.0);
    }

    #[test]
    fn unit_price_falls_back_to_base() {
        assert_eq!(product(1000.0, None).unit_price(), 1000.0);
        // A zeroed discount is treated as unset, matching the storefront UI.
        assert_eq!(product(1000.0, Some(0.0)).unit_price(), 1000.0);
    }
}
