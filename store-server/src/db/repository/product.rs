//! Product Repository
//!
//! The catalog is a leaf collaborator here: cart resolution and order
//! building look products up by id, and order placement/cancellation adjust
//! stock. Stock adjustments are single atomic statements so concurrent orders
//! against the same product cannot lose updates.

use super::{BaseRepository, RepoError, RepoResult};
use shared::models::{Product, ProductCreate};
use shared::util::now_millis;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const PRODUCT_TABLE: &str = "product";

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find product by id
    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Product>> {
        let product: Option<Product> = self.base.db().select(id.clone()).await?;
        Ok(product)
    }

    /// Create a new product (admin tooling and tests)
    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        let product = Product {
            id: None,
            name: data.name,
            slug: data.slug,
            description: data.description,
            category_id: None,
            price: data.price,
            discount_price: data.discount_price,
            is_active: true,
            stock_quantity: data.stock_quantity,
            carret_rate: data.carret_rate,
            images: data.images,
            created_at: now_millis(),
        };

        let created: Option<Product> = self
            .base
            .db()
            .create(PRODUCT_TABLE)
            .content(product)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Atomically decrement stock by `qty`, floored at zero.
    ///
    /// Returns `false` when the product does not exist; callers treat that as
    /// a best-effort skip, not a failure.
    pub async fn decrement_stock(&self, id: &RecordId, qty: i64) -> RepoResult<bool> {
        let updated: Vec<Product> = self
            .base
            .db()
            .query("UPDATE $product SET stock_quantity = math::max([stock_quantity - $qty, 0]) RETURN AFTER")
            .bind(("product", id.clone()))
            .bind(("qty", qty))
            .await?
            .take(0)?;
        Ok(!updated.is_empty())
    }

    /// Atomically restore stock by `qty` (inverse of [`Self::decrement_stock`]).
    ///
    /// Returns `false` when the product does not exist.
    pub async fn restore_stock(&self, id: &RecordId, qty: i64) -> RepoResult<bool> {
        let updated: Vec<Product> = self
            .base
            .db()
            .query("UPDATE $product SET stock_quantity += $qty RETURN AFTER")
            .bind(("product", id.clone()))
            .bind(("qty", qty))
            .await?
            .take(0)?;
        Ok(!updated.is_empty())
    }
}
