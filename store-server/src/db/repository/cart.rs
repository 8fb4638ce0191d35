//! Cart Repository
//!
//! Exactly one cart document per authenticated owner, created lazily on first
//! access. Line-merge logic lives in the cart aggregate; this layer only
//! fetches and persists the document.

use super::{BaseRepository, RepoError, RepoResult};
use shared::models::{Cart, CartItem};
use shared::util::now_millis;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const CART_TABLE: &str = "cart";

#[derive(Clone)]
pub struct CartRepository {
    base: BaseRepository,
}

impl CartRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find the cart owned by the given user
    pub async fn find_by_user(&self, user_id: &RecordId) -> RepoResult<Option<Cart>> {
        let carts: Vec<Cart> = self
            .base
            .db()
            .query("SELECT * FROM cart WHERE user_id = $user LIMIT 1")
            .bind(("user", user_id.to_string()))
            .await?
            .take(0)?;
        Ok(carts.into_iter().next())
    }

    /// Get the user's cart, creating an empty one on first access
    pub async fn get_or_create(&self, user_id: &RecordId) -> RepoResult<Cart> {
        if let Some(cart) = self.find_by_user(user_id).await? {
            return Ok(cart);
        }

        let cart = Cart {
            id: None,
            user_id: user_id.clone(),
            items: Vec::new(),
            updated_at: now_millis(),
        };
        let created: Option<Cart> = self.base.db().create(CART_TABLE).content(cart).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create cart".to_string()))
    }

    /// Replace the cart's line items and bump the last-modified timestamp
    pub async fn save_items(&self, cart_id: &RecordId, items: Vec<CartItem>) -> RepoResult<Cart> {
        let items = serde_json::to_value(&items)
            .map_err(|e| RepoError::Database(format!("Failed to serialize cart items: {e}")))?;
        let updated: Vec<Cart> = self
            .base
            .db()
            .query("UPDATE $cart SET items = $items, updated_at = $now RETURN AFTER")
            .bind(("cart", cart_id.clone()))
            .bind(("items", items))
            .bind(("now", now_millis()))
            .await?
            .take(0)?;
        updated
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Cart {}", cart_id)))
    }

    /// Empty the user's cart (used after successful order placement)
    pub async fn clear(&self, user_id: &RecordId) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE cart SET items = [], updated_at = $now WHERE user_id = $user")
            .bind(("now", now_millis()))
            .bind(("user", user_id.to_string()))
            .await?
            .check()?;
        Ok(())
    }
}
