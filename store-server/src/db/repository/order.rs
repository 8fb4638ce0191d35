//! Order Repository
//!
//! Orders are append-only documents; after creation only the status field and
//! its companion timestamps are touched. The human-facing order number comes
//! from an atomic counter document, so concurrent placements can never read
//! the same value.

use super::{BaseRepository, RepoError, RepoResult};
use serde::Deserialize;
use shared::models::{Order, OrderStatus};
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const ORDER_TABLE: &str = "order";

/// First order ever placed gets number 1000
const FIRST_ORDER_NUMBER: i64 = 1000;

#[derive(Debug, Deserialize)]
struct Counter {
    value: i64,
}

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Reserve the next order number via an atomic increment-and-fetch on the
    /// counter document. The whole UPSERT runs as one statement, so two
    /// concurrent placements always observe distinct values.
    pub async fn next_order_number(&self) -> RepoResult<i64> {
        let counters: Vec<Counter> = self
            .base
            .db()
            .query("UPSERT counter:order_number SET value = (value ?? $seed) + 1 RETURN AFTER")
            .bind(("seed", FIRST_ORDER_NUMBER - 1))
            .await?
            .take(0)?;
        counters
            .into_iter()
            .next()
            .map(|c| c.value)
            .ok_or_else(|| RepoError::Database("Failed to advance order counter".to_string()))
    }

    /// Persist a new order
    pub async fn create(&self, order: Order) -> RepoResult<Order> {
        let created: Option<Order> = self.base.db().create(ORDER_TABLE).content(order).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    /// Find order by id
    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Order>> {
        let order: Option<Order> = self.base.db().select(id.clone()).await?;
        Ok(order)
    }

    /// All orders for one customer, newest first
    pub async fn find_by_user(&self, user_id: &RecordId) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order WHERE user_id = $user ORDER BY created_at DESC")
            .bind(("user", user_id.to_string()))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// All orders, newest first (admin console)
    pub async fn find_all(&self) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Most recent pending order for a customer created at or after `cutoff`
    /// (the webhook matching window).
    pub async fn find_recent_pending(
        &self,
        user_id: &RecordId,
        cutoff: i64,
    ) -> RepoResult<Option<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query(
                "SELECT * FROM order \
                 WHERE user_id = $user AND status = 'pending' AND created_at >= $cutoff \
                 ORDER BY created_at DESC, order_number DESC LIMIT 1",
            )
            .bind(("user", user_id.to_string()))
            .bind(("cutoff", cutoff))
            .await?
            .take(0)?;
        Ok(orders.into_iter().next())
    }

    /// Find order by the payment provider's order id
    pub async fn find_by_external_id(&self, external_id: &str) -> RepoResult<Option<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order WHERE external_order_id = $ext LIMIT 1")
            .bind(("ext", external_id.to_string()))
            .await?
            .take(0)?;
        Ok(orders.into_iter().next())
    }

    /// Transition to paid, recording the provider order id and paid-at time
    pub async fn mark_paid(
        &self,
        id: &RecordId,
        external_id: &str,
        paid_at: i64,
    ) -> RepoResult<Order> {
        let updated: Vec<Order> = self
            .base
            .db()
            .query(
                "UPDATE $order SET status = 'paid', external_order_id = $ext, paid_at = $paid \
                 RETURN AFTER",
            )
            .bind(("order", id.clone()))
            .bind(("ext", external_id.to_string()))
            .bind(("paid", paid_at))
            .await?
            .take(0)?;
        updated
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Order {}", id)))
    }

    /// Record the refunded marker; status and inventory are left untouched
    pub async fn mark_refunded(&self, id: &RecordId, refunded_at: i64) -> RepoResult<Order> {
        let updated: Vec<Order> = self
            .base
            .db()
            .query("UPDATE $order SET refunded_at = $refunded RETURN AFTER")
            .bind(("order", id.clone()))
            .bind(("refunded", refunded_at))
            .await?
            .take(0)?;
        updated
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Order {}", id)))
    }

    /// Transition to cancelled and record the cancellation time
    pub async fn mark_cancelled(&self, id: &RecordId, cancelled_at: i64) -> RepoResult<Order> {
        let updated: Vec<Order> = self
            .base
            .db()
            .query("UPDATE $order SET status = 'cancelled', cancelled_at = $cancelled RETURN AFTER")
            .bind(("order", id.clone()))
            .bind(("cancelled", cancelled_at))
            .await?
            .take(0)?;
        updated
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Order {}", id)))
    }

    /// Overwrite the status unconditionally (privileged admin path; no
    /// transition-graph validation, no inventory side effects).
    pub async fn set_status(&self, id: &RecordId, status: OrderStatus) -> RepoResult<Order> {
        let updated: Vec<Order> = self
            .base
            .db()
            .query("UPDATE $order SET status = $status RETURN AFTER")
            .bind(("order", id.clone()))
            .bind(("status", status.to_string()))
            .await?
            .take(0)?;
        updated
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Order {}", id)))
    }
}
