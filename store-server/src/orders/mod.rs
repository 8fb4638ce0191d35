//! Order placement and lifecycle
//!
//! Placement snapshots the cart into an immutable order document: unit prices
//! are frozen from the catalog at this moment, the human-facing order number
//! comes from an atomic counter, and stock is decremented best-effort after
//! the order is persisted. Lifecycle transitions are forward-only for
//! customers (with cancellation from pending/paid); admins may force any
//! status through a separate privileged operation.

use shared::error::ErrorCode;
use shared::models::{Address, CartItem, Order, OrderItem, OrderStatus, PaymentMethod, Product};
use shared::util::now_millis;
use shared::{AppError, AppResult};
use surrealdb::RecordId;

use crate::auth::CurrentUser;
use crate::cart::CartStore;
use crate::db::repository::{OrderRepository, ProductRepository};
use crate::payment::CheckoutLine;

/// How far back a payment webhook may reach when matching a pending order
const PAYMENT_MATCH_WINDOW_MS: i64 = 5 * 60 * 1000;

pub struct OrderService {
    products: ProductRepository,
    orders: OrderRepository,
}

impl OrderService {
    pub fn new(products: ProductRepository, orders: OrderRepository) -> Self {
        Self { products, orders }
    }

    pub fn orders(&self) -> &OrderRepository {
        &self.orders
    }

    /// Look up every cart line's product. Missing or deactivated products
    /// abort the whole operation before any side effect happens.
    pub async fn resolve_items(&self, items: &[CartItem]) -> AppResult<Vec<(Product, CartItem)>> {
        let mut resolved = Vec::with_capacity(items.len());
        for item in items {
            let product = self
                .products
                .find_by_id(&item.product_id)
                .await?
                .filter(|p| p.is_active)
                .ok_or_else(|| {
                    AppError::with_message(
                        ErrorCode::ProductNotFound,
                        format!("Product {} is not available", item.product_id),
                    )
                })?;
            resolved.push((product, item.clone()));
        }
        Ok(resolved)
    }

    /// Price the cart for the hosted checkout, same resolution rules as
    /// placement.
    pub async fn checkout_lines(&self, items: &[CartItem]) -> AppResult<Vec<CheckoutLine>> {
        let resolved = self.resolve_items(items).await?;
        Ok(resolved
            .into_iter()
            .map(|(product, item)| CheckoutLine {
                product_id: item.product_id.to_string(),
                product_name: product.name.clone(),
                unit_price: product.unit_price(),
                quantity: item.quantity,
                carret_value: item.carret_value,
            })
            .collect())
    }

    /// Place an order from the given cart.
    ///
    /// The cart must be non-empty and every product resolvable; those checks
    /// run before the order number is reserved, so a rejected placement leaves
    /// no trace. After the order document is written, stock decrement and cart
    /// clearing are best-effort: a failure in either is logged and the placed
    /// order stands.
    pub async fn place_order(
        &self,
        owner: Option<RecordId>,
        cart: &dyn CartStore,
        billing_address: Address,
        shipping_address: Address,
        payment_method: PaymentMethod,
        delivery_charges: f64,
    ) -> AppResult<Order> {
        let items = cart.get().await?;
        if items.is_empty() {
            return Err(AppError::new(ErrorCode::CartEmpty));
        }
        validate_address(&billing_address, "billing_address")?;
        validate_address(&shipping_address, "shipping_address")?;

        let resolved = self.resolve_items(&items).await?;

        let order_items: Vec<OrderItem> = resolved
            .iter()
            .map(|(product, item)| OrderItem {
                product_id: item.product_id.clone(),
                price: product.unit_price(),
                quantity: item.quantity,
                carret_value: item.carret_value,
                finger_size: item.finger_size,
                msg_note: item.msg_note.clone(),
            })
            .collect();

        let subtotal: f64 = order_items.iter().map(OrderItem::line_total).sum();
        let order_number = self.orders.next_order_number().await?;

        let order = Order {
            id: None,
            user_id: owner.clone(),
            order_number,
            status: OrderStatus::Pending,
            billing_address,
            shipping_address,
            payment_method,
            total_amount: subtotal + delivery_charges,
            delivery_charges,
            order_items,
            created_at: now_millis(),
            cancelled_at: None,
            paid_at: None,
            refunded_at: None,
            external_order_id: None,
        };
        let order = self.orders.create(order).await?;

        for item in &order.order_items {
            match self.products.decrement_stock(&item.product_id, item.quantity).await {
                Ok(true) => {}
                Ok(false) => tracing::warn!(
                    product = %item.product_id,
                    "stock decrement skipped, product missing"
                ),
                Err(e) => tracing::warn!(
                    product = %item.product_id,
                    error = %e,
                    "stock decrement failed"
                ),
            }
        }

        if let Err(e) = cart.clear().await {
            tracing::warn!(error = %e, "cart clear after placement failed");
        }

        tracing::info!(
            order_number = order.order_number,
            total = order.total_amount,
            owner = owner.map(|o| o.to_string()).unwrap_or_else(|| "guest".into()),
            "order placed"
        );
        Ok(order)
    }

    /// Customer cancellation: owner only, from pending or paid.
    ///
    /// Stock restoration is best-effort; the cancellation stands even when a
    /// restore fails.
    pub async fn cancel_order(&self, caller: &CurrentUser, order_id: &RecordId) -> AppResult<Order> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

        // Owner only. Admin repairs go through the status override, which has
        // no inventory side effects.
        let is_owner = order
            .user_id
            .as_ref()
            .is_some_and(|owner| owner.to_string() == caller.id);
        if !is_owner {
            return Err(AppError::new(ErrorCode::PermissionDenied));
        }

        if !order.status.is_cancellable() {
            return Err(AppError::with_message(
                ErrorCode::OrderNotCancellable,
                format!("Order cannot be cancelled in status {}", order.status),
            ));
        }

        for item in &order.order_items {
            match self.products.restore_stock(&item.product_id, item.quantity).await {
                Ok(true) => {}
                Ok(false) => tracing::warn!(
                    product = %item.product_id,
                    "stock restore skipped, product missing"
                ),
                Err(e) => tracing::warn!(
                    product = %item.product_id,
                    error = %e,
                    "stock restore failed"
                ),
            }
        }

        let cancelled = self.orders.mark_cancelled(order_id, now_millis()).await?;
        tracing::info!(order_number = cancelled.order_number, "order cancelled");
        Ok(cancelled)
    }

    /// Privileged status override: no transition-graph validation and no
    /// inventory side effects, so support staff can repair drifted records.
    pub async fn admin_set_status(
        &self,
        order_id: &RecordId,
        status: OrderStatus,
    ) -> AppResult<Order> {
        let order = self.orders.set_status(order_id, status).await?;
        tracing::info!(order_number = order.order_number, status = %status, "status overridden");
        Ok(order)
    }

    /// Handle a successful-payment event: match the customer's most recent
    /// pending order created within the last five minutes and mark it paid.
    ///
    /// No match is not an error; the event is acknowledged and logged so the
    /// provider does not retry indefinitely.
    pub async fn record_payment(
        &self,
        user_id: &RecordId,
        external_order_id: &str,
    ) -> AppResult<Option<Order>> {
        let cutoff = now_millis() - PAYMENT_MATCH_WINDOW_MS;
        let Some(order) = self.orders.find_recent_pending(user_id, cutoff).await? else {
            tracing::warn!(
                user = %user_id,
                external_order_id,
                "payment received with no matching pending order"
            );
            return Ok(None);
        };

        let id = order
            .id
            .ok_or_else(|| AppError::internal("Order record has no id"))?;
        let paid = self
            .orders
            .mark_paid(&id, external_order_id, now_millis())
            .await?;
        tracing::info!(order_number = paid.order_number, external_order_id, "order paid");
        Ok(Some(paid))
    }

    /// Handle a refund event: record the marker on the matching order.
    ///
    /// Inventory is left alone; refunds are resolved by support, who decide
    /// per case whether goods come back into stock.
    pub async fn record_refund(&self, external_order_id: &str) -> AppResult<Option<Order>> {
        let Some(order) = self.orders.find_by_external_id(external_order_id).await? else {
            tracing::warn!(external_order_id, "refund received for unknown order");
            return Ok(None);
        };

        let id = order
            .id
            .ok_or_else(|| AppError::internal("Order record has no id"))?;
        let refunded = self.orders.mark_refunded(&id, now_millis()).await?;
        tracing::info!(order_number = refunded.order_number, "order refunded");
        Ok(Some(refunded))
    }
}

fn validate_address(address: &Address, field: &str) -> AppResult<()> {
    let required = [
        ("full_name", &address.full_name),
        ("phone", &address.phone),
        ("address", &address.address),
        ("city", &address.city),
    ];
    for (name, value) in required {
        if value.trim().is_empty() {
            return Err(AppError::with_message(
                ErrorCode::RequiredField,
                format!("{field}.{name} is required"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::GuestCart;
    use crate::db::DbService;
    use shared::models::{CartItemInput, ProductCreate};

    async fn setup() -> (DbService, OrderService) {
        let db = DbService::memory().await.unwrap();
        let service = OrderService::new(
            ProductRepository::new(db.db.clone()),
            OrderRepository::new(db.db.clone()),
        );
        (db, service)
    }

    async fn seed_product(db: &DbService, name: &str, price: f64, stock: i64) -> Product {
        ProductRepository::new(db.db.clone())
            .create(ProductCreate {
                name: name.to_string(),
                slug: name.to_lowercase().replace(' ', "-"),
                description: None,
                price,
                discount_price: None,
                stock_quantity: stock,
                carret_rate: Default::default(),
                images: Vec::new(),
            })
            .await
            .unwrap()
    }

    fn address() -> Address {
        Address {
            full_name: "Alice Example".into(),
            phone: "+1-555-0100".into(),
            address: "1 Gem Street".into(),
            city: "Jaipur".into(),
            state: None,
            postal_code: None,
            country: None,
        }
    }

    fn cart_of(lines: Vec<(RecordId, i64, f64)>) -> GuestCart {
        GuestCart::from_lines(
            lines
                .into_iter()
                .map(|(product_id, quantity, carret_value)| CartItemInput {
                    product_id,
                    quantity,
                    finger_size: None,
                    carret_value,
                    msg_note: None,
                })
                .collect(),
        )
    }

    fn customer(id: &RecordId) -> CurrentUser {
        CurrentUser {
            id: id.to_string(),
            email: "alice@example.com".into(),
            role: "customer".into(),
        }
    }

    async fn place(
        service: &OrderService,
        owner: Option<RecordId>,
        cart: &GuestCart,
        delivery: f64,
    ) -> AppResult<Order> {
        service
            .place_order(
                owner,
                cart,
                address(),
                address(),
                PaymentMethod::FullAdvance,
                delivery,
            )
            .await
    }

    #[tokio::test]
    async fn order_numbers_are_sequential_from_1000() {
        let (db, service) = setup().await;
        let ruby = seed_product(&db, "Ruby", 1000.0, 10).await;
        let ruby_id = ruby.id.unwrap();

        for expected in [1000, 1001, 1002] {
            let cart = cart_of(vec![(ruby_id.clone(), 1, 1.0)]);
            let order = place(&service, None, &cart, 0.0).await.unwrap();
            assert_eq!(order.order_number, expected);
        }
    }

    #[tokio::test]
    async fn total_multiplies_carat_and_adds_delivery() {
        let (db, service) = setup().await;
        let ruby = seed_product(&db, "Ruby", 1000.0, 10).await;
        let cart = cart_of(vec![(ruby.id.unwrap(), 2, 3.0)]);

        let order = place(&service, None, &cart, 200.0).await.unwrap();
        assert_eq!(order.total_amount, 6200.0);
        assert_eq!(order.delivery_charges, 200.0);
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn line_prices_survive_catalog_edits() {
        let (db, service) = setup().await;
        let ruby = seed_product(&db, "Ruby", 1000.0, 10).await;
        let ruby_id = ruby.id.unwrap();
        let cart = cart_of(vec![(ruby_id.clone(), 1, 1.0)]);

        let order = place(&service, None, &cart, 0.0).await.unwrap();

        db.db
            .query("UPDATE $product SET price = 9999.0")
            .bind(("product", ruby_id))
            .await
            .unwrap();

        let reloaded = service
            .orders()
            .find_by_id(&order.id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.order_items[0].price, 1000.0);
        assert_eq!(reloaded.total_amount, 1000.0);
    }

    #[tokio::test]
    async fn placement_decrements_stock_floored_at_zero() {
        let (db, service) = setup().await;
        let products = ProductRepository::new(db.db.clone());
        let ruby = seed_product(&db, "Ruby", 1000.0, 3).await;
        let ruby_id = ruby.id.unwrap();

        let cart = cart_of(vec![(ruby_id.clone(), 5, 1.0)]);
        let order = place(&service, None, &cart, 0.0).await.unwrap();

        // Oversell is allowed; the order stands and stock floors at zero.
        assert_eq!(order.order_items[0].quantity, 5);
        let after = products.find_by_id(&ruby_id).await.unwrap().unwrap();
        assert_eq!(after.stock_quantity, 0);
    }

    #[tokio::test]
    async fn empty_cart_is_rejected() {
        let (_db, service) = setup().await;
        let cart = cart_of(vec![]);

        let err = place(&service, None, &cart, 0.0).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CartEmpty);
    }

    #[tokio::test]
    async fn unknown_product_aborts_without_side_effects() {
        let (db, service) = setup().await;
        let products = ProductRepository::new(db.db.clone());
        let ruby = seed_product(&db, "Ruby", 1000.0, 10).await;
        let ruby_id = ruby.id.unwrap();
        let ghost: RecordId = "product:ghost".parse().unwrap();

        let cart = cart_of(vec![(ruby_id.clone(), 1, 1.0), (ghost, 1, 1.0)]);
        let err = place(&service, None, &cart, 0.0).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductNotFound);

        // Nothing was reserved for the valid line either
        let ruby_after = products.find_by_id(&ruby_id).await.unwrap().unwrap();
        assert_eq!(ruby_after.stock_quantity, 10);
        assert!(service.orders().find_all().await.unwrap().is_empty());

        // The counter never advanced, so the next order still gets 1000
        let cart = cart_of(vec![(ruby_id, 1, 1.0)]);
        let order = place(&service, None, &cart, 0.0).await.unwrap();
        assert_eq!(order.order_number, 1000);
    }

    #[tokio::test]
    async fn missing_address_field_is_rejected() {
        let (db, service) = setup().await;
        let ruby = seed_product(&db, "Ruby", 1000.0, 10).await;
        let cart = cart_of(vec![(ruby.id.unwrap(), 1, 1.0)]);

        let mut billing = address();
        billing.city = "  ".into();
        let err = service
            .place_order(None, &cart, billing, address(), PaymentMethod::Cod, 0.0)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);
    }

    #[tokio::test]
    async fn cancellation_restores_stock() {
        let (db, service) = setup().await;
        let products = ProductRepository::new(db.db.clone());
        let ruby = seed_product(&db, "Ruby", 1000.0, 10).await;
        let ruby_id = ruby.id.unwrap();
        let alice: RecordId = "user:alice".parse().unwrap();

        let cart = cart_of(vec![(ruby_id.clone(), 4, 1.0)]);
        let order = place(&service, Some(alice.clone()), &cart, 0.0)
            .await
            .unwrap();
        assert_eq!(
            products
                .find_by_id(&ruby_id)
                .await
                .unwrap()
                .unwrap()
                .stock_quantity,
            6
        );

        let cancelled = service
            .cancel_order(&customer(&alice), &order.id.unwrap())
            .await
            .unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert!(cancelled.cancelled_at.is_some());
        assert_eq!(
            products
                .find_by_id(&ruby_id)
                .await
                .unwrap()
                .unwrap()
                .stock_quantity,
            10
        );
    }

    #[tokio::test]
    async fn cancellation_blocked_after_transit() {
        let (db, service) = setup().await;
        let ruby = seed_product(&db, "Ruby", 1000.0, 10).await;
        let alice: RecordId = "user:alice".parse().unwrap();

        let cart = cart_of(vec![(ruby.id.unwrap(), 1, 1.0)]);
        let order = place(&service, Some(alice.clone()), &cart, 0.0)
            .await
            .unwrap();
        let order_id = order.id.unwrap();

        service
            .admin_set_status(&order_id, OrderStatus::InTransit)
            .await
            .unwrap();

        let err = service
            .cancel_order(&customer(&alice), &order_id)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderNotCancellable);
        assert!(err.message.contains("in_transit"));
    }

    #[tokio::test]
    async fn cancellation_requires_ownership() {
        let (db, service) = setup().await;
        let ruby = seed_product(&db, "Ruby", 1000.0, 10).await;
        let alice: RecordId = "user:alice".parse().unwrap();
        let mallory: RecordId = "user:mallory".parse().unwrap();

        let cart = cart_of(vec![(ruby.id.unwrap(), 1, 1.0)]);
        let order = place(&service, Some(alice), &cart, 0.0).await.unwrap();

        let err = service
            .cancel_order(&customer(&mallory), &order.id.unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
    }

    #[tokio::test]
    async fn admin_override_ignores_transition_rules() {
        let (db, service) = setup().await;
        let ruby = seed_product(&db, "Ruby", 1000.0, 10).await;

        let cart = cart_of(vec![(ruby.id.unwrap(), 1, 1.0)]);
        let order = place(&service, None, &cart, 0.0).await.unwrap();
        let order_id = order.id.unwrap();

        service
            .admin_set_status(&order_id, OrderStatus::Delivered)
            .await
            .unwrap();
        let reverted = service
            .admin_set_status(&order_id, OrderStatus::Pending)
            .await
            .unwrap();
        assert_eq!(reverted.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn payment_marks_most_recent_pending_order() {
        let (db, service) = setup().await;
        let ruby = seed_product(&db, "Ruby", 1000.0, 10).await;
        let ruby_id = ruby.id.unwrap();
        let alice: RecordId = "user:alice".parse().unwrap();

        let cart = cart_of(vec![(ruby_id.clone(), 1, 1.0)]);
        place(&service, Some(alice.clone()), &cart, 0.0)
            .await
            .unwrap();
        let cart = cart_of(vec![(ruby_id, 2, 1.0)]);
        let latest = place(&service, Some(alice.clone()), &cart, 0.0)
            .await
            .unwrap();

        let paid = service
            .record_payment(&alice, "ls-777")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(paid.order_number, latest.order_number);
        assert_eq!(paid.status, OrderStatus::Paid);
        assert_eq!(paid.external_order_id.as_deref(), Some("ls-777"));
        assert!(paid.paid_at.is_some());
    }

    #[tokio::test]
    async fn duplicate_payment_delivery_is_a_noop() {
        let (db, service) = setup().await;
        let ruby = seed_product(&db, "Ruby", 1000.0, 10).await;
        let alice: RecordId = "user:alice".parse().unwrap();

        let cart = cart_of(vec![(ruby.id.unwrap(), 1, 1.0)]);
        let order = place(&service, Some(alice.clone()), &cart, 0.0)
            .await
            .unwrap();

        let first = service.record_payment(&alice, "ls-111").await.unwrap();
        assert!(first.is_some());

        // Redelivery finds no pending order left to flip and changes nothing
        let second = service.record_payment(&alice, "ls-111").await.unwrap();
        assert!(second.is_none());

        let settled = service
            .orders()
            .find_by_id(&order.id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(settled.status, OrderStatus::Paid);
        assert_eq!(settled.external_order_id.as_deref(), Some("ls-111"));
    }

    #[tokio::test]
    async fn payment_ignores_stale_pending_orders() {
        let (db, service) = setup().await;
        let ruby = seed_product(&db, "Ruby", 1000.0, 10).await;
        let alice: RecordId = "user:alice".parse().unwrap();

        let cart = cart_of(vec![(ruby.id.unwrap(), 1, 1.0)]);
        let order = place(&service, Some(alice.clone()), &cart, 0.0)
            .await
            .unwrap();

        // Age the order past the matching window
        db.db
            .query("UPDATE $order SET created_at = $then")
            .bind(("order", order.id.clone().unwrap()))
            .bind(("then", now_millis() - PAYMENT_MATCH_WINDOW_MS - 1000))
            .await
            .unwrap();

        let matched = service.record_payment(&alice, "ls-888").await.unwrap();
        assert!(matched.is_none());

        let untouched = service
            .orders()
            .find_by_id(&order.id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(untouched.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn refund_records_marker_without_touching_stock() {
        let (db, service) = setup().await;
        let products = ProductRepository::new(db.db.clone());
        let ruby = seed_product(&db, "Ruby", 1000.0, 10).await;
        let ruby_id = ruby.id.unwrap();
        let alice: RecordId = "user:alice".parse().unwrap();

        let cart = cart_of(vec![(ruby_id.clone(), 2, 1.0)]);
        place(&service, Some(alice.clone()), &cart, 0.0)
            .await
            .unwrap();
        service.record_payment(&alice, "ls-999").await.unwrap();

        let refunded = service.record_refund("ls-999").await.unwrap().unwrap();
        assert!(refunded.refunded_at.is_some());
        assert_eq!(refunded.status, OrderStatus::Paid);
        assert_eq!(
            products
                .find_by_id(&ruby_id)
                .await
                .unwrap()
                .unwrap()
                .stock_quantity,
            8
        );

        assert!(service.record_refund("ls-never").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn guest_orders_have_no_owner() {
        let (db, service) = setup().await;
        let ruby = seed_product(&db, "Ruby", 1000.0, 10).await;

        let cart = cart_of(vec![(ruby.id.unwrap(), 1, 1.0)]);
        let order = place(&service, None, &cart, 0.0).await.unwrap();
        assert!(order.user_id.is_none());
    }
}
