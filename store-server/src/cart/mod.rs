//! Cart aggregate
//!
//! A cart line's identity is the (product, finger size, carat value) triple.
//! Adding the same triple twice merges into one line by summing quantity;
//! changing the carat value or finger size is a different item, not an update
//! to the same one, because price depends on those variant fields.
//!
//! Authenticated customers get a server-backed cart ([`ServerCart`]); guests
//! keep an equivalent structure client-side and hand it over at checkout as a
//! [`GuestCart`]. The order builder only ever sees the [`CartStore`] trait.

use async_trait::async_trait;
use shared::error::ErrorCode;
use shared::models::{CartItem, CartItemInput};
use shared::{AppError, AppResult};
use std::sync::Mutex;
use surrealdb::RecordId;

use crate::db::repository::CartRepository;

/// Index of the line matching the (product, finger size, carat value) triple
pub fn find_line(
    items: &[CartItem],
    product_id: &RecordId,
    finger_size: Option<f64>,
    carret_value: f64,
) -> Option<usize> {
    items
        .iter()
        .position(|i| i.matches(product_id, finger_size, carret_value))
}

/// Merge a new line into the list: an existing line with the same triple has
/// its quantity incremented (and variant fields overwritten with the supplied
/// values); otherwise the line is appended.
pub fn merge_line(items: &mut Vec<CartItem>, input: CartItemInput) {
    match find_line(items, &input.product_id, input.finger_size, input.carret_value) {
        Some(idx) => {
            items[idx].quantity += input.quantity;
            items[idx].finger_size = input.finger_size;
            items[idx].carret_value = input.carret_value;
        }
        None => items.push(input.into()),
    }
}

/// Set the quantity of the line matching the triple. A quantity of zero or
/// less removes the line. Returns an error when no line matches.
pub fn set_line_quantity(items: &mut Vec<CartItem>, input: &CartItemInput) -> AppResult<()> {
    let idx = find_line(items, &input.product_id, input.finger_size, input.carret_value)
        .ok_or_else(|| AppError::new(ErrorCode::CartItemNotFound))?;

    if input.quantity <= 0 {
        items.remove(idx);
        return Ok(());
    }

    items[idx].quantity = input.quantity;
    if let Some(fs) = input.finger_size {
        items[idx].finger_size = Some(fs);
    }
    if input.carret_value != 0.0 {
        items[idx].carret_value = input.carret_value;
    }
    Ok(())
}

/// Remove the line matching the triple entirely. Errors when no line matches.
pub fn remove_line(
    items: &mut Vec<CartItem>,
    product_id: &RecordId,
    finger_size: Option<f64>,
    carret_value: f64,
) -> AppResult<()> {
    let idx = find_line(items, product_id, finger_size, carret_value)
        .ok_or_else(|| AppError::new(ErrorCode::CartItemNotFound))?;
    items.remove(idx);
    Ok(())
}

/// Capability interface over a customer's cart.
///
/// The order builder depends only on this trait, never on whether the lines
/// came from the server-side collection or a guest-supplied snapshot.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Current line items
    async fn get(&self) -> AppResult<Vec<CartItem>>;

    /// Add a line (merging by the identity triple); returns the updated items
    async fn add(&self, input: CartItemInput) -> AppResult<Vec<CartItem>>;

    /// Set a line's quantity (≤ 0 removes it); returns the updated items
    async fn update_quantity(&self, input: CartItemInput) -> AppResult<Vec<CartItem>>;

    /// Remove the line matching the triple; returns the updated items
    async fn remove(
        &self,
        product_id: RecordId,
        finger_size: Option<f64>,
        carret_value: f64,
    ) -> AppResult<Vec<CartItem>>;

    /// Empty the cart (after a successful order)
    async fn clear(&self) -> AppResult<()>;
}

/// Server-backed cart of an authenticated customer
pub struct ServerCart {
    repo: CartRepository,
    user_id: RecordId,
}

impl ServerCart {
    pub fn new(repo: CartRepository, user_id: RecordId) -> Self {
        Self { repo, user_id }
    }

    async fn save(&self, cart_id: &RecordId, items: Vec<CartItem>) -> AppResult<Vec<CartItem>> {
        let cart = self.repo.save_items(cart_id, items).await?;
        Ok(cart.items)
    }

    fn cart_id(cart: &shared::models::Cart) -> AppResult<RecordId> {
        cart.id
            .clone()
            .ok_or_else(|| AppError::internal("Cart record has no id"))
    }
}

#[async_trait]
impl CartStore for ServerCart {
    async fn get(&self) -> AppResult<Vec<CartItem>> {
        let cart = self.repo.get_or_create(&self.user_id).await?;
        Ok(cart.items)
    }

    async fn add(&self, input: CartItemInput) -> AppResult<Vec<CartItem>> {
        let cart = self.repo.get_or_create(&self.user_id).await?;
        let cart_id = Self::cart_id(&cart)?;
        let mut items = cart.items;
        merge_line(&mut items, input);
        self.save(&cart_id, items).await
    }

    async fn update_quantity(&self, input: CartItemInput) -> AppResult<Vec<CartItem>> {
        let cart = self
            .repo
            .find_by_user(&self.user_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::CartNotFound))?;
        let cart_id = Self::cart_id(&cart)?;
        let mut items = cart.items;
        set_line_quantity(&mut items, &input)?;
        self.save(&cart_id, items).await
    }

    async fn remove(
        &self,
        product_id: RecordId,
        finger_size: Option<f64>,
        carret_value: f64,
    ) -> AppResult<Vec<CartItem>> {
        let cart = self
            .repo
            .find_by_user(&self.user_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::CartNotFound))?;
        let cart_id = Self::cart_id(&cart)?;
        let mut items = cart.items;
        remove_line(&mut items, &product_id, finger_size, carret_value)?;
        self.save(&cart_id, items).await
    }

    async fn clear(&self) -> AppResult<()> {
        self.repo.clear(&self.user_id).await?;
        Ok(())
    }
}

/// Guest cart: a client-supplied snapshot held in memory for the duration of
/// one checkout. The server never persists it; `clear` is a no-op because the
/// client owns the guest cart.
pub struct GuestCart {
    items: Mutex<Vec<CartItem>>,
}

impl GuestCart {
    pub fn from_lines(lines: Vec<CartItemInput>) -> Self {
        // Merge duplicate triples defensively so a sloppy client payload still
        // satisfies the one-line-per-triple invariant.
        let mut items = Vec::new();
        for line in lines {
            merge_line(&mut items, line);
        }
        Self {
            items: Mutex::new(items),
        }
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, Vec<CartItem>>> {
        self.items
            .lock()
            .map_err(|_| AppError::internal("Guest cart lock poisoned"))
    }
}

#[async_trait]
impl CartStore for GuestCart {
    async fn get(&self) -> AppResult<Vec<CartItem>> {
        Ok(self.lock()?.clone())
    }

    async fn add(&self, input: CartItemInput) -> AppResult<Vec<CartItem>> {
        let mut items = self.lock()?;
        merge_line(&mut items, input);
        Ok(items.clone())
    }

    async fn update_quantity(&self, input: CartItemInput) -> AppResult<Vec<CartItem>> {
        let mut items = self.lock()?;
        set_line_quantity(&mut items, &input)?;
        Ok(items.clone())
    }

    async fn remove(
        &self,
        product_id: RecordId,
        finger_size: Option<f64>,
        carret_value: f64,
    ) -> AppResult<Vec<CartItem>> {
        let mut items = self.lock()?;
        remove_line(&mut items, &product_id, finger_size, carret_value)?;
        Ok(items.clone())
    }

    async fn clear(&self) -> AppResult<()> {
        Ok(())
    }
}
