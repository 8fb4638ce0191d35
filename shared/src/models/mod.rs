//! Persisted document models

pub mod cart;
pub mod order;
pub mod product;
pub mod serde_helpers;

pub use cart::{Cart, CartItem, CartItemInput, ResolvedCart, ResolvedCartItem};
pub use order::{Address, Order, OrderItem, OrderStatus, PaymentMethod};
pub use product::{CarretRate, Product, ProductCreate, ProductImage};
