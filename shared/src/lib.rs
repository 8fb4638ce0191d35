//! Shared types for the storefront platform
//!
//! Holds everything the server and tooling agree on:
//! - [`error`] - unified error codes, `AppError`, API response envelope
//! - [`models`] - persisted document models (Product, Cart, Order)
//! - [`util`] - small time helpers

pub mod error;
pub mod models;
pub mod util;

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
