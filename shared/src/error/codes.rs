//! Unified error codes for the storefront platform
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Cart errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Product errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Serialized as a u16 for efficient transport and cross-language
/// compatibility with the storefront client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2003,

    // ==================== 3xxx: Cart ====================
    /// Cart contains no items
    CartEmpty = 3001,
    /// Cart does not exist for this customer
    CartNotFound = 3002,
    /// No cart line matches the given product variant
    CartItemNotFound = 3003,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order is not in a cancellable state
    OrderNotCancellable = 4002,

    // ==================== 5xxx: Payment ====================
    /// Hosted checkout session could not be created
    CheckoutFailed = 5001,
    /// Payment provider credentials are not configured
    PaymentConfigMissing = 5002,
    /// Webhook signature missing or mismatched
    WebhookSignatureInvalid = 5003,
    /// Webhook payload could not be processed
    WebhookInvalid = 5004,

    // ==================== 6xxx: Product ====================
    /// Product not found
    ProductNotFound = 6001,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
}

impl ErrorCode {
    /// Numeric value of this error code
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Default human-readable message for this error code
    pub fn message(&self) -> &'static str {
        match self {
            Self::Success => "OK",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::AlreadyExists => "Resource already exists",
            Self::InvalidRequest => "Invalid request",
            Self::RequiredField => "Required field missing",

            Self::NotAuthenticated => "Please login first",
            Self::TokenExpired => "Token expired",
            Self::TokenInvalid => "Invalid token",

            Self::PermissionDenied => "Permission denied",
            Self::AdminRequired => "Admin role required",

            Self::CartEmpty => "Cart is empty",
            Self::CartNotFound => "Cart not found",
            Self::CartItemNotFound => "Item not found",

            Self::OrderNotFound => "Order not found",
            Self::OrderNotCancellable => "Order cannot be cancelled",

            Self::CheckoutFailed => "Failed to create checkout",
            Self::PaymentConfigMissing => "Payment provider is not configured",
            Self::WebhookSignatureInvalid => "Invalid signature",
            Self::WebhookInvalid => "Webhook processing failed",

            Self::ProductNotFound => "Product not found",

            Self::InternalError => "Internal server error",
            Self::DatabaseError => "Database error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> u16 {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into [`ErrorCode`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => Self::Success,
            1 => Self::Unknown,
            2 => Self::ValidationFailed,
            3 => Self::NotFound,
            4 => Self::AlreadyExists,
            5 => Self::InvalidRequest,
            7 => Self::RequiredField,

            1001 => Self::NotAuthenticated,
            1003 => Self::TokenExpired,
            1004 => Self::TokenInvalid,

            2001 => Self::PermissionDenied,
            2003 => Self::AdminRequired,

            3001 => Self::CartEmpty,
            3002 => Self::CartNotFound,
            3003 => Self::CartItemNotFound,

            4001 => Self::OrderNotFound,
            4002 => Self::OrderNotCancellable,

            5001 => Self::CheckoutFailed,
            5002 => Self::PaymentConfigMissing,
            5003 => Self::WebhookSignatureInvalid,
            5004 => Self::WebhookInvalid,

            6001 => Self::ProductNotFound,

            9001 => Self::InternalError,
            9002 => Self::DatabaseError,

            other => return Err(InvalidErrorCode(other)),
        };
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_all_codes() {
        for code in [
            ErrorCode::Success,
            ErrorCode::ValidationFailed,
            ErrorCode::NotAuthenticated,
            ErrorCode::PermissionDenied,
            ErrorCode::CartEmpty,
            ErrorCode::OrderNotCancellable,
            ErrorCode::WebhookSignatureInvalid,
            ErrorCode::ProductNotFound,
            ErrorCode::DatabaseError,
        ] {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert_eq!(ErrorCode::try_from(7777), Err(InvalidErrorCode(7777)));
    }
}
