//! Unified error system for the storefront platform
//!
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//! - [`ApiResponse`]: Unified API response format
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Cart errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Product errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! // Create a simple error
//! let err = AppError::new(ErrorCode::OrderNotFound);
//!
//! // Create an error with custom message
//! let err = AppError::with_message(
//!     ErrorCode::OrderNotCancellable,
//!     "Cannot cancel order with status: delivered",
//! );
//!
//! // Convert to API response body
//! let response = ApiResponse::error(&err);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};

use axum::Json;
use axum::response::{IntoResponse, Response};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // 5xx causes are logged server-side; clients only ever see the
        // structured JSON body, never a stack trace.
        if self.http_status().is_server_error() {
            tracing::error!(
                code = %self.code,
                category = ?ErrorCategory::from(self.code),
                message = %self.message,
                "request failed"
            );
        }
        let status = self.http_status();
        let body = ApiResponse::error(&self);
        (status, Json(body)).into_response()
    }
}
