//! Authentication: JWT issuance/validation and request extractors

pub mod extractor;
pub mod jwt;

pub use extractor::{AdminUser, OptionalUser};
pub use jwt::{Claims, CurrentUser, JwtError, JwtService};
