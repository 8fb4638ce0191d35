//! Auth extractors
//!
//! Handlers declare their access requirement through the extractor they take:
//! [`CurrentUser`] for authenticated customers, [`AdminUser`] for the admin
//! console, and [`OptionalUser`] where guests are welcome (order placement).

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::AppError;

use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::state::AppState;

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Reuse an identity already established earlier in this request
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let auth_header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let token = match auth_header {
            Some(header) => JwtService::extract_from_header(header)
                .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
            None => return Err(AppError::unauthorized()),
        };

        match state.jwt().validate_token(token) {
            Ok(claims) => {
                let user = CurrentUser::from(claims);
                parts.extensions.insert(user.clone());
                Ok(user)
            }
            Err(e) => {
                tracing::warn!(error = %e, uri = %parts.uri, "authentication failed");
                match e {
                    JwtError::ExpiredToken => Err(AppError::token_expired()),
                    _ => Err(AppError::invalid_token("Invalid token")),
                }
            }
        }
    }
}

/// The caller's identity if a valid token was sent, `None` for guests.
///
/// A present-but-invalid token is still rejected; anonymity has to be
/// explicit, not the result of a broken credential.
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if parts.headers.get(http::header::AUTHORIZATION).is_none() {
            return Ok(OptionalUser(None));
        }
        let user = CurrentUser::from_request_parts(parts, state).await?;
        Ok(OptionalUser(Some(user)))
    }
}

/// An authenticated caller with the admin role
#[derive(Debug, Clone)]
pub struct AdminUser(pub CurrentUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            tracing::warn!(user = %user.id, uri = %parts.uri, "admin access denied");
            return Err(AppError::admin_required());
        }
        Ok(AdminUser(user))
    }
}
