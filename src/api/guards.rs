use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::api::errors::ApiError;
use crate::core::{security, state::AppState};

/// Admin access proven by presenting the service-role key as a bearer token.
///
/// Without a configured key (development only; strict config refuses to start
/// without one) every request is let through.
pub(crate) struct AdminKey;

#[async_trait]
impl FromRequestParts<AppState> for AdminKey {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.settings().supabase().service_role_key.as_deref() else {
            return Ok(AdminKey);
        };

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or(ApiError::Unauthorized("Missing API key"))?;

        if security::keys_match(token, expected) {
            Ok(AdminKey)
        } else {
            tracing::warn!(path = %parts.uri.path(), "Rejected admin request with a wrong key");
            Err(ApiError::Unauthorized("Invalid API key"))
        }
    }
}
