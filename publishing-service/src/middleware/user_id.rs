use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use service_core::error::AppError;

pub const USER_ID_HEADER: &str = "X-User-ID";

/// Owner of the LinkedIn connection, taken from `X-User-ID`.
///
/// The header is set by the trusted front end after it has authenticated the
/// user; this service never sees end-user credentials for its own API.
#[derive(Debug, Clone)]
pub struct OwnerId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for OwnerId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let owner_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                AppError::AuthError(anyhow::anyhow!("Missing X-User-ID header"))
            })?;

        tracing::Span::current().record("owner_id", owner_id);

        Ok(OwnerId(owner_id.to_string()))
    }
}
