use service_core::error::AppError;
use thiserror::Error;

/// Errors from the credential lifecycle.
///
/// Clone so a single in-flight token refresh can hand the same failure to
/// every caller waiting on it; payloads are therefore plain strings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authorization state mismatch")]
    CsrfStateMismatch,

    #[error("Missing required callback parameters")]
    MissingCallbackParameters,

    #[error("LinkedIn connection denied: {0}")]
    ConnectionDenied(String),

    #[error("Token exchange failed: {0}")]
    ExchangeError(String),

    #[error("Token refresh failed: {0}")]
    RefreshError(String),

    #[error("LinkedIn account not connected")]
    NotConnected,

    #[error("LinkedIn connection expired, please reconnect: {0}")]
    ReconnectRequired(String),

    #[error("LinkedIn token expired and cannot be refreshed, please reconnect")]
    TokenUnrefreshable,

    #[error("At least one platform is required")]
    EmptyPlatformSet,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("LinkedIn API error: {0}")]
    Provider(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<mongodb::error::Error> for ServiceError {
    fn from(err: mongodb::error::Error) -> Self {
        ServiceError::Database(err.to_string())
    }
}

impl From<redis::RedisError> for ServiceError {
    fn from(err: redis::RedisError) -> Self {
        ServiceError::Cache(err.to_string())
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Configuration(e) => AppError::ConfigError(anyhow::anyhow!(e)),
            ServiceError::CsrfStateMismatch => {
                AppError::AuthError(anyhow::anyhow!("Invalid or expired authorization state"))
            }
            ServiceError::MissingCallbackParameters => {
                AppError::BadRequest(anyhow::anyhow!("Missing code or state parameter"))
            }
            ServiceError::ConnectionDenied(e) => {
                AppError::BadRequest(anyhow::anyhow!("LinkedIn connection denied: {}", e))
            }
            ServiceError::ExchangeError(e) => {
                AppError::BadGateway(format!("LinkedIn token exchange failed: {}", e))
            }
            ServiceError::RefreshError(e) | ServiceError::ReconnectRequired(e) => {
                AppError::Unauthorized(anyhow::anyhow!(
                    "LinkedIn connection expired, please reconnect: {}",
                    e
                ))
            }
            ServiceError::TokenUnrefreshable => AppError::Unauthorized(anyhow::anyhow!(
                "LinkedIn token expired and cannot be refreshed, please reconnect"
            )),
            ServiceError::NotConnected => {
                AppError::NotFound(anyhow::anyhow!("LinkedIn account not connected"))
            }
            ServiceError::EmptyPlatformSet => {
                AppError::BadRequest(anyhow::anyhow!("At least one platform is required"))
            }
            ServiceError::Database(e) => AppError::DatabaseError(anyhow::anyhow!(e)),
            ServiceError::Cache(e) => AppError::CacheError(anyhow::anyhow!(e)),
            ServiceError::Provider(e) => AppError::BadGateway(e),
            ServiceError::Internal(e) => AppError::InternalError(anyhow::anyhow!(e)),
        }
    }
}
