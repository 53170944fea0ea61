pub mod structured;

use crate::models::{PublishFailureKind, PublishStrategy};
use crate::services::error::ServiceError;
use async_trait::async_trait;
use thiserror::Error;

pub use structured::{
    compose_post_text, truncate_content, StructuredApiPublisher, HIRING_HEADLINE, MAX_CONTENT_CHARS,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PublishError {
    #[error("LinkedIn account not connected")]
    NotConnected,

    #[error("LinkedIn token expired and cannot be refreshed, please reconnect")]
    TokenUnrefreshable,

    #[error("LinkedIn connection expired, please reconnect: {0}")]
    ReconnectRequired(String),

    /// LinkedIn refused the bearer token; one refresh-and-retry may help.
    #[error("LinkedIn rejected the access token: {0}")]
    TokenRejected(String),

    #[error("LinkedIn rejected the post: {0}")]
    ProviderRejected(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PublishError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, PublishError::TokenRejected(_))
    }

    pub fn kind(&self) -> PublishFailureKind {
        match self {
            PublishError::NotConnected => PublishFailureKind::NotConnected,
            PublishError::TokenUnrefreshable
            | PublishError::ReconnectRequired(_)
            | PublishError::TokenRejected(_) => PublishFailureKind::ReconnectRequired,
            PublishError::ProviderRejected(_) => PublishFailureKind::ProviderRejected,
            PublishError::Internal(_) => PublishFailureKind::Internal,
        }
    }
}

impl From<ServiceError> for PublishError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotConnected => PublishError::NotConnected,
            ServiceError::TokenUnrefreshable => PublishError::TokenUnrefreshable,
            ServiceError::ReconnectRequired(e)
            | ServiceError::RefreshError(e)
            | ServiceError::ExchangeError(e) => PublishError::ReconnectRequired(e),
            ServiceError::Provider(e) => PublishError::ProviderRejected(e),
            other => PublishError::Internal(other.to_string()),
        }
    }
}

/// Content handed to a publisher.
#[derive(Debug, Clone)]
pub struct PublishContent {
    pub content: String,
    pub title: Option<String>,
    pub image_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostReceipt {
    pub post_id: Option<String>,
    pub truncated: bool,
}

/// One platform's publishing strategy, registered with the orchestrator.
#[async_trait]
pub trait Publisher: Send + Sync {
    fn platform(&self) -> &str;

    fn strategy(&self) -> PublishStrategy;

    async fn publish(
        &self,
        owner_id: &str,
        content: &PublishContent,
    ) -> Result<PostReceipt, PublishError>;
}
