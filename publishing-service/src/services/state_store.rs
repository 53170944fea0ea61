use crate::models::AuthorizationState;
use crate::services::error::ServiceError;
use crate::services::redis::RedisService;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Pending authorization states, at most one per owner.
#[async_trait]
pub trait AuthorizationStateStore: Send + Sync {
    /// Stores `state` for its owner, replacing any pending one.
    async fn save(&self, state: &AuthorizationState, ttl: Duration) -> Result<(), ServiceError>;

    /// Atomically removes the owner's pending state if it equals `value`.
    /// Returns false on mismatch, expiry or when nothing is pending.
    async fn consume(&self, owner_id: &str, value: &str) -> Result<bool, ServiceError>;

    async fn health_check(&self) -> Result<(), ServiceError>;
}

#[async_trait]
impl AuthorizationStateStore for RedisService {
    async fn save(&self, state: &AuthorizationState, ttl: Duration) -> Result<(), ServiceError> {
        self.put_state(&state.owner_id, &state.value, ttl)
            .await
            .map_err(|e| ServiceError::Cache(format!("Failed to store authorization state: {}", e)))
    }

    async fn consume(&self, owner_id: &str, value: &str) -> Result<bool, ServiceError> {
        self.take_state(owner_id, value).await.map_err(|e| {
            ServiceError::Cache(format!("Failed to verify authorization state: {}", e))
        })
    }

    async fn health_check(&self) -> Result<(), ServiceError> {
        self.ping()
            .await
            .map_err(|e| ServiceError::Cache(format!("Redis health check failed: {}", e)))
    }
}

/// Process-local store used by tests and single-instance development.
#[derive(Default)]
pub struct InMemoryStateStore {
    states: Mutex<HashMap<String, (String, Instant)>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The pending value for an owner, if any and not expired.
    pub fn pending(&self, owner_id: &str) -> Option<String> {
        let states = self.states.lock().ok()?;
        states
            .get(owner_id)
            .filter(|(_, expires_at)| Instant::now() < *expires_at)
            .map(|(value, _)| value.clone())
    }
}

#[async_trait]
impl AuthorizationStateStore for InMemoryStateStore {
    async fn save(&self, state: &AuthorizationState, ttl: Duration) -> Result<(), ServiceError> {
        self.states
            .lock()
            .map_err(|e| ServiceError::Cache(format!("State store mutex poisoned: {}", e)))?
            .insert(
                state.owner_id.clone(),
                (state.value.clone(), Instant::now() + ttl),
            );
        Ok(())
    }

    async fn consume(&self, owner_id: &str, value: &str) -> Result<bool, ServiceError> {
        let mut states = self
            .states
            .lock()
            .map_err(|e| ServiceError::Cache(format!("State store mutex poisoned: {}", e)))?;

        let matches = match states.get(owner_id) {
            Some((stored, expires_at)) => stored == value && Instant::now() < *expires_at,
            None => false,
        };
        if matches {
            states.remove(owner_id);
        }
        Ok(matches)
    }

    async fn health_check(&self) -> Result<(), ServiceError> {
        Ok(())
    }
}
