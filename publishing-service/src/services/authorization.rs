use crate::models::{AuthorizationState, ConnectedProfile};
use crate::services::error::ServiceError;
use crate::services::state_store::AuthorizationStateStore;
use crate::services::token_manager::TokenLifecycleManager;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationStart {
    pub authorization_url: String,
    pub state: String,
}

/// Query parameters LinkedIn appends to the redirect URI.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Connected profile plus the owner recovered from the state value.
#[derive(Debug, Clone)]
pub struct CompletedAuthorization {
    pub owner_id: String,
    pub profile: ConnectedProfile,
}

/// OAuth handshake: builds the redirect and verifies single-use CSRF state on
/// the way back.
#[derive(Clone)]
pub struct AuthorizationFlow {
    states: Arc<dyn AuthorizationStateStore>,
    tokens: Arc<TokenLifecycleManager>,
    state_ttl: Duration,
}

impl AuthorizationFlow {
    pub fn new(
        states: Arc<dyn AuthorizationStateStore>,
        tokens: Arc<TokenLifecycleManager>,
        state_ttl: Duration,
    ) -> Self {
        Self {
            states,
            tokens,
            state_ttl,
        }
    }

    pub async fn start(&self, owner_id: &str) -> Result<AuthorizationStart, ServiceError> {
        let state = AuthorizationState::mint(owner_id, Utc::now());
        self.states.save(&state, self.state_ttl).await?;

        let authorization_url = self.tokens.client().authorization_url(&state.value)?;

        tracing::info!(owner_id = %owner_id, "LinkedIn authorization started");
        Ok(AuthorizationStart {
            authorization_url,
            state: state.value,
        })
    }

    pub async fn complete_callback(
        &self,
        params: CallbackParams,
    ) -> Result<CompletedAuthorization, ServiceError> {
        if let Some(error) = params.error {
            // The pending state is spent even though nothing is exchanged.
            if let Some(parsed) = params.state.as_deref().and_then(AuthorizationState::parse) {
                self.states.consume(&parsed.owner_id, &parsed.value).await?;
            }
            let detail = params.error_description.unwrap_or(error);
            tracing::warn!(error = %detail, "LinkedIn authorization denied");
            return Err(ServiceError::ConnectionDenied(detail));
        }

        let (Some(code), Some(state)) = (params.code, params.state) else {
            return Err(ServiceError::MissingCallbackParameters);
        };

        let Some(parsed) = AuthorizationState::parse(&state) else {
            tracing::warn!("Malformed LinkedIn authorization state");
            return Err(ServiceError::CsrfStateMismatch);
        };

        if !self.states.consume(&parsed.owner_id, &state).await? {
            tracing::warn!(
                owner_id = %parsed.owner_id,
                "LinkedIn authorization state mismatch, expired or replayed"
            );
            return Err(ServiceError::CsrfStateMismatch);
        }

        let bundle = self.tokens.exchange(&code).await?;
        let profile = self.tokens.connect(&parsed.owner_id, &bundle).await?;

        Ok(CompletedAuthorization {
            owner_id: parsed.owner_id,
            profile,
        })
    }
}
