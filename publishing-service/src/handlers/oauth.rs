//! LinkedIn connection endpoints: start, callback, status and disconnect.

use crate::dtos::{AuthorizationUrlResponse, DisconnectResponse};
use crate::middleware::OwnerId;
use crate::models::ConnectionStatus;
use crate::services::authorization::CallbackParams;
use crate::AppState;
use axum::{
    extract::{Query, State},
    response::Redirect,
    Json,
};
use reqwest::Url;
use service_core::error::AppError;

pub async fn start_authorization(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
) -> Result<Json<AuthorizationUrlResponse>, AppError> {
    let start = state.authorization.start(&owner_id).await?;

    Ok(Json(AuthorizationUrlResponse {
        auth_url: start.authorization_url,
        state: start.state,
    }))
}

/// Where LinkedIn sends the browser back. Always answers with a redirect to
/// the front end; failures travel as `linkedin_error`.
pub async fn authorization_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect, AppError> {
    let frontend = &state.config.oauth.frontend_url;

    match state.authorization.complete_callback(params).await {
        Ok(completed) => {
            tracing::info!(
                owner_id = %completed.owner_id,
                provider_user_id = %completed.profile.provider_user_id,
                "LinkedIn account connected"
            );
            frontend_redirect(
                frontend,
                &[
                    ("linkedin_connected", "true"),
                    ("message", "LinkedIn account connected successfully"),
                ],
            )
        }
        Err(e) => {
            tracing::warn!(error = %e, "LinkedIn authorization callback failed");
            let message = e.to_string();
            frontend_redirect(frontend, &[("linkedin_error", message.as_str())])
        }
    }
}

pub async fn connection_status(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
) -> Result<Json<ConnectionStatus>, AppError> {
    Ok(Json(state.tokens.status(&owner_id).await?))
}

pub async fn disconnect(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
) -> Result<Json<DisconnectResponse>, AppError> {
    state.tokens.disconnect(&owner_id).await?;

    Ok(Json(DisconnectResponse {
        message: "LinkedIn account disconnected".to_string(),
        is_connected: false,
    }))
}

fn frontend_redirect(frontend_url: &str, params: &[(&str, &str)]) -> Result<Redirect, AppError> {
    let mut url = Url::parse(frontend_url)
        .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Invalid FRONTEND_URL: {}", e)))?;
    url.query_pairs_mut().extend_pairs(params);
    Ok(Redirect::to(url.as_str()))
}
