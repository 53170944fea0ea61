use crate::models::{ConnectedProfile, ConnectionStatus, LinkedInCredential, TokenBundle};
use crate::services::credential_store::CredentialStore;
use crate::services::error::ServiceError;
use crate::services::linkedin::{LinkedInClient, LinkedInError};
use crate::services::metrics;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use mongodb::bson;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

type RefreshFlight = Shared<BoxFuture<'static, Result<TokenBundle, ServiceError>>>;

/// Owns every mutation of LinkedIn credentials: exchange, connect, refresh,
/// expiry marking and disconnect.
///
/// Refreshes are single-flight per owner. Concurrent callers for one owner
/// await the same shared future and observe the same bundle or the same
/// error; different owners never contend.
pub struct TokenLifecycleManager {
    client: Arc<LinkedInClient>,
    store: Arc<dyn CredentialStore>,
    in_flight: DashMap<String, (u64, RefreshFlight)>,
    next_flight_id: AtomicU64,
}

impl TokenLifecycleManager {
    pub fn new(client: Arc<LinkedInClient>, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            client,
            store,
            in_flight: DashMap::new(),
            next_flight_id: AtomicU64::new(0),
        }
    }

    pub fn client(&self) -> &Arc<LinkedInClient> {
        &self.client
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn is_valid(credential: &LinkedInCredential, now: DateTime<Utc>) -> bool {
        credential.has_valid_access_token(now)
    }

    /// Trades an authorization code for tokens.
    pub async fn exchange(&self, code: &str) -> Result<TokenBundle, ServiceError> {
        let response = self.client.exchange_code(code).await.map_err(|e| {
            tracing::warn!(error = %e, "LinkedIn code exchange failed");
            ServiceError::ExchangeError(e.to_string())
        })?;
        Ok(response.into_bundle())
    }

    /// Fetches the LinkedIn identity for `bundle` and stores the owner's
    /// credential as connected.
    pub async fn connect(
        &self,
        owner_id: &str,
        bundle: &TokenBundle,
    ) -> Result<ConnectedProfile, ServiceError> {
        let profile: ConnectedProfile = self
            .client
            .userinfo(&bundle.access_token)
            .await
            .map_err(|e| {
                tracing::warn!(owner_id = %owner_id, error = %e, "LinkedIn profile lookup failed");
                ServiceError::Provider(format!("Failed to fetch LinkedIn profile: {}", e))
            })?
            .into();

        let mut credential = self
            .store
            .find(owner_id)
            .await?
            .unwrap_or_else(|| LinkedInCredential::new(owner_id.to_string()));

        credential.apply_bundle(bundle);
        credential.apply_profile(&profile);
        credential.is_connected = true;
        credential.last_connected_at = Some(bson::DateTime::now());

        self.store.save(&credential).await?;

        tracing::info!(
            owner_id = %owner_id,
            provider_user_id = %profile.provider_user_id,
            "LinkedIn account connected"
        );
        Ok(profile)
    }

    /// Returns a usable access token, refreshing at most once across all
    /// concurrent callers for the owner.
    pub async fn ensure_valid(&self, owner_id: &str) -> Result<TokenBundle, ServiceError> {
        let credential = load_connected(self.store.as_ref(), owner_id).await?;
        if let Some(bundle) = current_bundle(&credential, Utc::now()) {
            return Ok(bundle);
        }

        self.refresh_single_flight(owner_id, false).await
    }

    /// Refreshes even though the stored token has not expired, for a token
    /// LinkedIn has just rejected. The stored credential only changes when
    /// the refresh succeeds.
    pub async fn force_refresh(&self, owner_id: &str) -> Result<TokenBundle, ServiceError> {
        self.refresh_single_flight(owner_id, true).await
    }

    async fn refresh_single_flight(
        &self,
        owner_id: &str,
        forced: bool,
    ) -> Result<TokenBundle, ServiceError> {
        let (flight_id, flight) = match self.in_flight.entry(owner_id.to_string()) {
            Entry::Occupied(entry) => {
                let (id, flight) = entry.get();
                tracing::debug!(owner_id = %owner_id, "Joining in-flight token refresh");
                (*id, flight.clone())
            }
            Entry::Vacant(entry) => {
                let id = self.next_flight_id.fetch_add(1, Ordering::Relaxed);
                let flight = refresh_flight(
                    self.client.clone(),
                    self.store.clone(),
                    owner_id.to_string(),
                    forced,
                )
                .boxed()
                .shared();
                entry.insert((id, flight.clone()));
                (id, flight)
            }
        };

        let result = flight.await;

        // A newer flight may already occupy the slot; only remove our own.
        self.in_flight.remove_if(owner_id, |_, (id, _)| *id == flight_id);

        result
    }

    /// Forces the next `ensure_valid` to refresh.
    pub async fn mark_expired(&self, owner_id: &str) -> Result<(), ServiceError> {
        let Some(mut credential) = self.store.find(owner_id).await? else {
            return Ok(());
        };
        if credential.access_token.is_none() {
            return Ok(());
        }

        credential.token_expiry = Some(bson::DateTime::now());
        credential.updated_at = Utc::now();
        self.store.save(&credential).await?;

        tracing::info!(owner_id = %owner_id, "LinkedIn token marked expired");
        Ok(())
    }

    /// Userinfo round trip with the provider error kept, so callers can tell
    /// a revoked token (401) from an outage.
    pub async fn probe_liveness(&self, access_token: &str) -> Result<(), LinkedInError> {
        self.client.userinfo(access_token).await.map(|_| ())
    }

    /// Whether LinkedIn still accepts `access_token`. Any rejection or
    /// transport failure counts as not live.
    pub async fn validate_liveness(&self, access_token: &str) -> bool {
        match self.probe_liveness(access_token).await {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(error = %e, "LinkedIn token liveness probe failed");
                false
            }
        }
    }

    /// Connection summary for the owner. An expired token is refreshed when
    /// possible; a failed refresh is logged and reported as an invalid token.
    pub async fn status(&self, owner_id: &str) -> Result<ConnectionStatus, ServiceError> {
        let Some(mut credential) = self.store.find(owner_id).await? else {
            return Ok(ConnectionStatus::disconnected());
        };
        if !credential.is_connected {
            return Ok(ConnectionStatus::disconnected());
        }

        let mut token_valid = Self::is_valid(&credential, Utc::now());
        if !token_valid && credential.refresh_token.is_some() {
            match self.ensure_valid(owner_id).await {
                Ok(_) => {
                    token_valid = true;
                    if let Some(refreshed) = self.store.find(owner_id).await? {
                        credential = refreshed;
                    }
                }
                Err(e) => {
                    tracing::warn!(owner_id = %owner_id, error = %e, "Status refresh failed");
                }
            }
        }

        Ok(ConnectionStatus {
            is_connected: credential.is_connected,
            token_valid,
            last_connected_at: credential.last_connected_at(),
            provider_email: credential.provider_email.clone(),
            profile: credential.profile.clone(),
        })
    }

    /// Clears tokens and profile but keeps the record.
    pub async fn disconnect(&self, owner_id: &str) -> Result<(), ServiceError> {
        let Some(mut credential) = self.store.find(owner_id).await? else {
            tracing::debug!(owner_id = %owner_id, "Disconnect requested with no stored credential");
            return Ok(());
        };

        credential.clear();
        self.store.save(&credential).await?;

        tracing::info!(owner_id = %owner_id, "LinkedIn account disconnected");
        Ok(())
    }
}

async fn load_connected(
    store: &dyn CredentialStore,
    owner_id: &str,
) -> Result<LinkedInCredential, ServiceError> {
    match store.find(owner_id).await? {
        Some(credential) if credential.is_connected && credential.access_token.is_some() => {
            Ok(credential)
        }
        _ => Err(ServiceError::NotConnected),
    }
}

fn current_bundle(credential: &LinkedInCredential, now: DateTime<Utc>) -> Option<TokenBundle> {
    if TokenLifecycleManager::is_valid(credential, now) {
        credential.bundle()
    } else {
        None
    }
}

/// The shared unit of work behind a single-flight refresh.
///
/// Re-reads the credential first: unless `forced`, a caller arriving after an
/// earlier flight persisted fresh tokens gets those instead of refreshing
/// again.
async fn refresh_flight(
    client: Arc<LinkedInClient>,
    store: Arc<dyn CredentialStore>,
    owner_id: String,
    forced: bool,
) -> Result<TokenBundle, ServiceError> {
    let mut credential = load_connected(store.as_ref(), &owner_id).await?;
    if !forced {
        if let Some(bundle) = current_bundle(&credential, Utc::now()) {
            return Ok(bundle);
        }
    }

    let Some(refresh_token) = credential.refresh_token.clone().filter(|t| !t.is_empty()) else {
        tracing::warn!(owner_id = %owner_id, forced, "LinkedIn token unusable with no refresh token");
        return Err(ServiceError::TokenUnrefreshable);
    };

    tracing::info!(owner_id = %owner_id, "Refreshing LinkedIn access token");

    let response = client.refresh_token(&refresh_token).await.map_err(|e| {
        tracing::warn!(owner_id = %owner_id, error = %e, "LinkedIn token refresh failed");
        metrics::record_token_refresh("failure");
        match e {
            LinkedInError::Status { .. } => ServiceError::ReconnectRequired(e.to_string()),
            LinkedInError::Transport(_) | LinkedInError::Decode(_) => {
                ServiceError::RefreshError(e.to_string())
            }
        }
    })?;

    credential.apply_bundle(&response.into_bundle());
    store.save(&credential).await?;

    metrics::record_token_refresh("success");
    tracing::info!(owner_id = %owner_id, "LinkedIn access token refreshed");

    credential
        .bundle()
        .ok_or_else(|| ServiceError::Internal("refreshed credential has no access token".into()))
}
