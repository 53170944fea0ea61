pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use crate::config::PublishingConfig;
use crate::services::automation::driver::BrowserLauncher;
use crate::services::publishers::StructuredApiPublisher;
use crate::services::{
    AuthorizationFlow, AuthorizationStateStore, AutomationFallbackPublisher, CredentialStore,
    LinkedInClient, PublishOrchestrator, ServiceError, TokenLifecycleManager,
};
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::middleware::{metrics::metrics_middleware, tracing::request_id_middleware};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: PublishingConfig,
    pub credentials: Arc<dyn CredentialStore>,
    pub states: Arc<dyn AuthorizationStateStore>,
    pub tokens: Arc<TokenLifecycleManager>,
    pub authorization: AuthorizationFlow,
    pub orchestrator: Arc<PublishOrchestrator>,
    pub automation: Arc<AutomationFallbackPublisher>,
}

impl AppState {
    /// Wires the credential lifecycle and both publishing strategies over
    /// the given stores and browser launcher.
    pub fn new(
        config: PublishingConfig,
        credentials: Arc<dyn CredentialStore>,
        states: Arc<dyn AuthorizationStateStore>,
        launcher: Arc<dyn BrowserLauncher>,
    ) -> Result<Self, ServiceError> {
        let client = Arc::new(LinkedInClient::new(config.linkedin.clone())?);
        let tokens = Arc::new(TokenLifecycleManager::new(client, credentials.clone()));

        let authorization = AuthorizationFlow::new(
            states.clone(),
            tokens.clone(),
            config.oauth.state_ttl(),
        );

        let orchestrator = PublishOrchestrator::new(tokens.clone(), config.publish.platform_timeout())
            .with_publisher(Arc::new(StructuredApiPublisher::new(tokens.clone())));

        let automation = AutomationFallbackPublisher::new(
            launcher,
            credentials.clone(),
            config.automation.clone(),
            config.linkedin.web_base_url.clone(),
        );

        Ok(Self {
            config,
            credentials,
            states,
            tokens,
            authorization,
            orchestrator: Arc::new(orchestrator),
            automation: Arc::new(automation),
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route(
            "/auth/linkedin",
            get(handlers::start_authorization).delete(handlers::disconnect),
        )
        .route("/auth/linkedin/callback", get(handlers::authorization_callback))
        .route("/auth/linkedin/status", get(handlers::connection_status))
        .route("/publish", post(handlers::publish))
        .route("/publish/automation", post(handlers::publish_automation))
        .route(
            "/publish/automation/verify",
            post(handlers::verify_automation_login),
        )
        .route("/publish/automation/help", get(handlers::verification_help))
        .route("/publish/linkedin/guidelines", get(handlers::posting_guidelines))
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
