//! Shared setup for publishing-service integration tests.
//!
//! LinkedIn is a wiremock server, both stores are in memory and the browser
//! is a scripted fake, so no external service is needed.

#![allow(dead_code)]

pub mod fake_browser;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use fake_browser::FakeBrowser;
use http_body_util::BodyExt;
use mongodb::bson;
use publishing_service::config::{
    AutomationConfig, LinkedInConfig, MongoConfig, OAuthConfig, PublishConfig, PublishingConfig,
    RedisConfig,
};
use publishing_service::models::LinkedInCredential;
use publishing_service::services::credential_store::InMemoryCredentialStore;
use publishing_service::services::state_store::InMemoryStateStore;
use publishing_service::{build_router, AppState};
use secrecy::Secret;
use serde_json::{json, Value};
use service_core::config::{Config as CommonConfig, Environment};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const OWNER: &str = "user-1";
pub const FRONTEND_URL: &str = "http://localhost:3000/settings";
pub const WEB_BASE_URL: &str = "https://www.linkedin.test";
pub const MEMBER_ID: &str = "abc123";

pub fn test_config(linkedin_base: &str) -> PublishingConfig {
    PublishingConfig {
        common: CommonConfig { port: 0 },
        environment: Environment::Dev,
        service_name: "publishing-service".to_string(),
        service_version: "test".to_string(),
        log_level: "debug".to_string(),
        otlp_endpoint: None,
        mongodb: MongoConfig {
            uri: "mongodb://localhost:27017".to_string(),
            database: "publishing_test".to_string(),
        },
        redis: RedisConfig {
            url: "redis://localhost:6379".to_string(),
        },
        linkedin: LinkedInConfig {
            client_id: "client-123".to_string(),
            client_secret: Secret::new("client-secret".to_string()),
            redirect_uri: "http://localhost:8080/auth/linkedin/callback".to_string(),
            auth_base_url: format!("{}/oauth/v2", linkedin_base),
            api_base_url: format!("{}/v2", linkedin_base),
            web_base_url: WEB_BASE_URL.to_string(),
            request_timeout_seconds: 5,
        },
        oauth: OAuthConfig {
            frontend_url: FRONTEND_URL.to_string(),
            state_ttl_seconds: 600,
        },
        publish: PublishConfig {
            platform_timeout_seconds: 10,
        },
        automation: AutomationConfig {
            settle_millis: 0,
            post_submit_millis: 0,
            element_wait_attempts: 2,
            poll_interval_seconds: 0,
            max_verification_attempts: 3,
            ..AutomationConfig::default()
        },
    }
}

pub struct TestApp {
    pub linkedin: MockServer,
    pub credentials: Arc<InMemoryCredentialStore>,
    pub states: Arc<InMemoryStateStore>,
    pub browser: FakeBrowser,
    pub state: AppState,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::with_browser(FakeBrowser::new()).await
    }

    pub async fn with_browser(browser: FakeBrowser) -> Self {
        let linkedin = MockServer::start().await;
        let credentials = Arc::new(InMemoryCredentialStore::new());
        let states = Arc::new(InMemoryStateStore::new());

        let state = AppState::new(
            test_config(&linkedin.uri()),
            credentials.clone(),
            states.clone(),
            Arc::new(browser.clone()),
        )
        .expect("Failed to build application state");

        Self {
            linkedin,
            credentials,
            states,
            browser,
            state,
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Stores a connected credential whose token expires `expires_in_secs`
    /// from now (negative for already expired).
    pub fn seed_connected(
        &self,
        owner_id: &str,
        access_token: &str,
        refresh_token: Option<&str>,
        expires_in_secs: i64,
    ) {
        let mut credential = LinkedInCredential::new(owner_id.to_string());
        credential.access_token = Some(access_token.to_string());
        credential.refresh_token = refresh_token.map(str::to_string);
        credential.token_expiry = Some(bson::DateTime::from_chrono(
            Utc::now() + chrono::Duration::seconds(expires_in_secs),
        ));
        credential.provider_user_id = Some(MEMBER_ID.to_string());
        credential.provider_email = Some("jane@example.com".to_string());
        credential.is_connected = true;
        credential.last_connected_at = Some(bson::DateTime::now());
        self.credentials.insert(credential);
    }

    pub async fn mount_userinfo(&self) {
        Mock::given(method("GET"))
            .and(path("/v2/userinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sub": MEMBER_ID,
                "email": "jane@example.com",
                "given_name": "Jane",
                "family_name": "Doe",
                "name": "Jane Doe",
                "picture": "https://media.linkedin.test/jane.png"
            })))
            .mount(&self.linkedin)
            .await;
    }

    /// Refresh endpoint answering with `access_token` and no refresh token.
    pub async fn mount_refresh(&self, access_token: &str, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/oauth/v2/accessToken"))
            .and(body_string_contains("grant_type=refresh_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": access_token,
                "expires_in": 5184000
            })))
            .expect(expected_calls)
            .mount(&self.linkedin)
            .await;
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router()
            .oneshot(request)
            .await
            .expect("Router failed to respond");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn location(&self) -> &str {
        self.headers
            .get("location")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }
}

pub fn get(uri: &str, owner_id: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(owner_id) = owner_id {
        builder = builder.header("X-User-ID", owner_id);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn delete(uri: &str, owner_id: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header("X-User-ID", owner_id)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, owner_id: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("X-User-ID", owner_id)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
