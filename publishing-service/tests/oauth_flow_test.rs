//! Authorization handshake, connection status and disconnect over HTTP.

mod common;

use axum::http::StatusCode;
use common::{delete, get, TestApp, FRONTEND_URL, MEMBER_ID, OWNER};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, ResponseTemplate};

async fn mount_code_exchange(app: &TestApp, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/oauth/v2/accessToken"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=auth-code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-1",
            "refresh_token": "refresh-1",
            "expires_in": 5184000,
            "scope": "openid profile email w_member_social"
        })))
        .expect(expected_calls)
        .mount(&app.linkedin)
        .await;
}

async fn start(app: &TestApp) -> String {
    let response = app.send(get("/auth/linkedin", Some(OWNER))).await;
    assert_eq!(response.status, StatusCode::OK);
    response.body["state"].as_str().unwrap().to_string()
}

fn callback(code: &str, state: &str) -> String {
    format!("/auth/linkedin/callback?code={}&state={}", code, state)
}

#[tokio::test]
async fn start_returns_authorization_url_and_stores_state() {
    let app = TestApp::spawn().await;

    let response = app.send(get("/auth/linkedin", Some(OWNER))).await;

    assert_eq!(response.status, StatusCode::OK);
    let state = response.body["state"].as_str().unwrap();
    let auth_url = response.body["auth_url"].as_str().unwrap();

    assert!(state.starts_with("user-1_"));
    assert!(auth_url.starts_with(&format!("{}/oauth/v2/authorization?", app.linkedin.uri())));
    assert!(auth_url.contains("response_type=code"));
    assert!(auth_url.contains("client_id=client-123"));
    assert!(auth_url.contains(&format!("state={}", state)));
    assert!(auth_url.contains("w_member_social"));
    assert_eq!(app.states.pending(OWNER).as_deref(), Some(state));
}

#[tokio::test]
async fn start_requires_owner_header() {
    let app = TestApp::spawn().await;

    let response = app.send(get("/auth/linkedin", None)).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn restarting_replaces_pending_state() {
    let app = TestApp::spawn().await;

    let first = start(&app).await;
    let second = start(&app).await;

    assert_ne!(first, second);
    assert_eq!(app.states.pending(OWNER), Some(second));
}

#[tokio::test]
async fn callback_connects_account_and_redirects() {
    let app = TestApp::spawn().await;
    mount_code_exchange(&app, 1).await;
    app.mount_userinfo().await;

    let state = start(&app).await;
    let response = app.send(get(&callback("auth-code", &state), None)).await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert!(response.location().starts_with(FRONTEND_URL));
    assert!(response.location().contains("linkedin_connected=true"));

    let credential = app.credentials.get(OWNER).expect("credential stored");
    assert!(credential.is_connected);
    assert_eq!(credential.access_token.as_deref(), Some("access-1"));
    assert_eq!(credential.refresh_token.as_deref(), Some("refresh-1"));
    assert_eq!(credential.provider_user_id.as_deref(), Some(MEMBER_ID));
    assert_eq!(credential.provider_email.as_deref(), Some("jane@example.com"));
    assert!(credential.token_expiry.is_some());
    assert!(credential.last_connected_at.is_some());
    assert_eq!(
        credential.profile.and_then(|p| p.full_name).as_deref(),
        Some("Jane Doe")
    );
    assert!(app.states.pending(OWNER).is_none());
}

#[tokio::test]
async fn replayed_callback_is_rejected() {
    let app = TestApp::spawn().await;
    mount_code_exchange(&app, 1).await;
    app.mount_userinfo().await;

    let state = start(&app).await;
    let first = app.send(get(&callback("auth-code", &state), None)).await;
    assert!(first.location().contains("linkedin_connected=true"));

    let replay = app.send(get(&callback("auth-code", &state), None)).await;

    assert_eq!(replay.status, StatusCode::SEE_OTHER);
    assert!(replay.location().contains("linkedin_error="));
    assert!(!replay.location().contains("linkedin_connected"));
}

#[tokio::test]
async fn tampered_state_is_rejected_without_exchange() {
    let app = TestApp::spawn().await;
    mount_code_exchange(&app, 0).await;

    let state = start(&app).await;
    let tampered = format!("{}X", state);
    let response = app.send(get(&callback("auth-code", &tampered), None)).await;

    assert!(response.location().contains("linkedin_error="));
    assert!(app.credentials.get(OWNER).is_none());
    // A mismatch leaves the genuine state usable.
    assert_eq!(app.states.pending(OWNER), Some(state));
}

#[tokio::test]
async fn state_for_another_owner_is_rejected() {
    let app = TestApp::spawn().await;
    mount_code_exchange(&app, 0).await;

    let state = start(&app).await;
    let forged = state.replacen("user-1", "user-2", 1);
    let response = app.send(get(&callback("auth-code", &forged), None)).await;

    assert!(response.location().contains("linkedin_error="));
    assert!(app.credentials.get("user-2").is_none());
}

#[tokio::test]
async fn provider_error_consumes_state() {
    let app = TestApp::spawn().await;
    mount_code_exchange(&app, 0).await;

    let state = start(&app).await;
    let uri = format!(
        "/auth/linkedin/callback?error=user_cancelled_login&error_description=The+member+declined&state={}",
        state
    );
    let response = app.send(get(&uri, None)).await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert!(response.location().contains("linkedin_error="));
    assert!(response.location().contains("declined"));
    assert!(app.states.pending(OWNER).is_none());
}

#[tokio::test]
async fn missing_parameters_redirect_with_error() {
    let app = TestApp::spawn().await;

    let response = app
        .send(get("/auth/linkedin/callback?code=auth-code", None))
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert!(response.location().contains("linkedin_error="));
}

#[tokio::test]
async fn failed_exchange_stores_nothing() {
    let app = TestApp::spawn().await;
    Mock::given(method("POST"))
        .and(path("/oauth/v2/accessToken"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_request",
            "error_description": "Unable to retrieve access token: authorization code expired"
        })))
        .expect(1)
        .mount(&app.linkedin)
        .await;

    let state = start(&app).await;
    let response = app.send(get(&callback("auth-code", &state), None)).await;

    assert!(response.location().contains("linkedin_error="));
    assert!(app.credentials.get(OWNER).is_none());
}

#[tokio::test]
async fn status_reports_disconnected_without_record() {
    let app = TestApp::spawn().await;

    let response = app.send(get("/auth/linkedin/status", Some(OWNER))).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["is_connected"], false);
    assert_eq!(response.body["token_valid"], false);
}

#[tokio::test]
async fn status_reports_connected_account() {
    let app = TestApp::spawn().await;
    app.seed_connected(OWNER, "access-1", Some("refresh-1"), 3600);

    let response = app.send(get("/auth/linkedin/status", Some(OWNER))).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["is_connected"], true);
    assert_eq!(response.body["token_valid"], true);
    assert_eq!(response.body["provider_email"], "jane@example.com");
    assert!(response.body.get("access_token").is_none());
}

#[tokio::test]
async fn disconnect_clears_tokens_and_keeps_record() {
    let app = TestApp::spawn().await;
    app.seed_connected(OWNER, "access-1", Some("refresh-1"), 3600);

    let response = app.send(delete("/auth/linkedin", OWNER)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["is_connected"], false);

    let credential = app.credentials.get(OWNER).expect("record kept");
    assert!(!credential.is_connected);
    assert!(credential.access_token.is_none());
    assert!(credential.refresh_token.is_none());
    assert!(credential.provider_email.is_none());

    let again = app.send(delete("/auth/linkedin", OWNER)).await;
    assert_eq!(again.status, StatusCode::OK);

    let status = app.send(get("/auth/linkedin/status", Some(OWNER))).await;
    assert_eq!(status.body["is_connected"], false);
}

#[tokio::test]
async fn reconnect_after_disconnect_restores_connection() {
    let app = TestApp::spawn().await;
    mount_code_exchange(&app, 1).await;
    app.mount_userinfo().await;
    app.seed_connected(OWNER, "old-access", Some("old-refresh"), 3600);

    app.send(delete("/auth/linkedin", OWNER)).await;
    let state = start(&app).await;
    let response = app.send(get(&callback("auth-code", &state), None)).await;

    assert!(response.location().contains("linkedin_connected=true"));
    let credential = app.credentials.get(OWNER).unwrap();
    assert!(credential.is_connected);
    assert_eq!(credential.access_token.as_deref(), Some("access-1"));
}
