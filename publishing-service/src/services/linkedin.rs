//! LinkedIn OAuth and REST client.
//!
//! One instance is built at startup from [`LinkedInConfig`] and shared by
//! every component that talks to LinkedIn.

use crate::config::{LinkedInConfig, LINKEDIN_SCOPES};
use crate::models::{ConnectedProfile, TokenBundle};
use crate::services::error::ServiceError;
use chrono::Utc;
use reqwest::{Client, StatusCode, Url};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const RESTLI_PROTOCOL_HEADER: &str = "X-Restli-Protocol-Version";
const RESTLI_PROTOCOL_VERSION: &str = "2.0.0";
const RESTLI_ID_HEADER: &str = "x-restli-id";

#[derive(Debug, Error)]
pub enum LinkedInError {
    #[error("LinkedIn returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("LinkedIn request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected LinkedIn response: {0}")]
    Decode(String),
}

impl LinkedInError {
    /// LinkedIn no longer accepts the bearer token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, LinkedInError::Status { status, .. } if *status == StatusCode::UNAUTHORIZED)
    }
}

/// Response from the token endpoint, for both code exchange and refresh.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
}

impl TokenResponse {
    pub fn into_bundle(self) -> TokenBundle {
        TokenBundle::from_expires_in(
            self.access_token,
            self.refresh_token,
            self.expires_in,
            Utc::now(),
        )
    }
}

/// OpenID Connect userinfo payload.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub sub: String,
    pub email: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

impl From<UserInfo> for ConnectedProfile {
    fn from(info: UserInfo) -> Self {
        ConnectedProfile {
            provider_user_id: info.sub,
            email: info.email,
            full_name: info.name,
            first_name: info.given_name,
            last_name: info.family_name,
            picture: info.picture,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LinkedInErrorBody {
    error: Option<String>,
    error_description: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UgcPostResponse {
    id: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TextValue {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UgcMedia {
    pub status: &'static str,
    pub description: TextValue,
    pub media: String,
    pub title: TextValue,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareContent {
    pub share_commentary: TextValue,
    pub share_media_category: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<UgcMedia>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpecificContent {
    #[serde(rename = "com.linkedin.ugc.ShareContent")]
    pub share_content: ShareContent,
}

#[derive(Debug, Clone, Serialize)]
pub struct Visibility {
    #[serde(rename = "com.linkedin.ugc.MemberNetworkVisibility")]
    pub member_network_visibility: &'static str,
}

/// Body of `POST /ugcPosts`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UgcPostRequest {
    pub author: String,
    pub lifecycle_state: &'static str,
    pub specific_content: SpecificContent,
    pub visibility: Visibility,
}

impl UgcPostRequest {
    /// Public share authored by `person_id`, with an optional image.
    pub fn new(person_id: &str, text: String, title: Option<&str>, image_url: Option<&str>) -> Self {
        let media: Vec<UgcMedia> = image_url
            .map(|url| UgcMedia {
                status: "READY",
                description: TextValue {
                    text: title.unwrap_or("Job posting").to_string(),
                },
                media: url.to_string(),
                title: TextValue {
                    text: title.unwrap_or("Job Opportunity").to_string(),
                },
            })
            .into_iter()
            .collect();

        Self {
            author: format!("urn:li:person:{}", person_id),
            lifecycle_state: "PUBLISHED",
            specific_content: SpecificContent {
                share_content: ShareContent {
                    share_commentary: TextValue { text },
                    share_media_category: if media.is_empty() { "NONE" } else { "IMAGE" },
                    media,
                },
            },
            visibility: Visibility {
                member_network_visibility: "PUBLIC",
            },
        }
    }
}

#[derive(Clone)]
pub struct LinkedInClient {
    client: Client,
    config: LinkedInConfig,
}

impl LinkedInClient {
    /// Fails when client credentials are missing.
    pub fn new(config: LinkedInConfig) -> Result<Self, ServiceError> {
        config
            .validate()
            .map_err(|e| ServiceError::Configuration(e.to_string()))?;

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ServiceError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Authorization endpoint URL carrying `state` and the fixed scope set.
    pub fn authorization_url(&self, state: &str) -> Result<String, ServiceError> {
        let endpoint = format!("{}/authorization", self.config.auth_base_url);
        let scope = LINKEDIN_SCOPES.join(" ");
        let url = Url::parse_with_params(
            &endpoint,
            &[
                ("response_type", "code"),
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("state", state),
                ("scope", scope.as_str()),
            ],
        )
        .map_err(|e| ServiceError::Configuration(format!("Invalid LinkedIn auth URL: {}", e)))?;

        Ok(url.into())
    }

    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, LinkedInError> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.expose_secret().as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];
        self.token_request(&form).await
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, LinkedInError> {
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.expose_secret().as_str()),
        ];
        self.token_request(&form).await
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse, LinkedInError> {
        let url = format!("{}/accessToken", self.config.auth_base_url);
        let response = self.client.post(&url).form(form).send().await?;

        let status = response.status();
        let body = response.text().await?;

        tracing::debug!(status = %status, "LinkedIn token endpoint response");

        if !status.is_success() {
            return Err(Self::status_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| LinkedInError::Decode(e.to_string()))
    }

    pub async fn userinfo(&self, access_token: &str) -> Result<UserInfo, LinkedInError> {
        let url = format!("{}/userinfo", self.config.api_base_url);
        let response = self.client.get(&url).bearer_auth(access_token).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Self::status_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| LinkedInError::Decode(e.to_string()))
    }

    /// Creates a share and returns its id when LinkedIn reports one.
    pub async fn create_ugc_post(
        &self,
        access_token: &str,
        post: &UgcPostRequest,
    ) -> Result<Option<String>, LinkedInError> {
        let url = format!("{}/ugcPosts", self.config.api_base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .header(RESTLI_PROTOCOL_HEADER, RESTLI_PROTOCOL_VERSION)
            .json(post)
            .send()
            .await?;

        let status = response.status();
        let header_id = response
            .headers()
            .get(RESTLI_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        tracing::debug!(status = %status, body = %body, "LinkedIn ugcPosts response");

        if !status.is_success() {
            return Err(Self::status_error(status, &body));
        }

        let body_id = serde_json::from_str::<UgcPostResponse>(&body)
            .ok()
            .and_then(|r| r.id);

        Ok(body_id.or(header_id))
    }

    fn status_error(status: StatusCode, body: &str) -> LinkedInError {
        let message = serde_json::from_str::<LinkedInErrorBody>(body)
            .ok()
            .and_then(|b| b.error_description.or(b.message).or(b.error))
            .unwrap_or_else(|| {
                if body.is_empty() {
                    status.canonical_reason().unwrap_or("unknown error").to_string()
                } else {
                    body.to_string()
                }
            });

        tracing::warn!(status = %status, message = %message, "LinkedIn request rejected");
        LinkedInError::Status { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;

    fn config() -> LinkedInConfig {
        LinkedInConfig {
            client_id: "client-123".to_string(),
            client_secret: Secret::new("shh".to_string()),
            redirect_uri: "http://localhost:8080/auth/linkedin/callback".to_string(),
            auth_base_url: "https://www.linkedin.com/oauth/v2".to_string(),
            api_base_url: "https://api.linkedin.com/v2".to_string(),
            web_base_url: "https://www.linkedin.com".to_string(),
            request_timeout_seconds: 30,
        }
    }

    #[test]
    fn test_missing_client_secret_is_configuration_error() {
        let mut cfg = config();
        cfg.client_secret = Secret::new(String::new());
        assert!(matches!(
            LinkedInClient::new(cfg),
            Err(ServiceError::Configuration(_))
        ));
    }

    #[test]
    fn test_authorization_url_carries_state_and_scopes() {
        let client = LinkedInClient::new(config()).unwrap();
        let url = Url::parse(&client.authorization_url("u1_1700000000_abc").unwrap()).unwrap();

        assert_eq!(url.path(), "/oauth/v2/authorization");
        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["client_id"], "client-123");
        assert_eq!(params["state"], "u1_1700000000_abc");
        assert_eq!(params["scope"], "openid profile email w_member_social");
        assert_eq!(
            params["redirect_uri"],
            "http://localhost:8080/auth/linkedin/callback"
        );
    }

    #[test]
    fn test_text_only_post_payload() {
        let post = UgcPostRequest::new("abc", "Hello".to_string(), None, None);
        let json = serde_json::to_value(&post).unwrap();

        assert_eq!(json["author"], "urn:li:person:abc");
        assert_eq!(json["lifecycleState"], "PUBLISHED");
        let share = &json["specificContent"]["com.linkedin.ugc.ShareContent"];
        assert_eq!(share["shareCommentary"]["text"], "Hello");
        assert_eq!(share["shareMediaCategory"], "NONE");
        assert!(share.get("media").is_none());
        assert_eq!(
            json["visibility"]["com.linkedin.ugc.MemberNetworkVisibility"],
            "PUBLIC"
        );
    }

    #[test]
    fn test_image_post_payload() {
        let post = UgcPostRequest::new(
            "abc",
            "Hiring".to_string(),
            Some("Rust Engineer"),
            Some("https://cdn.example.com/job.png"),
        );
        let json = serde_json::to_value(&post).unwrap();
        let share = &json["specificContent"]["com.linkedin.ugc.ShareContent"];

        assert_eq!(share["shareMediaCategory"], "IMAGE");
        assert_eq!(share["media"][0]["status"], "READY");
        assert_eq!(share["media"][0]["media"], "https://cdn.example.com/job.png");
        assert_eq!(share["media"][0]["title"]["text"], "Rust Engineer");
    }

    #[test]
    fn test_unauthorized_detection() {
        let err = LinkedInClient::status_error(StatusCode::UNAUTHORIZED, r#"{"message":"Invalid access token"}"#);
        assert!(err.is_unauthorized());
        assert!(err.to_string().contains("Invalid access token"));

        let err = LinkedInClient::status_error(StatusCode::UNPROCESSABLE_ENTITY, "");
        assert!(!err.is_unauthorized());
    }
}
