use secrecy::{ExposeSecret, Secret};
use service_core::config::{self as core_config, get_env, parse_env, Environment};
use service_core::error::AppError;
use std::env;
use std::time::Duration;

/// Permissions requested from LinkedIn during the authorization handshake.
pub const LINKEDIN_SCOPES: [&str; 4] = ["openid", "profile", "email", "w_member_social"];

#[derive(Debug, Clone)]
pub struct PublishingConfig {
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub mongodb: MongoConfig,
    pub redis: RedisConfig,
    pub linkedin: LinkedInConfig,
    pub oauth: OAuthConfig,
    pub publish: PublishConfig,
    pub automation: AutomationConfig,
}

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct LinkedInConfig {
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub redirect_uri: String,
    /// OAuth endpoints (`/authorization`, `/accessToken`).
    pub auth_base_url: String,
    /// REST endpoints (`/userinfo`, `/ugcPosts`).
    pub api_base_url: String,
    /// Interactive site used by browser automation.
    pub web_base_url: String,
    pub request_timeout_seconds: u64,
}

impl LinkedInConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Fails when the client credentials are missing; the provider cannot be
    /// used at all without them.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.client_id.trim().is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "LINKEDIN_CLIENT_ID must be set"
            )));
        }
        if self.client_secret.expose_secret().trim().is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "LINKEDIN_CLIENT_SECRET must be set"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// Where the browser lands after the provider callback is handled.
    pub frontend_url: String,
    pub state_ttl_seconds: u64,
}

impl OAuthConfig {
    pub fn state_ttl(&self) -> Duration {
        Duration::from_secs(self.state_ttl_seconds)
    }
}

#[derive(Debug, Clone)]
pub struct PublishConfig {
    pub platform_timeout_seconds: u64,
}

impl PublishConfig {
    pub fn platform_timeout(&self) -> Duration {
        Duration::from_secs(self.platform_timeout_seconds)
    }
}

#[derive(Debug, Clone)]
pub struct AutomationConfig {
    pub webdriver_url: String,
    pub headless: bool,
    /// Pause after navigation and clicks so the page can settle.
    pub settle_millis: u64,
    /// Wait after pressing submit before inspecting the outcome.
    pub post_submit_millis: u64,
    pub element_wait_attempts: u32,
    pub poll_interval_seconds: u64,
    pub max_verification_attempts: u32,
}

impl AutomationConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_millis)
    }

    pub fn post_submit_delay(&self) -> Duration {
        Duration::from_millis(self.post_submit_millis)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    /// Upper bound on the time spent waiting for a challenge to be resolved.
    pub fn max_verification_wait(&self) -> Duration {
        self.poll_interval() * self.max_verification_attempts
    }
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            headless: false,
            settle_millis: 2000,
            post_submit_millis: 5000,
            element_wait_attempts: 10,
            poll_interval_seconds: 5,
            max_verification_attempts: 60,
        }
    }
}

impl PublishingConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        let environment = Environment::from_env()?;
        let is_prod = environment.is_prod();

        let config = PublishingConfig {
            common: common_config,
            environment,
            service_name: get_env("SERVICE_NAME", Some("publishing-service"), is_prod)?,
            service_version: get_env(
                "SERVICE_VERSION",
                Some(env!("CARGO_PKG_VERSION")),
                is_prod,
            )?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok(),
            mongodb: MongoConfig {
                uri: get_env("MONGODB_URI", Some("mongodb://localhost:27017"), is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("publishing_db"), is_prod)?,
            },
            redis: RedisConfig {
                url: get_env("REDIS_URL", Some("redis://localhost:6379"), is_prod)?,
            },
            linkedin: LinkedInConfig {
                // Credentials have no default anywhere.
                client_id: get_env("LINKEDIN_CLIENT_ID", None, is_prod)?,
                client_secret: Secret::new(get_env("LINKEDIN_CLIENT_SECRET", None, is_prod)?),
                redirect_uri: get_env(
                    "LINKEDIN_REDIRECT_URI",
                    Some("http://localhost:8080/auth/linkedin/callback"),
                    is_prod,
                )?,
                auth_base_url: get_env(
                    "LINKEDIN_AUTH_BASE_URL",
                    Some("https://www.linkedin.com/oauth/v2"),
                    is_prod,
                )?,
                api_base_url: get_env(
                    "LINKEDIN_API_BASE_URL",
                    Some("https://api.linkedin.com/v2"),
                    is_prod,
                )?,
                web_base_url: get_env(
                    "LINKEDIN_WEB_BASE_URL",
                    Some("https://www.linkedin.com"),
                    is_prod,
                )?,
                request_timeout_seconds: parse_env("LINKEDIN_REQUEST_TIMEOUT_SECONDS", "30", is_prod)?,
            },
            oauth: OAuthConfig {
                frontend_url: get_env("FRONTEND_URL", Some("http://localhost:3000"), is_prod)?,
                state_ttl_seconds: parse_env("OAUTH_STATE_TTL_SECONDS", "600", is_prod)?,
            },
            publish: PublishConfig {
                platform_timeout_seconds: parse_env(
                    "PUBLISH_PLATFORM_TIMEOUT_SECONDS",
                    "60",
                    is_prod,
                )?,
            },
            automation: AutomationConfig {
                webdriver_url: get_env("WEBDRIVER_URL", Some("http://localhost:9515"), is_prod)?,
                headless: parse_env("AUTOMATION_HEADLESS", "false", is_prod)?,
                settle_millis: parse_env("AUTOMATION_SETTLE_MILLIS", "2000", is_prod)?,
                post_submit_millis: parse_env("AUTOMATION_POST_SUBMIT_MILLIS", "5000", is_prod)?,
                element_wait_attempts: parse_env("AUTOMATION_ELEMENT_WAIT_ATTEMPTS", "10", is_prod)?,
                poll_interval_seconds: parse_env(
                    "AUTOMATION_POLL_INTERVAL_SECONDS",
                    "5",
                    is_prod,
                )?,
                max_verification_attempts: parse_env(
                    "AUTOMATION_MAX_VERIFICATION_ATTEMPTS",
                    "60",
                    is_prod,
                )?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.linkedin.validate()?;

        if self.oauth.state_ttl_seconds == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "OAUTH_STATE_TTL_SECONDS must be positive"
            )));
        }

        if self.publish.platform_timeout_seconds == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "PUBLISH_PLATFORM_TIMEOUT_SECONDS must be positive"
            )));
        }

        if self.automation.max_verification_attempts == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "AUTOMATION_MAX_VERIFICATION_ATTEMPTS must be positive"
            )));
        }

        if self.environment.is_prod() && !self.linkedin.redirect_uri.starts_with("https://") {
            tracing::warn!(
                redirect_uri = %self.linkedin.redirect_uri,
                "LinkedIn redirect URI is not HTTPS in production"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linkedin(client_id: &str, client_secret: &str) -> LinkedInConfig {
        LinkedInConfig {
            client_id: client_id.to_string(),
            client_secret: Secret::new(client_secret.to_string()),
            redirect_uri: "http://localhost:8080/auth/linkedin/callback".to_string(),
            auth_base_url: "https://www.linkedin.com/oauth/v2".to_string(),
            api_base_url: "https://api.linkedin.com/v2".to_string(),
            web_base_url: "https://www.linkedin.com".to_string(),
            request_timeout_seconds: 30,
        }
    }

    #[test]
    fn test_missing_client_credentials_are_rejected() {
        assert!(linkedin("", "secret").validate().is_err());
        assert!(linkedin("client", "  ").validate().is_err());
        assert!(linkedin("client", "secret").validate().is_ok());
    }

    #[test]
    fn test_verification_wait_is_bounded() {
        let automation = AutomationConfig::default();
        assert_eq!(automation.max_verification_wait(), Duration::from_secs(300));
    }
}
