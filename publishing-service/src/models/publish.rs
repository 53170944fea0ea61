use chrono::{DateTime, Utc};
use secrecy::Secret;
use serde::{Deserialize, Serialize};

pub const LINKEDIN_PLATFORM: &str = "linkedin";

#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub target_id: String,
    pub platforms: Vec<String>,
    pub content: String,
    pub title: Option<String>,
    pub image_ref: Option<String>,
}

impl PublishRequest {
    /// Lower-cased, trimmed platform ids in request order, duplicates dropped.
    pub fn normalized_platforms(&self) -> Vec<String> {
        let mut seen = Vec::with_capacity(self.platforms.len());
        for platform in &self.platforms {
            let platform = platform.trim().to_lowercase();
            if !platform.is_empty() && !seen.contains(&platform) {
                seen.push(platform);
            }
        }
        seen
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStrategy {
    Structured,
    Automation,
    None,
}

impl PublishStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            PublishStrategy::Structured => "structured",
            PublishStrategy::Automation => "automation",
            PublishStrategy::None => "none",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishFailureKind {
    NotConnected,
    ReconnectRequired,
    ProviderRejected,
    Timeout,
    UnsupportedPlatform,
    AutomationFailed,
    Internal,
}

/// What the caller should do about a failed platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Remedy {
    Reconnect,
    EditContent,
    Retry,
    ChangePlatforms,
}

impl PublishFailureKind {
    pub fn remedy(self) -> Remedy {
        match self {
            PublishFailureKind::NotConnected | PublishFailureKind::ReconnectRequired => {
                Remedy::Reconnect
            }
            PublishFailureKind::ProviderRejected => Remedy::EditContent,
            PublishFailureKind::UnsupportedPlatform => Remedy::ChangePlatforms,
            PublishFailureKind::Timeout
            | PublishFailureKind::AutomationFailed
            | PublishFailureKind::Internal => Remedy::Retry,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishFailure {
    pub kind: PublishFailureKind,
    pub detail: String,
    pub remedy: Remedy,
}

impl PublishFailure {
    pub fn new(kind: PublishFailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
            remedy: kind.remedy(),
        }
    }
}

/// Which locator or technique carried an automation stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedStrategy {
    pub stage: String,
    pub strategy: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishResult {
    pub platform: String,
    pub strategy: PublishStrategy,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posted_at: Option<DateTime<Utc>>,
    pub truncated: bool,
    pub verification_suggested: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<PublishFailure>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matched_strategies: Vec<MatchedStrategy>,
    pub timestamp: DateTime<Utc>,
}

impl PublishResult {
    pub fn succeeded(platform: &str, strategy: PublishStrategy, message: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            platform: platform.to_string(),
            strategy,
            success: true,
            message: message.into(),
            post_id: None,
            posted_at: Some(now),
            truncated: false,
            verification_suggested: false,
            error: None,
            matched_strategies: Vec::new(),
            timestamp: now,
        }
    }

    pub fn failed(
        platform: &str,
        strategy: PublishStrategy,
        kind: PublishFailureKind,
        detail: impl Into<String>,
    ) -> Self {
        let failure = PublishFailure::new(kind, detail);
        Self {
            platform: platform.to_string(),
            strategy,
            success: false,
            message: failure.detail.clone(),
            post_id: None,
            posted_at: None,
            truncated: false,
            verification_suggested: false,
            error: Some(failure),
            matched_strategies: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_post_id(mut self, post_id: Option<String>) -> Self {
        self.post_id = post_id;
        self
    }

    pub fn with_truncated(mut self, truncated: bool) -> Self {
        self.truncated = truncated;
        self
    }

    pub fn failure_kind(&self) -> Option<PublishFailureKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Success,
    Partial,
    Failed,
}

impl OverallStatus {
    pub fn from_results(results: &[PublishResult]) -> Self {
        let successes = results.iter().filter(|r| r.success).count();
        if successes == 0 {
            OverallStatus::Failed
        } else if successes == results.len() {
            OverallStatus::Success
        } else {
            OverallStatus::Partial
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishReport {
    pub target_id: String,
    pub results: Vec<PublishResult>,
    pub overall_status: OverallStatus,
}

impl PublishReport {
    pub fn new(target_id: String, results: Vec<PublishResult>) -> Self {
        let overall_status = OverallStatus::from_results(&results);
        Self {
            target_id,
            results,
            overall_status,
        }
    }
}

/// Interactive login supplied by the caller for the automation path only.
/// Never persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractiveCredentials {
    pub username: Option<String>,
    pub password: Secret<String>,
}

#[derive(Debug, Clone)]
pub struct AutomationPost {
    pub content: String,
    pub title: Option<String>,
}
