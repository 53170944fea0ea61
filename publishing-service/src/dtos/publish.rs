use crate::models::{AutomationPost, InteractiveCredentials, PublishRequest};
use crate::services::publishers::MAX_CONTENT_CHARS;
use secrecy::Secret;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct PublishRequestDto {
    #[validate(length(min = 1, max = 200))]
    pub target_id: String,

    #[validate(length(min = 1, message = "At least one platform is required"))]
    pub platforms: Vec<String>,

    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content: String,

    pub title: Option<String>,

    #[validate(url)]
    pub image_ref: Option<String>,
}

impl From<PublishRequestDto> for PublishRequest {
    fn from(dto: PublishRequestDto) -> Self {
        PublishRequest {
            target_id: dto.target_id,
            platforms: dto.platforms,
            content: dto.content,
            title: dto.title,
            image_ref: dto.image_ref,
        }
    }
}

/// Browser automation request. The password is used for one run and never
/// stored or logged.
#[derive(Deserialize, Validate)]
pub struct AutomationPublishRequest {
    pub username: Option<String>,

    pub password: Secret<String>,

    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content: String,

    pub title: Option<String>,
}

impl AutomationPublishRequest {
    pub fn into_parts(self) -> (InteractiveCredentials, AutomationPost) {
        (
            InteractiveCredentials {
                username: self.username,
                password: self.password,
            },
            AutomationPost {
                content: self.content,
                title: self.title,
            },
        )
    }
}

#[derive(Deserialize)]
pub struct AutomationVerifyRequest {
    pub username: Option<String>,
    pub password: Secret<String>,
}

impl From<AutomationVerifyRequest> for InteractiveCredentials {
    fn from(req: AutomationVerifyRequest) -> Self {
        InteractiveCredentials {
            username: req.username,
            password: req.password,
        }
    }
}

/// What a LinkedIn post may contain through this service.
#[derive(Debug, Serialize)]
pub struct PostingGuidelinesResponse {
    pub platform: &'static str,
    pub max_length: usize,
    pub supported_formats: Vec<&'static str>,
    pub best_practices: Vec<&'static str>,
    pub restrictions: Vec<&'static str>,
}

impl PostingGuidelinesResponse {
    pub fn linkedin() -> Self {
        Self {
            platform: "linkedin",
            max_length: MAX_CONTENT_CHARS,
            supported_formats: vec!["text", "image"],
            best_practices: vec![
                "Use relevant hashtags",
                "Include engaging content",
                "Add a call to action",
                "Keep it professional",
                "Use proper formatting",
            ],
            restrictions: vec![
                "No spam content",
                "Follow community guidelines",
                "Respect intellectual property",
                "No misleading information",
            ],
        }
    }
}

/// Instructions shown when a browser run hits a LinkedIn challenge.
#[derive(Debug, Serialize)]
pub struct VerificationHelpResponse {
    pub title: &'static str,
    pub message: &'static str,
    pub max_wait_minutes: u64,
    pub steps: Vec<String>,
    pub tips: Vec<String>,
    pub troubleshooting: Vec<&'static str>,
}

impl VerificationHelpResponse {
    pub fn new(max_wait: Duration) -> Self {
        let minutes = max_wait.as_secs().div_ceil(60).max(1);
        Self {
            title: "LinkedIn Verification Required",
            message: "LinkedIn has detected automated activity and requires verification.",
            max_wait_minutes: minutes,
            steps: vec![
                "1. Start the automation publish or the login check".to_string(),
                "2. Complete the challenge in the automated browser (enter the code, solve the CAPTCHA)"
                    .to_string(),
                "3. The run continues on its own once the challenge is gone".to_string(),
                "4. Do not close the browser window while the run is waiting".to_string(),
            ],
            tips: vec![
                "Keep the browser window visible and active".to_string(),
                format!("Complete verification within {} minutes", minutes),
                "If verification fails, log into LinkedIn manually first".to_string(),
                "Posting less often makes future challenges less likely".to_string(),
            ],
            troubleshooting: vec![
                "If no browser opens, check that the WebDriver endpoint is reachable",
                "If verification times out, start the publish again",
                "For persistent issues, log into LinkedIn manually first",
            ],
        }
    }
}
