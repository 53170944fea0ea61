use super::{PostReceipt, PublishContent, PublishError, Publisher};
use crate::models::{PublishStrategy, LINKEDIN_PLATFORM};
use crate::services::linkedin::UgcPostRequest;
use crate::services::token_manager::TokenLifecycleManager;
use async_trait::async_trait;
use std::sync::Arc;

/// LinkedIn's limit on share commentary, counted in characters.
pub const MAX_CONTENT_CHARS: usize = 3000;

/// Cuts `content` to [`MAX_CONTENT_CHARS`] characters; the flag reports
/// whether anything was dropped.
pub fn truncate_content(content: &str) -> (String, bool) {
    match content.char_indices().nth(MAX_CONTENT_CHARS) {
        Some((cut, _)) => (content[..cut].to_string(), true),
        None => (content.to_string(), false),
    }
}

pub const HIRING_HEADLINE: &str = "We're Hiring!";

/// Post text for either strategy. Titled posts get the hiring headline and
/// hashtags; untitled content goes out as-is.
pub fn compose_post_text(content: &str, title: Option<&str>) -> String {
    match title.filter(|t| !t.trim().is_empty()) {
        Some(title) => format!(
            "🚀 {} {}\n\n{}\n\n#hiring #jobs #career #opportunity",
            HIRING_HEADLINE, title, content
        ),
        None => content.to_string(),
    }
}

/// Posts through LinkedIn's UGC API with the owner's stored OAuth token.
pub struct StructuredApiPublisher {
    tokens: Arc<TokenLifecycleManager>,
}

impl StructuredApiPublisher {
    pub fn new(tokens: Arc<TokenLifecycleManager>) -> Self {
        Self { tokens }
    }

    pub async fn post(
        &self,
        owner_id: &str,
        content: &str,
        title: Option<&str>,
        image_ref: Option<&str>,
    ) -> Result<PostReceipt, PublishError> {
        let bundle = self.tokens.ensure_valid(owner_id).await?;

        if let Err(e) = self.tokens.probe_liveness(&bundle.access_token).await {
            tracing::warn!(owner_id = %owner_id, error = %e, "LinkedIn token failed liveness probe");
            return Err(if e.is_unauthorized() {
                PublishError::TokenRejected(format!("token failed the identity probe: {}", e))
            } else {
                PublishError::ProviderRejected(format!("LinkedIn identity probe failed: {}", e))
            });
        }

        let person_id = self.author_id(owner_id, &bundle.access_token).await?;

        let composed = compose_post_text(content, title);
        let (text, truncated) = truncate_content(&composed);
        if truncated {
            tracing::warn!(
                owner_id = %owner_id,
                original_chars = composed.chars().count(),
                max_chars = MAX_CONTENT_CHARS,
                "Truncating LinkedIn post content"
            );
        }

        let request = UgcPostRequest::new(&person_id, text, title, image_ref);
        let post_id = self
            .tokens
            .client()
            .create_ugc_post(&bundle.access_token, &request)
            .await
            .map_err(|e| {
                if e.is_unauthorized() {
                    PublishError::TokenRejected(e.to_string())
                } else {
                    PublishError::ProviderRejected(e.to_string())
                }
            })?;

        tracing::info!(
            owner_id = %owner_id,
            post_id = ?post_id,
            truncated,
            "LinkedIn post created"
        );

        Ok(PostReceipt { post_id, truncated })
    }

    /// Stored LinkedIn member id, else the `sub` from userinfo.
    async fn author_id(&self, owner_id: &str, access_token: &str) -> Result<String, PublishError> {
        let stored = self
            .tokens
            .store()
            .find(owner_id)
            .await?
            .and_then(|c| c.provider_user_id)
            .filter(|id| !id.is_empty());

        if let Some(id) = stored {
            return Ok(id);
        }

        let info = self
            .tokens
            .client()
            .userinfo(access_token)
            .await
            .map_err(|e| {
                if e.is_unauthorized() {
                    PublishError::TokenRejected(e.to_string())
                } else {
                    PublishError::ProviderRejected(format!("Failed to resolve LinkedIn member id: {}", e))
                }
            })?;
        Ok(info.sub)
    }
}

#[async_trait]
impl Publisher for StructuredApiPublisher {
    fn platform(&self) -> &str {
        LINKEDIN_PLATFORM
    }

    fn strategy(&self) -> PublishStrategy {
        PublishStrategy::Structured
    }

    async fn publish(
        &self,
        owner_id: &str,
        content: &PublishContent,
    ) -> Result<PostReceipt, PublishError> {
        self.post(
            owner_id,
            &content.content,
            content.title.as_deref(),
            content.image_ref.as_deref(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_content_untouched() {
        let (text, truncated) = truncate_content("Hiring Rust engineers");
        assert_eq!(text, "Hiring Rust engineers");
        assert!(!truncated);
    }

    #[test]
    fn test_exact_limit_is_not_truncated() {
        let content = "a".repeat(MAX_CONTENT_CHARS);
        let (text, truncated) = truncate_content(&content);
        assert_eq!(text.chars().count(), MAX_CONTENT_CHARS);
        assert!(!truncated);
    }

    #[test]
    fn test_long_content_truncated_to_limit() {
        let content = "x".repeat(4000);
        let (text, truncated) = truncate_content(&content);
        assert_eq!(text.chars().count(), 3000);
        assert!(truncated);
    }

    #[test]
    fn test_titled_post_gets_headline_and_hashtags() {
        let text = compose_post_text("Join our platform team.", Some("Rust Engineer"));
        assert_eq!(
            text,
            "🚀 We're Hiring! Rust Engineer\n\nJoin our platform team.\n\n#hiring #jobs #career #opportunity"
        );
    }

    #[test]
    fn test_untitled_or_blank_title_is_verbatim() {
        assert_eq!(compose_post_text("Plain update", None), "Plain update");
        assert_eq!(compose_post_text("Plain update", Some("  ")), "Plain update");
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let content = "é".repeat(3500);
        let (text, truncated) = truncate_content(&content);
        assert_eq!(text.chars().count(), MAX_CONTENT_CHARS);
        assert!(truncated);
    }
}
