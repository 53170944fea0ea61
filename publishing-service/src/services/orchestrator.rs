use crate::models::{
    PublishFailureKind, PublishReport, PublishRequest, PublishResult, PublishStrategy,
};
use crate::services::error::ServiceError;
use crate::services::metrics;
use crate::services::publishers::{PostReceipt, PublishContent, PublishError, Publisher};
use crate::services::token_manager::TokenLifecycleManager;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

enum Dispatch {
    Done(PublishResult),
    Running {
        platform: String,
        strategy: PublishStrategy,
        handle: JoinHandle<PublishResult>,
    },
}

/// Fans a publish request out to the registered publisher of every requested
/// platform and folds the outcomes into one report.
///
/// Each platform runs in its own task under its own timeout, so a slow,
/// failing or panicking publisher never affects its siblings.
pub struct PublishOrchestrator {
    publishers: HashMap<String, Arc<dyn Publisher>>,
    tokens: Arc<TokenLifecycleManager>,
    platform_timeout: Duration,
}

impl PublishOrchestrator {
    pub fn new(tokens: Arc<TokenLifecycleManager>, platform_timeout: Duration) -> Self {
        Self {
            publishers: HashMap::new(),
            tokens,
            platform_timeout,
        }
    }

    pub fn with_publisher(mut self, publisher: Arc<dyn Publisher>) -> Self {
        self.publishers
            .insert(publisher.platform().to_lowercase(), publisher);
        self
    }

    pub fn platforms(&self) -> Vec<String> {
        let mut platforms: Vec<String> = self.publishers.keys().cloned().collect();
        platforms.sort();
        platforms
    }

    pub async fn publish(
        &self,
        owner_id: &str,
        request: PublishRequest,
    ) -> Result<PublishReport, ServiceError> {
        let platforms = request.normalized_platforms();
        if platforms.is_empty() {
            return Err(ServiceError::EmptyPlatformSet);
        }

        tracing::info!(
            owner_id = %owner_id,
            target_id = %request.target_id,
            platforms = ?platforms,
            "Publishing to platforms"
        );

        let content = Arc::new(PublishContent {
            content: request.content,
            title: request.title,
            image_ref: request.image_ref,
        });

        let dispatches: Vec<Dispatch> = platforms
            .into_iter()
            .map(|platform| self.dispatch(owner_id, platform, content.clone()))
            .collect();

        let mut results = Vec::with_capacity(dispatches.len());
        for dispatch in dispatches {
            let result = match dispatch {
                Dispatch::Done(result) => result,
                Dispatch::Running {
                    platform,
                    strategy,
                    handle,
                } => match handle.await {
                    Ok(result) => result,
                    Err(e) => {
                        tracing::error!(platform = %platform, error = %e, "Publish task aborted");
                        PublishResult::failed(
                            &platform,
                            strategy,
                            PublishFailureKind::Internal,
                            format!("Publishing task failed: {}", e),
                        )
                    }
                },
            };
            metrics::record_publish_outcome(&result.platform, result.strategy.as_str(), result.success);
            results.push(result);
        }

        let report = PublishReport::new(request.target_id, results);
        tracing::info!(
            owner_id = %owner_id,
            target_id = %report.target_id,
            overall_status = ?report.overall_status,
            "Publish request completed"
        );
        Ok(report)
    }

    fn dispatch(&self, owner_id: &str, platform: String, content: Arc<PublishContent>) -> Dispatch {
        let Some(publisher) = self.publishers.get(&platform).cloned() else {
            tracing::warn!(platform = %platform, "No publisher registered for platform");
            return Dispatch::Done(PublishResult::failed(
                &platform,
                PublishStrategy::None,
                PublishFailureKind::UnsupportedPlatform,
                format!("No publisher registered for platform '{}'", platform),
            ));
        };

        let strategy = publisher.strategy();
        let tokens = self.tokens.clone();
        let owner_id = owner_id.to_string();
        let timeout = self.platform_timeout;
        let task_platform = platform.clone();

        let handle = tokio::spawn(async move {
            let started = Instant::now();
            let attempt = publish_with_retry(publisher.as_ref(), &tokens, &owner_id, &content);

            match tokio::time::timeout(timeout, attempt).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        platform = %task_platform,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Publish attempt timed out"
                    );
                    PublishResult::failed(
                        &task_platform,
                        strategy,
                        PublishFailureKind::Timeout,
                        format!("Publishing timed out after {}s", timeout.as_secs()),
                    )
                }
            }
        });

        Dispatch::Running {
            platform,
            strategy,
            handle,
        }
    }
}

/// One attempt, plus exactly one refresh-and-retry when LinkedIn rejected
/// the token.
async fn publish_with_retry(
    publisher: &dyn Publisher,
    tokens: &TokenLifecycleManager,
    owner_id: &str,
    content: &PublishContent,
) -> PublishResult {
    let platform = publisher.platform().to_string();
    let strategy = publisher.strategy();

    metrics::record_publish_attempt(&platform, strategy.as_str());
    let outcome = match publisher.publish(owner_id, content).await {
        Err(e) if e.is_retryable() => {
            tracing::warn!(
                platform = %platform,
                owner_id = %owner_id,
                error = %e,
                "Token rejected, refreshing and retrying once"
            );
            match refresh(tokens, owner_id).await {
                Ok(()) => {
                    metrics::record_publish_attempt(&platform, strategy.as_str());
                    publisher.publish(owner_id, content).await
                }
                Err(refresh_err) => Err(refresh_err),
            }
        }
        other => other,
    };

    to_result(&platform, strategy, outcome)
}

async fn refresh(tokens: &TokenLifecycleManager, owner_id: &str) -> Result<(), PublishError> {
    tokens.force_refresh(owner_id).await?;
    Ok(())
}

fn to_result(
    platform: &str,
    strategy: PublishStrategy,
    outcome: Result<PostReceipt, PublishError>,
) -> PublishResult {
    match outcome {
        Ok(receipt) => PublishResult::succeeded(
            platform,
            strategy,
            format!("Published to {} successfully", platform),
        )
        .with_post_id(receipt.post_id)
        .with_truncated(receipt.truncated),
        Err(e) => {
            tracing::warn!(platform = %platform, error = %e, "Publish failed");
            PublishResult::failed(platform, strategy, e.kind(), e.to_string())
        }
    }
}
