//! Prometheus export plus the publish pipeline's counters.

use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use service_core::error::AppError;
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Installs the global Prometheus recorder. Later calls are no-ops.
pub fn init_metrics() -> Result<(), AppError> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("failed to install Prometheus recorder: {}", e))
    })?;

    // Losing a race here only means another caller installed first.
    let _ = METRICS_HANDLE.set(handle);
    Ok(())
}

pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized".to_string())
}

pub fn record_publish_attempt(platform: &str, strategy: &'static str) {
    counter!(
        "publish_attempts_total",
        "platform" => platform.to_string(),
        "strategy" => strategy
    )
    .increment(1);
}

pub fn record_publish_outcome(platform: &str, strategy: &'static str, success: bool) {
    let labels = [
        ("platform", platform.to_string()),
        ("strategy", strategy.to_string()),
    ];
    if success {
        counter!("publish_success_total", &labels).increment(1);
    } else {
        counter!("publish_failure_total", &labels).increment(1);
    }
}

pub fn record_token_refresh(outcome: &'static str) {
    counter!("linkedin_token_refresh_total", "outcome" => outcome).increment(1);
}
