use crate::dtos::{
    AutomationPublishRequest, AutomationVerifyRequest, PostingGuidelinesResponse, PublishRequestDto,
    VerificationHelpResponse,
};
use crate::middleware::OwnerId;
use crate::models::{OverallStatus, PublishFailureKind, PublishReport, PublishResult};
use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use service_core::error::AppError;
use validator::Validate;

/// Structured publish across the requested platforms.
///
/// 200 when every platform succeeded, 207 on partial success and 502 when
/// nothing was published. The body is the full report in every case.
pub async fn publish(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    Json(req): Json<PublishRequestDto>,
) -> Result<(StatusCode, Json<PublishReport>), AppError> {
    req.validate()?;

    let report = state.orchestrator.publish(&owner_id, req.into()).await?;
    let status = match report.overall_status {
        OverallStatus::Success => StatusCode::OK,
        OverallStatus::Partial => StatusCode::MULTI_STATUS,
        OverallStatus::Failed => StatusCode::BAD_GATEWAY,
    };

    Ok((status, Json(report)))
}

/// Browser automation publish with caller-supplied login.
pub async fn publish_automation(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    Json(req): Json<AutomationPublishRequest>,
) -> Result<(StatusCode, Json<PublishResult>), AppError> {
    req.validate()?;

    let (login, post) = req.into_parts();
    let result = state.automation.publish(&owner_id, login, post).await;
    Ok((result_status(&result), Json(result)))
}

/// Logs in through the browser without posting.
pub async fn verify_automation_login(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    Json(req): Json<AutomationVerifyRequest>,
) -> Result<(StatusCode, Json<PublishResult>), AppError> {
    let result = state.automation.verify_login(&owner_id, req.into()).await;
    Ok((result_status(&result), Json(result)))
}

pub async fn posting_guidelines() -> Json<PostingGuidelinesResponse> {
    Json(PostingGuidelinesResponse::linkedin())
}

/// Challenge help, with the wait bound taken from the automation settings.
pub async fn verification_help(State(state): State<AppState>) -> Json<VerificationHelpResponse> {
    Json(VerificationHelpResponse::new(
        state.config.automation.max_verification_wait(),
    ))
}

fn result_status(result: &PublishResult) -> StatusCode {
    match result.failure_kind() {
        None => StatusCode::OK,
        Some(PublishFailureKind::NotConnected) => StatusCode::NOT_FOUND,
        Some(_) => StatusCode::BAD_GATEWAY,
    }
}
