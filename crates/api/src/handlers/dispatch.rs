use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use assigner_core::models::{Candidate, ContactAttempt, DispatchOutcome, GeoPoint};

use crate::{
    error::{ApiError, ApiResult},
    response::ApiResponse,
    routes::AppState,
};

/// 分配请求
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    #[serde(alias = "requesterLocation")]
    pub client_location: GeoPoint,
}

/// 分配成功的结果
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentResponse {
    pub provider: Candidate,
    pub request_id: Uuid,
    pub attempts: Vec<ContactAttempt>,
}

/// 为请求方分配最近的可用服务提供者
pub async fn assign_service_provider(
    State(state): State<AppState>,
    payload: Result<Json<AssignRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let report = state.service.assign(request.client_location).await?;

    match report.outcome {
        DispatchOutcome::Assigned { candidate } => {
            info!("分派 {} 选定服务提供者 {}", report.request_id, candidate.id);
            Ok(ApiResponse::success_with_message(
                AssignmentResponse {
                    provider: candidate,
                    request_id: report.request_id,
                    attempts: report.attempts,
                },
                "Service provider assigned".to_string(),
            ))
        }
        DispatchOutcome::NoneAvailable => Err(ApiError::NoneAvailable {
            request_id: report.request_id,
            attempts: report.attempts.len(),
        }),
    }
}
