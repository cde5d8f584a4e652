use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use assigner_core::AssignerError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("No available service providers.")]
    NoneAvailable { request_id: Uuid, attempts: usize },

    #[error("分派错误: {0}")]
    Assigner(#[from] AssignerError),

    #[error("请求参数错误: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message, error_type, suggestions) = match &self {
            ApiError::NoneAvailable {
                request_id,
                attempts,
            } => (
                StatusCode::BAD_REQUEST,
                self.to_string(),
                "NONE_AVAILABLE".to_string(),
                vec![
                    format!("分派 {request_id} 共联系了 {attempts} 个候选者"),
                    "使用 GET /api/workers/connected 查看在线的Worker".to_string(),
                ],
            ),
            ApiError::Assigner(AssignerError::MalformedPayload(msg)) => (
                StatusCode::BAD_REQUEST,
                format!("请求数据格式错误: {msg}"),
                "MALFORMED_PAYLOAD".to_string(),
                vec!["请检查JSON格式是否正确".to_string()],
            ),
            ApiError::Assigner(AssignerError::Catalog(msg)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("候选目录不可用: {msg}"),
                "CATALOG_UNAVAILABLE".to_string(),
                vec!["请稍后重试".to_string()],
            ),
            ApiError::Assigner(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "系统内部错误".to_string(),
                "INTERNAL_ERROR".to_string(),
                vec![
                    "系统遇到内部错误，请稍后重试".to_string(),
                    "查看 GET /health 检查系统状态".to_string(),
                ],
            ),
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                format!("请求参数错误: {msg}"),
                "BAD_REQUEST".to_string(),
                vec!["请检查请求格式和参数".to_string()],
            ),
        };

        let body = Json(json!({
            "success": false,
            "message": error_message,
            "error_type": error_type,
            "code": status.as_u16(),
            "suggestions": suggestions,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
