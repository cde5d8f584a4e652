use axum::extract::State;

use crate::{error::ApiResult, response::success, routes::AppState};

/// 获取当前在线的Worker
pub async fn list_connected_workers(
    State(state): State<AppState>,
) -> ApiResult<impl axum::response::IntoResponse> {
    Ok(success(state.registry.connected().await))
}
