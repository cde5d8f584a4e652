use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use assigner_dispatcher::{ConnectionRegistry, DispatchService};

use crate::handlers::{
    dispatch::assign_service_provider, health::health_check, root::root_handler,
    workers::list_connected_workers, ws::worker_socket,
};

/// API应用状态
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<DispatchService>,
    pub registry: Arc<ConnectionRegistry>,
}

/// 创建API路由
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        // 分派
        .route("/assign-service-provider", post(assign_service_provider))
        // Worker
        .route("/api/workers/connected", get(list_connected_workers))
        .route("/ws", get(worker_socket))
        .with_state(state)
}
