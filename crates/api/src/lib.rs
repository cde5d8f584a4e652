//! # Assigner API
//!
//! 就近分配服务的HTTP/WebSocket接口层，基于Axum构建。
//!
//! ## API 端点
//!
//! - `POST /assign-service-provider` - 为请求方位置分配服务提供者
//! - `GET /` - 存活探测
//! - `GET /health` - 健康检查（含在线Worker数量）
//! - `GET /api/workers/connected` - 当前在线的Worker
//! - `GET /ws` - Worker长连接入口
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use assigner_api::{create_app, routes::AppState};
//!
//! let state = AppState { service, registry };
//! let app = create_app(state, &config.api);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! ```
//!
//! ### 调用示例
//!
//! ```bash
//! curl -X POST http://localhost:3000/assign-service-provider \
//!   -H "Content-Type: application/json" \
//!   -d '{"clientLocation": {"lat": -1.2864, "lon": 36.8172}}'
//! ```
//!
//! ## 响应格式
//!
//! ### 成功响应
//! ```json
//! {
//!   "success": true,
//!   "data": {
//!     "provider": {"id": "54321", "name": "Provider B", "status": "online", "location": {"lat": -1.2256, "lon": 36.9245}},
//!     "requestId": "6f1c...",
//!     "attempts": [{"index": 0, "identity": "54321", "result": "accepted"}]
//!   },
//!   "timestamp": "2024-01-01T00:00:00Z"
//! }
//! ```
//!
//! ### 错误响应
//! ```json
//! {
//!   "success": false,
//!   "message": "No available service providers.",
//!   "error_type": "NONE_AVAILABLE",
//!   "code": 400,
//!   "suggestions": ["..."],
//!   "timestamp": "2024-01-01T00:00:00Z"
//! }
//! ```

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;

use axum::Router;
use tower::ServiceBuilder;

use assigner_core::config::ApiConfig;
use middleware::{cors_layer, request_logging, trace_layer};
use routes::{create_routes, AppState};

/// 创建完整的API应用
pub fn create_app(state: AppState, api_config: &ApiConfig) -> Router {
    let router = create_routes(state);
    let router = if api_config.cors_enabled {
        router.layer(cors_layer(&api_config.cors_origins))
    } else {
        router
    };

    router.layer(
        ServiceBuilder::new()
            .layer(trace_layer())
            .layer(axum::middleware::from_fn(request_logging)),
    )
}
