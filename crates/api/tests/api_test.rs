use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use assigner_api::{create_app, routes::AppState};
use assigner_core::{
    config::{ApiConfig, BusyPolicy, DispatcherConfig},
    models::{Candidate, CandidateStatus, GeoPoint},
};
use assigner_dispatcher::{
    ConnectionRegistry, DispatchCoordinator, DispatchService, OutboundFrame, RequestReplyBridge,
    StaticCatalog, WorkerSession,
};

const NAIROBI: (f64, f64) = (-1.2864, 36.8172);

fn test_app(registry: &Arc<ConnectionRegistry>) -> Router {
    let catalog = StaticCatalog::new(vec![
        Candidate::new(
            "+254706434259",
            "Provider A",
            CandidateStatus::Online,
            GeoPoint::new(-1.286389, 36.817223),
        ),
        Candidate::new(
            "54321",
            "Provider B",
            CandidateStatus::Online,
            GeoPoint::new(-1.225602, 36.924546),
        ),
    ]);
    let coordinator = DispatchCoordinator::new(Arc::new(RequestReplyBridge::new(
        Arc::clone(registry),
        BusyPolicy::Reject,
    )));
    let service = DispatchService::new(
        Arc::new(catalog),
        coordinator,
        DispatcherConfig {
            per_candidate_timeout_ms: 200,
            ..DispatcherConfig::default()
        },
    );

    create_app(
        AppState {
            service: Arc::new(service),
            registry: Arc::clone(registry),
        },
        &ApiConfig::default(),
    )
}

/// 声明身份后按 `accept` 应答每一次询问
async fn connect_worker(registry: &Arc<ConnectionRegistry>, id: &str, accept: bool) {
    let (mut session, mut outbound) = WorkerSession::open(Arc::clone(registry));
    session
        .handle_text(&json!({ "userId": id }).to_string())
        .await;

    let id = id.to_string();
    tokio::spawn(async move {
        while let Some(OutboundFrame::Text(text)) = outbound.recv().await {
            let ping: Value = serde_json::from_str(&text).unwrap();
            let reply = json!({
                "userId": id,
                "requestId": ping["requestId"],
                "accepted": accept
            });
            session.handle_text(&reply.to_string()).await;
        }
    });
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn assign_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/assign-service-provider")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_root_endpoint() {
    let registry = Arc::new(ConnectionRegistry::new());
    let response = test_app(&registry)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"Hello from the server");
}

#[tokio::test]
async fn test_health_reports_connected_workers() {
    let registry = Arc::new(ConnectionRegistry::new());
    connect_worker(&registry, "54321", true).await;

    let response = test_app(&registry)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["connected_workers"], 1);
}

#[tokio::test]
async fn test_health_skips_closed_connections() {
    let registry = Arc::new(ConnectionRegistry::new());
    connect_worker(&registry, "54321", true).await;

    // 已关闭但尚未注销的连接
    let (mut session, _outbound) = WorkerSession::open(Arc::clone(&registry));
    session.handle_text(r#"{"userId": "closing"}"#).await;
    session.connection().close();

    let app = test_app(&registry);
    let health = body_json(
        app.clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap(),
    )
    .await;
    let listing = body_json(
        app.oneshot(
            Request::builder()
                .uri("/api/workers/connected")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap(),
    )
    .await;

    assert_eq!(health["connected_workers"], 1);
    assert_eq!(listing["data"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_connected_workers_listing() {
    let registry = Arc::new(ConnectionRegistry::new());
    connect_worker(&registry, "54321", true).await;
    connect_worker(&registry, "+254706434259", true).await;

    let response = test_app(&registry)
        .oneshot(
            Request::builder()
                .uri("/api/workers/connected")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let identities: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|worker| worker["identity"].as_str().unwrap())
        .collect();
    assert_eq!(identities, vec!["+254706434259", "54321"]);
}

#[tokio::test]
async fn test_assign_picks_nearest_accepting_provider() {
    let registry = Arc::new(ConnectionRegistry::new());
    connect_worker(&registry, "+254706434259", false).await;
    connect_worker(&registry, "54321", true).await;

    let response = test_app(&registry)
        .oneshot(assign_request(json!({
            "clientLocation": { "lat": NAIROBI.0, "lon": NAIROBI.1 }
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["provider"]["id"], "54321");
    assert_eq!(body["data"]["attempts"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_assign_accepts_requester_location_alias() {
    let registry = Arc::new(ConnectionRegistry::new());
    connect_worker(&registry, "+254706434259", true).await;

    let response = test_app(&registry)
        .oneshot(assign_request(json!({
            "requesterLocation": { "lat": NAIROBI.0, "lon": NAIROBI.1 }
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["provider"]["id"], "+254706434259");
}

#[tokio::test]
async fn test_assign_without_connected_workers() {
    let registry = Arc::new(ConnectionRegistry::new());

    let response = test_app(&registry)
        .oneshot(assign_request(json!({
            "clientLocation": { "lat": NAIROBI.0, "lon": NAIROBI.1 }
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "No available service providers.");
    assert_eq!(body["error_type"], "NONE_AVAILABLE");
}

#[tokio::test]
async fn test_assign_rejects_malformed_body() {
    let registry = Arc::new(ConnectionRegistry::new());

    let response = test_app(&registry)
        .oneshot(assign_request(json!({ "location": "nowhere" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error_type"], "BAD_REQUEST");
}
