use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use assigner_api::{create_app, routes::AppState};
use assigner_core::config::AppConfig;

use crate::shutdown::ShutdownSignal;
use assigner_dispatcher::{
    ConnectionRegistry, DispatchCoordinator, DispatchService, RequestReplyBridge, StaticCatalog,
};

/// 主应用程序
///
/// 注册表、协调器和目录在这里创建一次，通过 `AppState` 共享给所有连接和请求。
pub struct Application {
    config: AppConfig,
    registry: Arc<ConnectionRegistry>,
    service: Arc<DispatchService>,
}

impl Application {
    pub fn new(config: AppConfig) -> Result<Self> {
        config.validate().context("配置校验失败")?;

        let registry = Arc::new(ConnectionRegistry::new());
        let bridge = Arc::new(RequestReplyBridge::new(
            Arc::clone(&registry),
            config.dispatcher.busy_policy,
        ));
        let catalog = Arc::new(StaticCatalog::new(config.catalog.candidates.clone()));
        let service = Arc::new(DispatchService::new(
            catalog,
            DispatchCoordinator::new(bridge),
            config.dispatcher.clone(),
        ));

        info!(
            "初始化应用程序: {} 个候选者, 距离阈值 {}km, 单次应答超时 {}ms, 忙碌策略 {:?}",
            config.catalog.candidates.len(),
            config.dispatcher.proximity_threshold_km,
            config.dispatcher.per_candidate_timeout_ms,
            config.dispatcher.busy_policy
        );

        Ok(Self {
            config,
            registry,
            service,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// 构建HTTP/WebSocket路由
    pub fn router(&self) -> Router {
        create_app(
            AppState {
                service: Arc::clone(&self.service),
                registry: Arc::clone(&self.registry),
            },
            &self.config.api,
        )
    }

    /// 运行直到收到关闭信号
    pub async fn run(&self, mut shutdown: ShutdownSignal) -> Result<()> {
        if !self.config.api.enabled {
            warn!("API服务器被禁用，没有可接入的Worker");
            shutdown.recv().await;
            return Ok(());
        }

        let listener = TcpListener::bind(&self.config.api.bind_address)
            .await
            .with_context(|| format!("绑定地址失败: {}", self.config.api.bind_address))?;
        self.serve(listener, shutdown).await
    }

    /// 在给定监听器上提供服务
    pub async fn serve(
        &self,
        listener: TcpListener,
        mut shutdown: ShutdownSignal,
    ) -> Result<()> {
        let local_addr = listener.local_addr().context("获取监听地址失败")?;
        info!("API服务器启动在 http://{}", local_addr);

        let registry = Arc::clone(&self.registry);
        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                shutdown.recv().await;
                info!("API服务器收到关闭信号");
                // Worker长连接不会自行结束，主动关闭
                registry.close_all().await;
            })
            .await
            .context("API服务器运行失败")?;

        info!("API服务器已停止");
        Ok(())
    }
}
