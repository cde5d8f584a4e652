use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

/// 优雅关闭管理器
///
/// 关闭状态保存在 `watch` 通道中，关闭之后才订阅的接收端也能立即观察到。
#[derive(Debug, Clone)]
pub struct ShutdownManager {
    state: Arc<watch::Sender<bool>>,
}

/// 关闭信号的接收端
#[derive(Debug, Clone)]
pub struct ShutdownSignal(watch::Receiver<bool>);

impl ShutdownManager {
    pub fn new() -> Self {
        let (state, _) = watch::channel(false);
        Self {
            state: Arc::new(state),
        }
    }

    /// 订阅关闭信号
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal(self.state.subscribe())
    }

    /// 触发关闭，返回本次调用是否真正触发了关闭
    pub fn shutdown(&self) -> bool {
        let triggered = self
            .state
            .send_if_modified(|stopped| !std::mem::replace(stopped, true));

        if triggered {
            info!("触发系统关闭，通知 {} 个订阅者", self.state.receiver_count());
        } else {
            debug!("关闭管理器已经触发过关闭");
        }
        triggered
    }
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    /// 等待关闭；管理器全部释放时同样返回
    pub async fn recv(&mut self) {
        let _ = self.0.wait_for(|stopped| *stopped).await;
    }
}
