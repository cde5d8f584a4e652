use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use assigner_core::models::{WorkerAnnouncement, WorkerIdentity, WorkerReply};

use crate::connection::{Connection, Delivery, OutboundFrame};
use crate::registry::{ConnectionRegistry, Registration};

/// 入站消息的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundDisposition {
    /// 首条消息声明了身份
    Announced {
        identity: WorkerIdentity,
        replaced: bool,
    },
    /// 作为等待中请求的应答
    Reply,
    /// 关联ID不匹配的迟到应答
    Stale,
    /// 没有等待中的请求
    Unsolicited,
    /// 无法解析的消息，已忽略
    Malformed,
}

/// 单个Worker连接的协议状态
///
/// 传输层（WebSocket等）负责收发帧，这里只处理身份声明、应答投递和断开清理。
pub struct WorkerSession {
    registry: Arc<ConnectionRegistry>,
    connection: Arc<Connection>,
    identity: Option<WorkerIdentity>,
}

impl WorkerSession {
    /// 为新接入的连接创建会话，返回会话和出站帧接收端
    pub fn open(registry: Arc<ConnectionRegistry>) -> (Self, mpsc::UnboundedReceiver<OutboundFrame>) {
        let (connection, outbound_rx) = Connection::new();
        debug!("新连接接入: {}", connection.id());
        (
            Self {
                registry,
                connection,
                identity: None,
            },
            outbound_rx,
        )
    }

    pub fn connection(&self) -> &Arc<Connection> {
        &self.connection
    }

    pub fn identity(&self) -> Option<&WorkerIdentity> {
        self.identity.as_ref()
    }

    /// 处理一条文本消息
    ///
    /// 无法解码为应答的消息在投递之前丢弃，不影响等待中的请求。
    pub async fn handle_text(&mut self, text: &str) -> InboundDisposition {
        let value: serde_json::Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(e) => {
                warn!("无法解析Worker消息，已忽略: {e}");
                return InboundDisposition::Malformed;
            }
        };

        let identity = match self.identity.clone() {
            Some(identity) => identity,
            None => return self.announce(value).await,
        };

        let reply = match WorkerReply::decode(value) {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Worker {} 的消息无法识别为应答，已忽略: {e}", identity);
                return InboundDisposition::Malformed;
            }
        };

        match self.connection.deliver(reply) {
            Delivery::Delivered => {
                debug!("收到Worker {} 的应答", identity);
                InboundDisposition::Reply
            }
            Delivery::Stale { received } => {
                warn!("丢弃Worker {} 的过期应答 (requestId: {})", identity, received);
                InboundDisposition::Stale
            }
            Delivery::Unsolicited => {
                debug!("Worker {} 发来无对应请求的消息，已忽略", identity);
                InboundDisposition::Unsolicited
            }
        }
    }

    async fn announce(&mut self, value: serde_json::Value) -> InboundDisposition {
        let announcement: WorkerAnnouncement = match serde_json::from_value(value) {
            Ok(announcement) => announcement,
            Err(e) => {
                warn!("首条消息缺少有效的userId，已忽略: {e}");
                return InboundDisposition::Malformed;
            }
        };

        let identity = announcement.user_id;
        let registration = self
            .registry
            .register(identity.clone(), Arc::clone(&self.connection))
            .await;
        self.identity = Some(identity.clone());

        InboundDisposition::Announced {
            identity,
            replaced: matches!(registration, Registration::Replaced { .. }),
        }
    }

    /// 连接断开：移除注册并结束等待中的请求
    pub async fn close(self) {
        self.registry.unregister(self.connection.id()).await;
        self.connection.close();
    }
}
