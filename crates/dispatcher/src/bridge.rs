use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use assigner_core::{
    config::BusyPolicy,
    models::{WorkerIdentity, WorkerReply},
    AssignerError, AssignerResult,
};

use crate::connection::ReplySignal;
use crate::registry::ConnectionRegistry;

/// 在单向发送的连接上模拟请求/应答
///
/// 每个连接同一时刻只允许一个未完成的调用。超时由调用方负责：
/// 丢弃返回的future即取消等待，并清除连接上的登记，迟到的应答会被当作无主消息丢弃。
pub struct RequestReplyBridge {
    registry: Arc<ConnectionRegistry>,
    busy_policy: BusyPolicy,
}

impl RequestReplyBridge {
    pub fn new(registry: Arc<ConnectionRegistry>, busy_policy: BusyPolicy) -> Self {
        Self {
            registry,
            busy_policy,
        }
    }

    /// 发送消息并等待该连接上对应的下一条应答
    pub async fn send_and_await(
        &self,
        identity: &WorkerIdentity,
        correlation_id: Uuid,
        payload: String,
    ) -> AssignerResult<WorkerReply> {
        let connection = self.registry.lookup(identity).await.ok_or_else(|| {
            AssignerError::WorkerUnreachable {
                identity: identity.clone(),
            }
        })?;

        let _serial = match self.busy_policy {
            BusyPolicy::Reject => connection.call_lock().try_lock().map_err(|_| {
                AssignerError::ChannelBusy {
                    identity: identity.clone(),
                }
            })?,
            BusyPolicy::Queue => connection.call_lock().lock().await,
        };

        if connection.is_closed() {
            return Err(AssignerError::ChannelClosed {
                identity: identity.clone(),
            });
        }

        let (call, reply_rx) =
            connection
                .begin_call(correlation_id)
                .ok_or_else(|| AssignerError::ChannelBusy {
                    identity: identity.clone(),
                })?;

        if !connection.send_text(payload) {
            return Err(AssignerError::ChannelClosed {
                identity: identity.clone(),
            });
        }
        debug!("已向Worker {} 发送请求 {}", identity, correlation_id);

        let result = match reply_rx.await {
            Ok(ReplySignal::Reply(reply)) => Ok(reply),
            Ok(ReplySignal::Closed) | Err(_) => Err(AssignerError::ChannelClosed {
                identity: identity.clone(),
            }),
        };
        drop(call);

        result
    }
}
