use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;
use uuid::Uuid;

use assigner_core::models::WorkerReply;

/// 连接唯一标识
pub type ConnectionId = Uuid;

/// 发往Worker的帧
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    Text(String),
    Close,
}

/// 等待中的应答结果
#[derive(Debug)]
pub(crate) enum ReplySignal {
    Reply(WorkerReply),
    Closed,
}

struct PendingReply {
    correlation_id: Uuid,
    reply_tx: oneshot::Sender<ReplySignal>,
}

/// 入站消息的投递结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// 作为当前请求的应答投递
    Delivered,
    /// 关联ID与当前请求不符，丢弃
    Stale { received: String },
    /// 没有等待中的请求
    Unsolicited,
}

/// Worker发起的双向连接
///
/// 同一时刻最多只有一个等待应答的请求，由 `call_lock` 串行化。
pub struct Connection {
    id: ConnectionId,
    outbound: mpsc::UnboundedSender<OutboundFrame>,
    pending: Mutex<Option<PendingReply>>,
    call_lock: tokio::sync::Mutex<()>,
    closed: AtomicBool,
    opened_at: DateTime<Utc>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .field("opened_at", &self.opened_at)
            .finish()
    }
}

impl Connection {
    /// 创建连接，返回连接句柄和出站帧接收端
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<OutboundFrame>) {
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let connection = Arc::new(Self {
            id: Uuid::new_v4(),
            outbound,
            pending: Mutex::new(None),
            call_lock: tokio::sync::Mutex::new(()),
            closed: AtomicBool::new(false),
            opened_at: Utc::now(),
        });
        (connection, outbound_rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// 是否有等待应答的请求
    pub fn has_pending(&self) -> bool {
        self.pending_slot().is_some()
    }

    pub(crate) fn call_lock(&self) -> &tokio::sync::Mutex<()> {
        &self.call_lock
    }

    /// 发送文本帧，连接已关闭时返回false
    pub fn send_text(&self, text: String) -> bool {
        if self.is_closed() {
            return false;
        }
        self.outbound.send(OutboundFrame::Text(text)).is_ok()
    }

    /// 登记一个等待应答的请求；已有等待中的请求时返回None
    pub(crate) fn begin_call(
        &self,
        correlation_id: Uuid,
    ) -> Option<(PendingCall<'_>, oneshot::Receiver<ReplySignal>)> {
        let mut slot = self.pending_slot();
        if slot.is_some() {
            return None;
        }

        let (reply_tx, reply_rx) = oneshot::channel();
        *slot = Some(PendingReply {
            correlation_id,
            reply_tx,
        });

        Some((
            PendingCall {
                connection: self,
                correlation_id,
            },
            reply_rx,
        ))
    }

    /// 投递一条已解码的应答
    ///
    /// 带 `requestId` 的应答必须与等待中的请求一致；不带的应答（旧版Worker）
    /// 归属于唯一等待中的请求。
    pub fn deliver(&self, reply: WorkerReply) -> Delivery {
        let mut slot = self.pending_slot();

        let expected = match slot.as_ref() {
            Some(pending) => pending.correlation_id,
            None => return Delivery::Unsolicited,
        };

        if let Some(received) = &reply.request_id {
            if *received != expected.to_string() {
                return Delivery::Stale {
                    received: received.clone(),
                };
            }
        }

        match slot.take() {
            Some(pending) => {
                // 等待方可能已经放弃
                let _ = pending.reply_tx.send(ReplySignal::Reply(reply));
                Delivery::Delivered
            }
            None => Delivery::Unsolicited,
        }
    }

    /// 关闭连接：等待中的请求以ChannelClosed结束，并通知写端关闭
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        if let Some(pending) = self.pending_slot().take() {
            let _ = pending.reply_tx.send(ReplySignal::Closed);
        }

        let _ = self.outbound.send(OutboundFrame::Close);
        debug!("连接 {} 已关闭", self.id);
    }

    fn pending_slot(&self) -> MutexGuard<'_, Option<PendingReply>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// 等待应答的请求登记，丢弃时清除对应的登记
pub(crate) struct PendingCall<'a> {
    connection: &'a Connection,
    correlation_id: Uuid,
}

impl Drop for PendingCall<'_> {
    fn drop(&mut self) {
        let mut slot = self.connection.pending_slot();
        if slot.as_ref().map(|p| p.correlation_id) == Some(self.correlation_id) {
            *slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(request_id: Option<String>) -> WorkerReply {
        WorkerReply {
            user_id: Some("w1".into()),
            request_id,
            accepted: None,
        }
    }

    #[tokio::test]
    async fn test_deliver_without_pending_is_unsolicited() {
        let (connection, _rx) = Connection::new();
        assert_eq!(connection.deliver(reply(None)), Delivery::Unsolicited);
    }

    #[tokio::test]
    async fn test_deliver_resolves_pending_call() {
        let (connection, _rx) = Connection::new();
        let correlation = Uuid::new_v4();
        let (call, reply_rx) = connection.begin_call(correlation).unwrap();

        let sent = reply(Some(correlation.to_string()));
        assert_eq!(connection.deliver(sent.clone()), Delivery::Delivered);

        match reply_rx.await.unwrap() {
            ReplySignal::Reply(received) => assert_eq!(received, sent),
            ReplySignal::Closed => panic!("expected reply"),
        }
        drop(call);
        assert!(!connection.has_pending());
    }

    #[tokio::test]
    async fn test_stale_reply_does_not_resolve() {
        let (connection, _rx) = Connection::new();
        let (_call, _reply_rx) = connection.begin_call(Uuid::new_v4()).unwrap();

        let other = Uuid::new_v4().to_string();
        let delivery = connection.deliver(reply(Some(other.clone())));
        assert_eq!(delivery, Delivery::Stale { received: other });
        assert!(connection.has_pending());
    }

    #[tokio::test]
    async fn test_second_call_is_refused() {
        let (connection, _rx) = Connection::new();
        let _first = connection.begin_call(Uuid::new_v4()).unwrap();
        assert!(connection.begin_call(Uuid::new_v4()).is_none());
    }

    #[tokio::test]
    async fn test_dropping_call_clears_pending() {
        let (connection, _rx) = Connection::new();
        let (call, _reply_rx) = connection.begin_call(Uuid::new_v4()).unwrap();
        assert!(connection.has_pending());

        drop(call);
        assert!(!connection.has_pending());
        assert!(connection.begin_call(Uuid::new_v4()).is_some());
    }

    #[tokio::test]
    async fn test_close_fails_pending_and_sends_close_frame() {
        let (connection, mut rx) = Connection::new();
        let (_call, reply_rx) = connection.begin_call(Uuid::new_v4()).unwrap();

        connection.close();
        connection.close();

        assert!(matches!(reply_rx.await.unwrap(), ReplySignal::Closed));
        assert_eq!(rx.recv().await, Some(OutboundFrame::Close));
        assert!(connection.is_closed());
        assert!(!connection.send_text("late".to_string()));
    }
}
