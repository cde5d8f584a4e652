#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use tokio::task::JoinHandle;

use assigner_core::{
    config::BusyPolicy,
    models::{Candidate, CandidateStatus, DispatchRequest, GeoPoint},
};
use assigner_dispatcher::{
    ConnectionRegistry, DispatchCoordinator, InboundDisposition, OutboundFrame,
    RequestReplyBridge, WorkerSession,
};

/// 模拟Worker对一次询问的反应
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reply {
    /// 回显自己的身份和requestId
    Accept,
    /// 回显身份但 `accepted: false`
    Decline,
    /// 回显别人的身份
    Impostor,
    /// 只回显身份，不带requestId
    Legacy,
    /// 先发一条给定的无效消息，再接受
    GarbledThenAccept(&'static str),
    /// 不应答
    Silent,
    /// 断开连接
    Disconnect,
}

#[derive(Debug, Clone, Copy)]
pub struct Step {
    pub delay: Duration,
    pub reply: Reply,
}

impl Step {
    pub fn now(reply: Reply) -> Self {
        Self {
            delay: Duration::ZERO,
            reply,
        }
    }

    pub fn after(millis: u64, reply: Reply) -> Self {
        Self {
            delay: Duration::from_millis(millis),
            reply,
        }
    }
}

/// 通过WorkerSession接入注册表的模拟Worker
///
/// 按脚本依次处理收到的询问，最后一步重复使用。
pub struct FakeWorker {
    pub id: String,
    pings: Arc<Mutex<Vec<Value>>>,
    dispositions: Arc<Mutex<Vec<InboundDisposition>>>,
    handle: JoinHandle<()>,
}

impl FakeWorker {
    pub async fn spawn(registry: &Arc<ConnectionRegistry>, id: &str, script: Vec<Step>) -> Self {
        assert!(!script.is_empty());
        let (mut session, mut outbound) = WorkerSession::open(Arc::clone(registry));
        let announced = session.handle_text(&json!({ "userId": id }).to_string()).await;
        assert!(matches!(announced, InboundDisposition::Announced { .. }));

        let pings = Arc::new(Mutex::new(Vec::new()));
        let dispositions = Arc::new(Mutex::new(Vec::new()));
        let worker_id = id.to_string();

        let handle = {
            let pings = Arc::clone(&pings);
            let dispositions = Arc::clone(&dispositions);
            tokio::spawn(async move {
                let mut step_index = 0;
                while let Some(frame) = outbound.recv().await {
                    let text = match frame {
                        OutboundFrame::Text(text) => text,
                        OutboundFrame::Close => break,
                    };
                    let ping: Value = serde_json::from_str(&text).unwrap();
                    pings.lock().unwrap().push(ping.clone());

                    let step = script[step_index.min(script.len() - 1)];
                    step_index += 1;
                    if !step.delay.is_zero() {
                        tokio::time::sleep(step.delay).await;
                    }

                    if let Reply::GarbledThenAccept(text) = step.reply {
                        let disposition = session.handle_text(text).await;
                        dispositions.lock().unwrap().push(disposition);
                    }

                    let request_id = ping["requestId"].clone();
                    let message = match step.reply {
                        Reply::Accept | Reply::GarbledThenAccept(_) => {
                            json!({ "userId": worker_id, "requestId": request_id })
                        }
                        Reply::Decline => json!({
                            "userId": worker_id,
                            "requestId": request_id,
                            "accepted": false
                        }),
                        Reply::Impostor => {
                            json!({ "userId": "someone-else", "requestId": request_id })
                        }
                        Reply::Legacy => json!({ "userId": worker_id }),
                        Reply::Silent => continue,
                        Reply::Disconnect => break,
                    };

                    let disposition = session.handle_text(&message.to_string()).await;
                    dispositions.lock().unwrap().push(disposition);
                }
                session.close().await;
            })
        };

        Self {
            id: id.to_string(),
            pings,
            dispositions,
            handle,
        }
    }

    pub async fn accepting(registry: &Arc<ConnectionRegistry>, id: &str) -> Self {
        Self::spawn(registry, id, vec![Step::now(Reply::Accept)]).await
    }

    pub fn ping_count(&self) -> usize {
        self.pings.lock().unwrap().len()
    }

    pub fn pings(&self) -> Vec<Value> {
        self.pings.lock().unwrap().clone()
    }

    pub fn dispositions(&self) -> Vec<InboundDisposition> {
        self.dispositions.lock().unwrap().clone()
    }

    pub fn abort(&self) {
        self.handle.abort();
    }
}

pub fn origin() -> GeoPoint {
    GeoPoint::new(-1.2864, 36.8172)
}

pub fn candidate(id: &str) -> Candidate {
    Candidate::new(id, format!("Provider {id}"), CandidateStatus::Online, origin())
}

pub fn request(ids: &[&str], timeout_ms: u64) -> DispatchRequest {
    DispatchRequest::new(
        origin(),
        ids.iter().map(|id| candidate(id)).collect(),
        70.0,
        Duration::from_millis(timeout_ms),
    )
}

pub fn coordinator(registry: &Arc<ConnectionRegistry>, policy: BusyPolicy) -> DispatchCoordinator {
    DispatchCoordinator::new(Arc::new(RequestReplyBridge::new(
        Arc::clone(registry),
        policy,
    )))
}
