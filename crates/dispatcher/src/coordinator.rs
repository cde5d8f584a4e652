use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use assigner_core::{
    models::{
        AttemptResult, Candidate, ContactAttempt, DispatchOutcome, DispatchReport,
        DispatchRequest, PingMessage,
    },
    AssignerError,
};

use crate::bridge::RequestReplyBridge;

/// 分派状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DispatchState {
    TryingCandidate(usize),
    Assigned(usize),
    Exhausted,
}

/// 当前候选者的应答窗口，受总截止时间约束；预算耗尽时返回None
fn candidate_window(request: &DispatchRequest, deadline: Option<Instant>) -> Option<Duration> {
    match deadline {
        Some(deadline) => {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                None
            } else {
                Some(remaining.min(request.per_candidate_timeout))
            }
        }
        None => Some(request.per_candidate_timeout),
    }
}

/// 顺序故障转移的分派协调器
///
/// 按排序依次联系候选者，每个候选者有独立的应答窗口。前一个候选者的结果
/// （接受、拒绝、断开或超时）确定之前不会联系下一个。
pub struct DispatchCoordinator {
    bridge: Arc<RequestReplyBridge>,
}

impl DispatchCoordinator {
    pub fn new(bridge: Arc<RequestReplyBridge>) -> Self {
        Self { bridge }
    }

    /// 执行一次分派，返回最终结果和联系记录
    pub async fn dispatch(&self, request: DispatchRequest) -> DispatchReport {
        let deadline = request
            .overall_deadline
            .map(|budget| Instant::now() + budget);
        let mut attempts = Vec::with_capacity(request.ranked_candidates.len());
        let mut state = DispatchState::TryingCandidate(0);

        info!(
            "开始分派 {}: {} 个候选者",
            request.request_id,
            request.ranked_candidates.len()
        );

        loop {
            state = match state {
                DispatchState::TryingCandidate(index) => {
                    match request.ranked_candidates.get(index) {
                        None => DispatchState::Exhausted,
                        Some(candidate) => match candidate_window(&request, deadline) {
                            None => {
                                warn!("分派 {} 超过总截止时间，停止尝试", request.request_id);
                                DispatchState::Exhausted
                            }
                            Some(window) => {
                                let result = self.contact(&request, candidate, window).await;
                                attempts.push(ContactAttempt {
                                    index,
                                    identity: candidate.id.clone(),
                                    result,
                                });

                                if result == AttemptResult::Accepted {
                                    DispatchState::Assigned(index)
                                } else {
                                    DispatchState::TryingCandidate(index + 1)
                                }
                            }
                        },
                    }
                }
                DispatchState::Assigned(index) => {
                    let candidate = request.ranked_candidates[index].clone();
                    info!(
                        "分派 {} 已分配给Worker {} (第 {} 次尝试)",
                        request.request_id,
                        candidate.id,
                        attempts.len()
                    );
                    return DispatchReport {
                        request_id: request.request_id,
                        outcome: DispatchOutcome::Assigned { candidate },
                        attempts,
                    };
                }
                DispatchState::Exhausted => {
                    info!(
                        "分派 {} 没有可用的Worker (尝试 {} 次)",
                        request.request_id,
                        attempts.len()
                    );
                    return DispatchReport {
                        request_id: request.request_id,
                        outcome: DispatchOutcome::NoneAvailable,
                        attempts,
                    };
                }
            };
        }
    }

    /// 联系单个候选者：应答与计时器竞争，输的一方被丢弃
    async fn contact(
        &self,
        request: &DispatchRequest,
        candidate: &Candidate,
        window: Duration,
    ) -> AttemptResult {
        // 每次联系使用独立的关联ID，迟到的应答不会被算到后续联系上
        let correlation_id = Uuid::new_v4();
        let payload = match PingMessage::new(
            correlation_id,
            request.request_id,
            candidate.id.clone(),
            request.requester_location,
        )
        .to_json()
        {
            Ok(payload) => payload,
            Err(e) => {
                error!("构造询问消息失败: {e}");
                return AttemptResult::Declined;
            }
        };

        let reply = tokio::time::timeout(
            window,
            self.bridge
                .send_and_await(&candidate.id, correlation_id, payload),
        )
        .await;

        match reply {
            Ok(Ok(reply)) if reply.accepts(&candidate.id) => AttemptResult::Accepted,
            Ok(Ok(_)) => {
                debug!("Worker {} 拒绝了分派 {}", candidate.id, request.request_id);
                AttemptResult::Declined
            }
            Ok(Err(e)) => {
                if e.is_candidate_failure() {
                    debug!("联系Worker {} 失败: {e}", candidate.id);
                } else {
                    warn!("联系Worker {} 时发生意外错误: {e}", candidate.id);
                }
                match e {
                    AssignerError::WorkerUnreachable { .. } => AttemptResult::Unreachable,
                    AssignerError::ChannelBusy { .. } => AttemptResult::Busy,
                    AssignerError::ChannelClosed { .. } => AttemptResult::ChannelClosed,
                    _ => AttemptResult::Declined,
                }
            }
            Err(_) => {
                let timeout = AssignerError::Timeout {
                    identity: candidate.id.clone(),
                    timeout_ms: window.as_millis() as u64,
                };
                info!("{timeout}");
                AttemptResult::TimedOut
            }
        }
    }
}
