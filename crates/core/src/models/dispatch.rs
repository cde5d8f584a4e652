use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Candidate, GeoPoint, WorkerIdentity};

/// 一次分派请求
///
/// 持有排序后的候选者快照，仅在顺序尝试期间存在。
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub request_id: Uuid,
    pub requester_location: GeoPoint,
    pub ranked_candidates: Vec<Candidate>,
    pub proximity_threshold_km: f64,
    pub per_candidate_timeout: Duration,
    /// 整个分派的总截止时间，None表示不限制
    pub overall_deadline: Option<Duration>,
}

impl DispatchRequest {
    pub fn new(
        requester_location: GeoPoint,
        ranked_candidates: Vec<Candidate>,
        proximity_threshold_km: f64,
        per_candidate_timeout: Duration,
    ) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            requester_location,
            ranked_candidates,
            proximity_threshold_km,
            per_candidate_timeout,
            overall_deadline: None,
        }
    }

    pub fn with_overall_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.overall_deadline = deadline;
        self
    }
}

/// 分派最终结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    Assigned { candidate: Candidate },
    NoneAvailable,
}

impl DispatchOutcome {
    pub fn is_assigned(&self) -> bool {
        matches!(self, DispatchOutcome::Assigned { .. })
    }

    pub fn assigned(&self) -> Option<&Candidate> {
        match self {
            DispatchOutcome::Assigned { candidate } => Some(candidate),
            DispatchOutcome::NoneAvailable => None,
        }
    }
}

/// 单个候选者的尝试结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptResult {
    Accepted,
    Declined,
    Unreachable,
    Busy,
    ChannelClosed,
    TimedOut,
}

/// 一次联系候选者的记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactAttempt {
    pub index: usize,
    pub identity: WorkerIdentity,
    pub result: AttemptResult,
}

/// 分派报告：结果以及按顺序排列的联系记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchReport {
    pub request_id: Uuid,
    pub outcome: DispatchOutcome,
    pub attempts: Vec<ContactAttempt>,
}

impl DispatchReport {
    /// 按联系顺序返回被联系的Worker
    pub fn contacted(&self) -> Vec<&WorkerIdentity> {
        self.attempts.iter().map(|a| &a.identity).collect()
    }
}
