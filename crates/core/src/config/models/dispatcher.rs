use std::time::Duration;

use serde::{Deserialize, Serialize};

/// 同一连接上已有未完成请求时的处理策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusyPolicy {
    /// 立即失败，转向下一个候选者
    #[default]
    Reject,
    /// 排队等待前一个请求结束（仍受候选者超时约束）
    Queue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// 候选者与请求方之间允许的最大距离（公里）
    pub proximity_threshold_km: f64,
    /// 每个候选者的应答窗口（毫秒）
    pub per_candidate_timeout_ms: u64,
    /// 整个分派的总截止时间（毫秒），不设置则不限制
    pub dispatch_deadline_ms: Option<u64>,
    pub busy_policy: BusyPolicy,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            proximity_threshold_km: 70.0,
            per_candidate_timeout_ms: 10_000,
            dispatch_deadline_ms: None,
            busy_policy: BusyPolicy::Reject,
        }
    }
}

impl DispatcherConfig {
    pub fn per_candidate_timeout(&self) -> Duration {
        Duration::from_millis(self.per_candidate_timeout_ms)
    }

    pub fn dispatch_deadline(&self) -> Option<Duration> {
        self.dispatch_deadline_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.proximity_threshold_km.is_finite() || self.proximity_threshold_km <= 0.0 {
            return Err(anyhow::anyhow!(
                "距离阈值必须是大于0的有限数: {}",
                self.proximity_threshold_km
            ));
        }

        if self.per_candidate_timeout_ms == 0 {
            return Err(anyhow::anyhow!("候选者应答超时必须大于0"));
        }

        if let Some(deadline) = self.dispatch_deadline_ms {
            if deadline == 0 {
                return Err(anyhow::anyhow!("分派总截止时间必须大于0"));
            }
        }

        Ok(())
    }
}
