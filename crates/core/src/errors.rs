use thiserror::Error;

use crate::models::WorkerIdentity;

/// 分派系统错误类型定义
#[derive(Debug, Error)]
pub enum AssignerError {
    #[error("Worker不可达: {identity}")]
    WorkerUnreachable { identity: WorkerIdentity },

    #[error("Worker连接忙，已有未完成的请求: {identity}")]
    ChannelBusy { identity: WorkerIdentity },

    #[error("Worker连接已关闭: {identity}")]
    ChannelClosed { identity: WorkerIdentity },

    #[error("等待Worker响应超时: {identity} ({timeout_ms}ms)")]
    Timeout {
        identity: WorkerIdentity,
        timeout_ms: u64,
    },

    #[error("无法解析的消息: {0}")]
    MalformedPayload(String),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("候选Worker目录错误: {0}")]
    Catalog(String),
}

impl AssignerError {
    /// 是否属于单个候选者范围内可恢复的失败（转向下一个候选者）
    pub fn is_candidate_failure(&self) -> bool {
        matches!(
            self,
            AssignerError::WorkerUnreachable { .. }
                | AssignerError::ChannelBusy { .. }
                | AssignerError::ChannelClosed { .. }
                | AssignerError::Timeout { .. }
        )
    }
}

/// 统一的Result类型
pub type AssignerResult<T> = std::result::Result<T, AssignerError>;
