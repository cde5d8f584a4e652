//! Worker长连接上的文本消息格式
//!
//! - Worker → 服务端：首条消息 `{"userId": ...}` 声明身份
//! - 服务端 → Worker：`{"type": "ping", "requestId", "dispatchId", "userId", "message", "requesterLocation"}`
//! - Worker → 服务端：`{"userId", "requestId"?, "accepted"?}` 作为应答

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{GeoPoint, WorkerIdentity};
use crate::{AssignerError, AssignerResult};

/// Worker身份声明
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerAnnouncement {
    #[serde(rename = "userId")]
    pub user_id: WorkerIdentity,
}

/// 发送给候选Worker的询问消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingMessage {
    #[serde(rename = "type")]
    pub kind: String,
    /// 本次联系的关联ID，Worker应在应答中回显
    #[serde(rename = "requestId")]
    pub request_id: Uuid,
    #[serde(rename = "dispatchId")]
    pub dispatch_id: Uuid,
    #[serde(rename = "userId")]
    pub user_id: WorkerIdentity,
    pub message: String,
    #[serde(rename = "requesterLocation")]
    pub requester_location: GeoPoint,
}

impl PingMessage {
    pub fn new(
        request_id: Uuid,
        dispatch_id: Uuid,
        user_id: WorkerIdentity,
        requester_location: GeoPoint,
    ) -> Self {
        let message = format!("Hello {user_id}, this is a ping from the server");
        Self {
            kind: "ping".to_string(),
            request_id,
            dispatch_id,
            user_id,
            message,
            requester_location,
        }
    }

    pub fn to_json(&self) -> AssignerResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Worker对询问的应答
///
/// 旧版Worker只回显 `userId`，因此其余字段都是可选的。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkerReply {
    #[serde(rename = "userId", default)]
    pub user_id: Option<WorkerIdentity>,
    #[serde(rename = "requestId", default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub accepted: Option<bool>,
}

impl WorkerReply {
    pub fn parse(raw: &str) -> AssignerResult<Self> {
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(|e| AssignerError::MalformedPayload(e.to_string()))?;
        Self::decode(value)
    }

    /// 从已解析的JSON解码应答，只接受JSON对象
    pub fn decode(value: serde_json::Value) -> AssignerResult<Self> {
        if !value.is_object() {
            return Err(AssignerError::MalformedPayload(format!(
                "应答必须是JSON对象: {value}"
            )));
        }
        serde_json::from_value(value).map_err(|e| AssignerError::MalformedPayload(e.to_string()))
    }

    /// 回显的身份与候选者一致且未显式拒绝时视为接受
    pub fn accepts(&self, candidate: &WorkerIdentity) -> bool {
        self.accepted != Some(false) && self.user_id.as_ref() == Some(candidate)
    }
}
