use std::fmt;

use serde::{Deserialize, Serialize};

use super::GeoPoint;

/// Worker身份标识
///
/// 既接受JSON字符串也接受数字，数字统一转换为十进制文本，
/// 因此 `54321` 与 `"54321"` 表示同一个Worker。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawIdentity", into = "String")]
pub struct WorkerIdentity(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawIdentity {
    Text(String),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
}

impl From<RawIdentity> for WorkerIdentity {
    fn from(raw: RawIdentity) -> Self {
        match raw {
            RawIdentity::Text(s) => Self(s),
            RawIdentity::Integer(n) => Self(n.to_string()),
            RawIdentity::Unsigned(n) => Self(n.to_string()),
            RawIdentity::Float(n) => Self(n.to_string()),
        }
    }
}

impl WorkerIdentity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WorkerIdentity {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for WorkerIdentity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<WorkerIdentity> for String {
    fn from(identity: WorkerIdentity) -> Self {
        identity.0
    }
}

impl fmt::Display for WorkerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 候选Worker在线状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CandidateStatus {
    Online,
    Offline,
}

/// 候选Worker快照
///
/// 每次分派开始时从目录中取出，分派过程中不再变化。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    pub id: WorkerIdentity,
    pub name: String,
    pub status: CandidateStatus,
    pub location: GeoPoint,
}

impl Candidate {
    pub fn new(
        id: impl Into<WorkerIdentity>,
        name: impl Into<String>,
        status: CandidateStatus,
        location: GeoPoint,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status,
            location,
        }
    }

    /// 检查候选者是否在线
    pub fn is_online(&self) -> bool {
        matches!(self.status, CandidateStatus::Online)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_identity_matches_text() {
        let from_number: WorkerIdentity = serde_json::from_value(json!(54321)).unwrap();
        let from_text: WorkerIdentity = serde_json::from_value(json!("54321")).unwrap();
        assert_eq!(from_number, from_text);
        assert_eq!(from_number.as_str(), "54321");
    }

    #[test]
    fn test_identity_serializes_as_string() {
        let identity = WorkerIdentity::from("+254706434259");
        assert_eq!(serde_json::to_value(&identity).unwrap(), json!("+254706434259"));
    }

    #[test]
    fn test_candidate_deserialize() {
        let candidate: Candidate = serde_json::from_value(json!({
            "id": 54321,
            "name": "Provider 2",
            "status": "online",
            "location": { "lat": -1.225602, "lon": 36.924546 }
        }))
        .unwrap();

        assert_eq!(candidate.id, WorkerIdentity::from("54321"));
        assert!(candidate.is_online());
    }

    #[test]
    fn test_offline_candidate() {
        let candidate = Candidate::new(
            "w1",
            "Provider",
            CandidateStatus::Offline,
            GeoPoint::new(0.0, 0.0),
        );
        assert!(!candidate.is_online());
    }
}
