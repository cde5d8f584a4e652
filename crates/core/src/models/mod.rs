//! # 数据模型
//!
//! 定义就近分派系统的核心数据结构：候选Worker、地理坐标、分派请求与结果，
//! 以及Worker长连接上的消息格式。
//!
//! ## 核心模型
//!
//! ### Candidate - 候选Worker
//! 分派开始时从目录中取出的只读快照，包含身份、名称、在线状态和位置。
//!
//! ### DispatchRequest / DispatchOutcome - 分派请求与结果
//! 一次分派持有排序后的候选者列表，最终结果为 `Assigned` 或 `NoneAvailable`。
//!
//! ### 协议消息
//! Worker身份声明、服务端询问以及Worker应答。
//!
//! ## 使用示例
//!
//! ```rust
//! use assigner_core::models::*;
//!
//! let candidate = Candidate::new(
//!     "54321",
//!     "Provider 2",
//!     CandidateStatus::Online,
//!     GeoPoint::new(-1.225602, 36.924546),
//! );
//! assert!(candidate.is_online());
//! ```

pub mod candidate;
pub mod dispatch;
pub mod location;
pub mod protocol;

pub use candidate::{Candidate, CandidateStatus, WorkerIdentity};
pub use dispatch::{
    AttemptResult, ContactAttempt, DispatchOutcome, DispatchReport, DispatchRequest,
};
pub use location::{GeoPoint, EARTH_RADIUS_KM};
pub use protocol::{PingMessage, WorkerAnnouncement, WorkerReply};
