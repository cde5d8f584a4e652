//! 就近分派服务
//!
//! 组件自底向上：
//! - `geo`: 按在线状态和距离过滤、排序候选者
//! - `connection` / `registry`: Worker长连接及其身份注册表
//! - `bridge`: 在长连接上模拟请求/应答
//! - `session`: 单个连接的身份声明与应答投递
//! - `coordinator`: 顺序故障转移的分派状态机
//! - `service`: 目录快照 → 排序 → 协调器

pub mod bridge;
pub mod catalog;
pub mod connection;
pub mod coordinator;
pub mod geo;
pub mod registry;
pub mod service;
pub mod session;

pub use bridge::RequestReplyBridge;
pub use catalog::StaticCatalog;
pub use connection::{Connection, ConnectionId, OutboundFrame};
pub use coordinator::DispatchCoordinator;
pub use geo::{haversine_km, rank, rank_with_distance, RankedCandidate};
pub use registry::{ConnectedWorker, ConnectionRegistry, Registration};
pub use service::DispatchService;
pub use session::{InboundDisposition, WorkerSession};
