//! 配置管理
//!
//! 配置按以下顺序合并：内置默认值、TOML配置文件、`ASSIGNER_` 前缀的环境变量，
//! 最后由 `PORT` 覆盖监听端口。所有配置段在加载后都会经过验证。
//!
//! ```toml
//! [dispatcher]
//! proximity_threshold_km = 70.0
//! per_candidate_timeout_ms = 10000
//! busy_policy = "reject"
//!
//! [api]
//! bind_address = "0.0.0.0:3000"
//!
//! [[catalog.candidates]]
//! id = "54321"
//! name = "Provider 2"
//! status = "online"
//! location = { lat = -1.225602, lon = 36.924546 }
//! ```

pub mod models;

pub use models::*;
