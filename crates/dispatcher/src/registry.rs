use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use assigner_core::models::WorkerIdentity;

use crate::connection::{Connection, ConnectionId};

/// 注册结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// 身份首次绑定
    New,
    /// 替换了旧连接，旧连接已被关闭
    Replaced { previous: ConnectionId },
    /// 该连接已绑定到同一身份
    Unchanged,
}

/// 已连接Worker的快照
#[derive(Debug, Clone, Serialize)]
pub struct ConnectedWorker {
    pub identity: WorkerIdentity,
    pub connection_id: ConnectionId,
    pub connected_at: DateTime<Utc>,
}

#[derive(Default)]
struct RegistryState {
    by_identity: HashMap<WorkerIdentity, Arc<Connection>>,
    by_connection: HashMap<ConnectionId, WorkerIdentity>,
}

/// Worker身份到连接的注册表
///
/// 正向和反向索引由同一把锁保护，`unregister` 返回后任何 `lookup`
/// 都不会再返回该连接。同一身份以最近一次声明为准。
#[derive(Default)]
pub struct ConnectionRegistry {
    state: RwLock<RegistryState>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 绑定身份与连接
    pub async fn register(
        &self,
        identity: WorkerIdentity,
        connection: Arc<Connection>,
    ) -> Registration {
        let mut state = self.state.write().await;
        let connection_id = connection.id();

        if let Some(bound) = state.by_connection.get(&connection_id).cloned() {
            if bound == identity {
                return Registration::Unchanged;
            }
            // 同一连接改用新身份，解除旧身份的绑定
            if state
                .by_identity
                .get(&bound)
                .is_some_and(|c| c.id() == connection_id)
            {
                state.by_identity.remove(&bound);
            }
            debug!("连接 {} 的身份从 {} 变更为 {}", connection_id, bound, identity);
        }

        state
            .by_connection
            .insert(connection_id, identity.clone());
        let previous = state.by_identity.insert(identity.clone(), connection);

        match previous {
            Some(previous) if previous.id() != connection_id => {
                state.by_connection.remove(&previous.id());
                previous.close();
                warn!(
                    "Worker {} 重新连接，替换旧连接 {} -> {}",
                    identity,
                    previous.id(),
                    connection_id
                );
                Registration::Replaced {
                    previous: previous.id(),
                }
            }
            _ => {
                info!("Worker {} 已连接", identity);
                Registration::New
            }
        }
    }

    /// 按身份查找仍然打开的连接
    pub async fn lookup(&self, identity: &WorkerIdentity) -> Option<Arc<Connection>> {
        let state = self.state.read().await;
        state
            .by_identity
            .get(identity)
            .filter(|connection| !connection.is_closed())
            .cloned()
    }

    /// 连接关闭时移除绑定，返回其身份；已移除时为空操作
    pub async fn unregister(&self, connection_id: ConnectionId) -> Option<WorkerIdentity> {
        let mut state = self.state.write().await;
        let identity = state.by_connection.remove(&connection_id)?;

        if state
            .by_identity
            .get(&identity)
            .is_some_and(|c| c.id() == connection_id)
        {
            state.by_identity.remove(&identity);
        }

        info!("Worker {} 已断开", identity);
        Some(identity)
    }

    /// 所有已连接Worker，按身份排序
    pub async fn connected(&self) -> Vec<ConnectedWorker> {
        let state = self.state.read().await;
        let mut workers: Vec<ConnectedWorker> = state
            .by_identity
            .iter()
            .filter(|(_, connection)| !connection.is_closed())
            .map(|(identity, connection)| ConnectedWorker {
                identity: identity.clone(),
                connection_id: connection.id(),
                connected_at: connection.opened_at(),
            })
            .collect();
        workers.sort_by(|a, b| a.identity.cmp(&b.identity));
        workers
    }

    /// 仍然打开的连接数，与 `connected()` 一致
    pub async fn len(&self) -> usize {
        self.state
            .read()
            .await
            .by_identity
            .values()
            .filter(|connection| !connection.is_closed())
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// 关闭并移除所有连接，返回关闭的数量
    pub async fn close_all(&self) -> usize {
        let mut state = self.state.write().await;
        state.by_connection.clear();
        let connections: Vec<_> = state.by_identity.drain().map(|(_, c)| c).collect();
        drop(state);

        for connection in &connections {
            connection.close();
        }
        if !connections.is_empty() {
            info!("已关闭 {} 个Worker连接", connections.len());
        }
        connections.len()
    }
}
