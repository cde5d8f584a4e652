use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use assigner_core::{models::Candidate, traits::CandidateCatalog, AssignerResult};

/// 内存中的静态候选Worker目录
///
/// 目录可以在运行时整体替换，已经开始的分派继续使用各自取得的快照。
pub struct StaticCatalog {
    candidates: RwLock<Vec<Candidate>>,
}

impl StaticCatalog {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates: RwLock::new(candidates),
        }
    }

    /// 整体替换目录内容
    pub async fn replace(&self, candidates: Vec<Candidate>) {
        let mut guard = self.candidates.write().await;
        info!("候选Worker目录已更新: {} -> {}", guard.len(), candidates.len());
        *guard = candidates;
    }
}

#[async_trait]
impl CandidateCatalog for StaticCatalog {
    async fn snapshot(&self) -> AssignerResult<Vec<Candidate>> {
        Ok(self.candidates.read().await.clone())
    }

    fn name(&self) -> &str {
        "Static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assigner_core::models::{CandidateStatus, GeoPoint};

    fn candidate(id: &str) -> Candidate {
        Candidate::new(id, id, CandidateStatus::Online, GeoPoint::new(0.0, 0.0))
    }

    #[tokio::test]
    async fn test_snapshot_is_independent_of_later_updates() {
        let catalog = StaticCatalog::new(vec![candidate("a")]);
        let snapshot = catalog.snapshot().await.unwrap();

        catalog.replace(vec![candidate("b"), candidate("c")]).await;

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id.as_str(), "a");
        assert_eq!(catalog.snapshot().await.unwrap().len(), 2);
        assert_eq!(catalog.name(), "Static");
    }
}
