use async_trait::async_trait;

use crate::{models::Candidate, AssignerResult};

/// 候选Worker目录接口
///
/// 每次分派调用一次 `snapshot`，之后的分派过程只使用这份快照。
#[async_trait]
pub trait CandidateCatalog: Send + Sync {
    /// 获取当前候选Worker快照
    async fn snapshot(&self) -> AssignerResult<Vec<Candidate>>;

    /// 获取目录名称
    fn name(&self) -> &str;
}
