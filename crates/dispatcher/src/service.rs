use std::sync::Arc;

use tracing::info;

use assigner_core::{
    config::DispatcherConfig,
    models::{DispatchReport, DispatchRequest, GeoPoint},
    traits::CandidateCatalog,
    AssignerResult,
};

use crate::coordinator::DispatchCoordinator;
use crate::geo::rank;

/// 分派入口：取目录快照、就近排序并交给协调器
pub struct DispatchService {
    catalog: Arc<dyn CandidateCatalog>,
    coordinator: DispatchCoordinator,
    config: DispatcherConfig,
}

impl DispatchService {
    pub fn new(
        catalog: Arc<dyn CandidateCatalog>,
        coordinator: DispatchCoordinator,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            catalog,
            coordinator,
            config,
        }
    }

    /// 为位于 `requester_location` 的请求方分配Worker
    pub async fn assign(&self, requester_location: GeoPoint) -> AssignerResult<DispatchReport> {
        let snapshot = self.catalog.snapshot().await?;
        let ranked = rank(
            &requester_location,
            &snapshot,
            self.config.proximity_threshold_km,
        );

        info!(
            "请求方 ({:.6}, {:.6}): 目录 {} 中 {} 个候选者在 {}km 内",
            requester_location.lat,
            requester_location.lon,
            self.catalog.name(),
            ranked.len(),
            self.config.proximity_threshold_km
        );

        let request = DispatchRequest::new(
            requester_location,
            ranked,
            self.config.proximity_threshold_km,
            self.config.per_candidate_timeout(),
        )
        .with_overall_deadline(self.config.dispatch_deadline());

        Ok(self.coordinator.dispatch(request).await)
    }
}
