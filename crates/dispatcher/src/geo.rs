use std::cmp::Ordering;

use tracing::debug;

use assigner_core::models::{Candidate, GeoPoint};

/// 带距离的候选者
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    pub candidate: Candidate,
    pub distance_km: f64,
}

/// 两点间的大圆距离（公里）
pub fn haversine_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    a.distance_km(b)
}

/// 过滤并按距离排序候选者，同时返回距离
///
/// 只保留在线且距离不超过 `max_distance_km` 的候选者。排序是稳定的，
/// 距离相同的候选者保持目录中的原始顺序。坐标为NaN时距离比较恒为假，
/// 这类候选者会被过滤掉，但不保证这一行为。
pub fn rank_with_distance(
    requester: &GeoPoint,
    candidates: &[Candidate],
    max_distance_km: f64,
) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = candidates
        .iter()
        .filter(|candidate| candidate.is_online())
        .map(|candidate| RankedCandidate {
            distance_km: haversine_km(requester, &candidate.location),
            candidate: candidate.clone(),
        })
        .filter(|ranked| ranked.distance_km <= max_distance_km)
        .collect();

    ranked.sort_by(|a, b| {
        a.distance_km
            .partial_cmp(&b.distance_km)
            .unwrap_or(Ordering::Equal)
    });

    debug!(
        "就近排序: {} 个候选者中 {} 个满足条件 (阈值: {:.1}km)",
        candidates.len(),
        ranked.len(),
        max_distance_km
    );

    ranked
}

/// 过滤并按距离排序候选者
pub fn rank(requester: &GeoPoint, candidates: &[Candidate], max_distance_km: f64) -> Vec<Candidate> {
    rank_with_distance(requester, candidates, max_distance_km)
        .into_iter()
        .map(|ranked| ranked.candidate)
        .collect()
}
