use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::{Candidate, CandidateStatus, GeoPoint};

/// 静态候选Worker目录配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub candidates: Vec<Candidate>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            candidates: vec![
                Candidate::new(
                    "+254706434259",
                    "Provider 1",
                    CandidateStatus::Online,
                    GeoPoint::new(-1.286389, 36.817223),
                ),
                Candidate::new(
                    "54321",
                    "Provider 2",
                    CandidateStatus::Online,
                    GeoPoint::new(-1.225602, 36.924546),
                ),
            ],
        }
    }
}

impl CatalogConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        let mut seen = HashSet::new();
        for candidate in &self.candidates {
            if candidate.id.as_str().is_empty() {
                return Err(anyhow::anyhow!("候选Worker ID不能为空"));
            }

            if !seen.insert(candidate.id.clone()) {
                return Err(anyhow::anyhow!("重复的候选Worker ID: {}", candidate.id));
            }

            let GeoPoint { lat, lon } = candidate.location;
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                return Err(anyhow::anyhow!(
                    "候选Worker {} 的坐标无效: ({}, {})",
                    candidate.id,
                    lat,
                    lon
                ));
            }
        }

        Ok(())
    }
}
