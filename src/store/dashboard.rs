//! Aggregate views over the Request Store

use serde::Serialize;

use crate::entities::request::RequestStatus;
use crate::store::requests::RequestStore;

/// Count and share of one status
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatusShare {
    pub status: RequestStatus,
    pub count: usize,
    /// `count / max(total, 1)`, in `0.0..=1.0`
    pub proportion: f64,
}

/// Dashboard figures
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub total: usize,
    pub in_progress: usize,
    pub finished: usize,
    pub by_status: Vec<StatusShare>,
}

impl Dashboard {
    pub fn from_store(store: &RequestStore) -> Self {
        let total = store.len();
        let by_status: Vec<StatusShare> = RequestStatus::all()
            .iter()
            .map(|&status| {
                let count = store.count_by_status(status);
                StatusShare {
                    status,
                    count,
                    proportion: proportion(count, total),
                }
            })
            .collect();

        Self {
            total,
            in_progress: store.count_by_status(RequestStatus::InProgress),
            finished: store.count_by_status(RequestStatus::Finished),
            by_status,
        }
    }

    pub fn share(&self, status: RequestStatus) -> Option<&StatusShare> {
        self.by_status.iter().find(|s| s.status == status)
    }
}

/// Share of `count` in `total`; an empty store gives 0
pub fn proportion(count: usize, total: usize) -> f64 {
    count as f64 / total.max(1) as f64
}

/// A horizontal bar `width` cells wide, filled in proportion
pub fn bar(proportion: f64, width: usize) -> String {
    let filled = (proportion.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}
