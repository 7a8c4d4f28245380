use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::GeneratedPanel;

/// One panel finished, successfully or not. Emitted exactly once per panel, in order.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent {
    /// 1-based index of the panel just finished.
    pub current: usize,
    pub total: usize,
    pub panel: GeneratedPanel,
    pub emitted_at: DateTime<Utc>,
}

impl ProgressEvent {
    pub fn new(current: usize, total: usize, panel: GeneratedPanel) -> Self {
        Self {
            current,
            total,
            panel,
            emitted_at: Utc::now(),
        }
    }
}
