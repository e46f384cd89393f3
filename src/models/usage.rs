use chrono::{DateTime, Local};
use serde::Serialize;

/// Disk usage of the volume backing one repository.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Usage {
    pub total_bytes: u64,
    pub used_bytes:  u64,
    pub avail_bytes: u64,
    /// 0–100, one decimal. Remote probes carry the remote tool's own
    /// figure; local probes compute it from the totals.
    pub percent_used: f64,
    /// Device name as reported by the remote `df`, or `"local"`.
    pub filesystem:  String,
    pub mount_point: String,
}

/// The shape downstream persistence expects, field for field.
#[derive(Debug, Clone, Serialize)]
pub struct StorageRecord {
    pub storage_total:        u64,
    pub storage_used:         u64,
    pub storage_available:    u64,
    pub storage_percent_used: f64,
    pub last_storage_check:   DateTime<Local>,
}

impl Usage {
    pub fn record(&self, checked_at: DateTime<Local>) -> StorageRecord {
        StorageRecord {
            storage_total:        self.total_bytes,
            storage_used:         self.used_bytes,
            storage_available:    self.avail_bytes,
            storage_percent_used: self.percent_used,
            last_storage_check:   checked_at,
        }
    }
}
