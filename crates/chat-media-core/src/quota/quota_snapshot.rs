use serde::{Deserialize, Serialize};

/// Read-only view of a user's media allowance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaSnapshot {
    /// Media messages sent in the current period.
    pub count: u32,
    /// Allowance for the current tier.
    pub limit: u32,
    /// Premium users are never limited.
    pub is_premium: bool,
}

impl QuotaSnapshot {
    /// Sends left before the limit, never negative.
    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.count)
    }

    /// Whether a new capture may be started.
    pub fn allows_capture(&self) -> bool {
        self.is_premium || self.remaining() > 0
    }
}
