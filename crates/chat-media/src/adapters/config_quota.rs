use crate::config::AccountConfig;

use chat_media_core::{CoreResult, QuotaSnapshot, QuotaSource};

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use tracing::debug;

/// Entitlement source backed by the account section of the config.
///
/// Counts sends for the lifetime of the process; the core only reads it.
pub struct ConfigQuota {
    limit: u32,
    is_premium: bool,
    count: AtomicU32,
}

impl ConfigQuota {
    pub fn new(account: &AccountConfig) -> Self {
        Self {
            limit: account.quota_limit,
            is_premium: account.is_premium,
            count: AtomicU32::new(0),
        }
    }

    /// Count one delivered media message.
    pub fn record_send(&self) {
        let count = self.count.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(count, limit = self.limit, "Media send counted");
    }

    /// Current snapshot without going through the trait.
    pub fn current(&self) -> QuotaSnapshot {
        QuotaSnapshot {
            count: self.count.load(Ordering::Acquire),
            limit: self.limit,
            is_premium: self.is_premium,
        }
    }
}

#[async_trait]
impl QuotaSource for ConfigQuota {
    async fn snapshot(&self, _owner_id: &str) -> CoreResult<QuotaSnapshot> {
        Ok(self.current())
    }
}
