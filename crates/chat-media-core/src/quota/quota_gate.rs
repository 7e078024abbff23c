use crate::{CoreResult, MediaError, quota::QuotaSnapshot};

use std::{panic::Location, sync::Arc};

use async_trait::async_trait;
use error_location::ErrorLocation;
use tracing::{debug, info, instrument};

/// Entitlement source owned by the surrounding app.
#[async_trait]
pub trait QuotaSource: Send + Sync {
    /// Current allowance for `owner_id`.
    async fn snapshot(&self, owner_id: &str) -> CoreResult<QuotaSnapshot>;
}

/// Consults the entitlement source before any capture is entered.
///
/// Never mutates the counter; counting sends is the source's business.
#[derive(Clone)]
pub struct QuotaGate {
    source: Arc<dyn QuotaSource>,
}

impl QuotaGate {
    /// Wrap an entitlement source.
    pub fn new(source: Arc<dyn QuotaSource>) -> Self {
        Self { source }
    }

    /// Admit or refuse a new capture for `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns `QuotaExceeded` when the user has nothing left and is not
    /// premium, or whatever the source reports when it cannot be read.
    #[instrument(skip(self))]
    pub async fn admit(&self, owner_id: &str) -> CoreResult<QuotaSnapshot> {
        let snapshot = self.source.snapshot(owner_id).await?;

        debug!(
            count = snapshot.count,
            limit = snapshot.limit,
            is_premium = snapshot.is_premium,
            "Quota snapshot"
        );

        if !snapshot.allows_capture() {
            info!(owner_id, limit = snapshot.limit, "Capture refused by quota");
            return Err(MediaError::QuotaExceeded {
                remaining: snapshot.remaining(),
                limit: snapshot.limit,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(snapshot)
    }
}
