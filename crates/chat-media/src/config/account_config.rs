use crate::config::default_quota_limit;

use serde::{Deserialize, Serialize};

/// Identity and entitlement of the local user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Opaque owner identifier used to namespace uploads.
    pub owner_id: String,

    /// Media messages allowed on the free tier.
    #[serde(default = "default_quota_limit")]
    pub quota_limit: u32,

    /// Premium users are never limited.
    #[serde(default)]
    pub is_premium: bool,
}
