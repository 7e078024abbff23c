use chat_media_core::{CoreResult, Permission, PermissionProvider, Platform};

use async_trait::async_trait;

/// Desktop hosts have no capture sandbox; every permission is implicit.
pub struct HostPermissions;

#[async_trait]
impl PermissionProvider for HostPermissions {
    fn platform(&self) -> Platform {
        Platform::Unrestricted
    }

    async fn request(&self, _permission: Permission) -> CoreResult<bool> {
        Ok(true)
    }
}
