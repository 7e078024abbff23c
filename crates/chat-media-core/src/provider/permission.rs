use crate::CoreResult;

use async_trait::async_trait;

/// A device capture permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Camera access for taking photos.
    Camera,
    /// Read access to the photo library.
    MediaLibrary,
    /// Microphone access for voice notes.
    Microphone,
}

impl Permission {
    /// Every permission a media flow needs before the user picks an action.
    pub const ALL: [Permission; 3] = [
        Permission::Camera,
        Permission::MediaLibrary,
        Permission::Microphone,
    ];
}

/// Whether the host platform sandboxes capture behind runtime permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Mobile-style platform with a runtime permission model.
    Sandboxed,
    /// No native permission model (web, desktop host).
    Unrestricted,
}

/// Platform permission prompt.
#[async_trait]
pub trait PermissionProvider: Send + Sync {
    /// Platform this provider runs on.
    fn platform(&self) -> Platform;

    /// Prompt for (or look up) a single permission.
    ///
    /// Returns `Ok(false)` when the user refused.
    async fn request(&self, permission: Permission) -> CoreResult<bool>;
}
