use crate::provider::{Permission, PermissionProvider, Platform};

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tracing::{info, instrument, warn};

/// Asks for every capture permission at once.
///
/// The flow cannot know ahead of time whether the user will send a photo or
/// a voice note, so camera, media library and microphone are requested
/// together and the gate only opens when all three are granted. A grant is
/// remembered for the lifetime of the gate; a denial is not, so the user can
/// be asked again.
#[derive(Clone)]
pub struct PermissionGate {
    provider: Arc<dyn PermissionProvider>,
    granted: Arc<AtomicBool>,
}

impl PermissionGate {
    /// Create a gate over a platform permission provider.
    pub fn new(provider: Arc<dyn PermissionProvider>) -> Self {
        Self {
            provider,
            granted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request all capture permissions. `true` only if every one was granted.
    #[instrument(skip(self))]
    pub async fn request(&self) -> bool {
        if self.provider.platform() == Platform::Unrestricted {
            return true;
        }

        if self.granted.load(Ordering::Acquire) {
            return true;
        }

        let [camera, library, microphone] = Permission::ALL;
        let (camera, library, microphone) = tokio::join!(
            self.request_one(camera),
            self.request_one(library),
            self.request_one(microphone),
        );

        let granted = camera && library && microphone;

        if granted {
            self.granted.store(true, Ordering::Release);
            info!("Capture permissions granted");
        } else {
            info!(camera, library, microphone, "Capture permissions denied");
        }

        granted
    }

    async fn request_one(&self, permission: Permission) -> bool {
        match self.provider.request(permission).await {
            Ok(granted) => granted,
            Err(e) => {
                warn!(?permission, error = ?e, "Permission request failed, treating as denied");
                false
            }
        }
    }
}
