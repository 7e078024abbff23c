use std::sync::{
    Arc, LazyLock,
    atomic::{AtomicBool, Ordering},
};

static GLOBAL: LazyLock<ActiveRecordingFlag> = LazyLock::new(ActiveRecordingFlag::new);

/// The "a recording is active" flag.
///
/// Only [`CaptureSession`](crate::CaptureSession) claims and releases it.
/// Sessions sharing a flag can never be Active at the same time.
#[derive(Debug, Clone, Default)]
pub struct ActiveRecordingFlag {
    active: Arc<AtomicBool>,
}

impl ActiveRecordingFlag {
    /// An isolated flag, independent of the process-wide one.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide flag.
    pub fn global() -> Self {
        GLOBAL.clone()
    }

    pub(crate) fn try_claim(&self) -> bool {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn release(&self) {
        self.active.store(false, Ordering::Release);
    }

    pub(crate) fn is_claimed(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}
