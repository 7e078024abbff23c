mod quota_gate;
mod quota_snapshot;

pub use {
    quota_gate::{QuotaGate, QuotaSource},
    quota_snapshot::QuotaSnapshot,
};
