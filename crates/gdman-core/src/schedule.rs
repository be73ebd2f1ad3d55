use chrono::{DateTime, Utc};

use crate::store::Database;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationPlan {
    /// No catalog yet: fetch everything regardless of the update policy.
    FullFetch,
    CheckLatest,
    Idle,
}

pub fn plan_activation(db: &Database, now: DateTime<Utc>) -> ActivationPlan {
    if db.remote_versions.is_empty() {
        return ActivationPlan::FullFetch;
    }

    if db.settings.check_for_updates && db.settings.update_check_due(now) {
        ActivationPlan::CheckLatest
    } else {
        ActivationPlan::Idle
    }
}
