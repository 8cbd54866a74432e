use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::types::jobs::job_item::JobItem;
use crate::types::jobs::types::JobStatus;

/// Default lease staleness window, 10 minutes
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(600);

/// Parameters of the claim predicate.
///
/// A job is claimable when it is `pending` and its lease is absent or older than
/// `stale_after`. With `reclaim_abandoned`, a `processing` job whose lease is older than
/// `stale_after` is claimable as well: its worker died before finalizing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimPolicy {
    pub stale_after: Duration,
    pub reclaim_abandoned: bool,
}

impl Default for ClaimPolicy {
    fn default() -> Self {
        Self { stale_after: DEFAULT_STALE_AFTER, reclaim_abandoned: true }
    }
}

impl ClaimPolicy {
    pub fn new(stale_after: Duration, reclaim_abandoned: bool) -> Self {
        Self { stale_after, reclaim_abandoned }
    }

    /// Leases taken before the cutoff are stale
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        chrono::Duration::from_std(self.stale_after)
            .ok()
            .and_then(|window| now.checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Evaluates the claim predicate against a job snapshot
    pub fn is_claimable(&self, job: &JobItem, now: DateTime<Utc>) -> bool {
        let cutoff = self.cutoff(now);
        let lease_is_stale = job.locked_at.map(|locked_at| locked_at < cutoff);

        match job.job_status {
            status if status.is_terminal() => false,
            JobStatus::Pending => lease_is_stale.unwrap_or(true),
            JobStatus::Processing => self.reclaim_abandoned && lease_is_stale.unwrap_or(false),
            _ => false,
        }
    }
}
