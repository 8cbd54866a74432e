use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// Identity written into `lockedBy` when a job is claimed.
///
/// A composite of host, process and run identifiers. It carries no behaviour: two runs of
/// the same process on the same host still get distinct identities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerIdentity {
    pub host: String,
    pub pid: u32,
    pub started_at: DateTime<Utc>,
    pub run_id: Uuid,
}

impl WorkerIdentity {
    pub fn new(host: impl Into<String>, pid: u32, started_at: DateTime<Utc>, run_id: Uuid) -> Self {
        Self { host: host.into(), pid, started_at, run_id }
    }

    /// Identity of the current process
    pub fn current() -> Self {
        let host = std::env::var("HOSTNAME")
            .ok()
            .filter(|host| !host.trim().is_empty())
            .unwrap_or_else(|| "localhost".to_string());
        Self::new(host, std::process::id(), Utc::now(), Uuid::new_v4())
    }
}

impl fmt::Display for WorkerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let run_id = self.run_id.simple().to_string();
        write!(f, "worker-{}-{}-{}-{}", self.host, self.pid, self.started_at.timestamp(), &run_id[..8])
    }
}
