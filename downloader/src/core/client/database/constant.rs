/// Collection holding one record per job
pub const JOBS_COLLECTION: &str = "jobs";

/// Collection holding the append-only per-document outcome records
pub const DOCUMENTS_COLLECTION: &str = "documents";
