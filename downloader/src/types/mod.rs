pub mod constant;
pub mod jobs;
pub mod params;
pub mod serde_helpers;
pub mod worker_id;
