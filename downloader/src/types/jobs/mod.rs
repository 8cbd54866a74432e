pub mod document;
pub mod job_item;
pub mod job_updates;
pub mod lease;
pub mod types;
