pub mod database;
pub mod source;
pub mod storage;

pub use database::{mongodb::MongoJobStore, DatabaseError, JobStore};
pub use source::{simulated::SimulatedDocumentSource, DocumentSource, SourceError};
pub use storage::{s3::AWSS3, StorageClient, StorageError};
