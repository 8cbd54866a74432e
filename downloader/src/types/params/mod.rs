pub mod database;
pub mod metrics;
pub mod service;
pub mod source;
pub mod storage;

pub use database::MongoConfig;
pub use metrics::MetricsConfig;
pub use service::ServiceParams;
pub use source::SourceParams;
pub use storage::S3Config;
