pub mod driver;
pub mod lease;
pub mod lifecycle;
pub mod pipeline;

pub use driver::{RunOutcome, WorkerDriver};
pub use lease::LeaseManager;
pub use lifecycle::{derive_status, LifecycleController};
pub use pipeline::{DocumentPipeline, PipelineReport};
