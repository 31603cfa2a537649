pub mod classify_worker;
pub mod partition_ctx;

pub use classify_worker::{format_prediction, ClassificationWorker, REQUIRED_ARTIFACTS};
pub use partition_ctx::{InputSplit, PartitionState};
