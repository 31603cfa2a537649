//! 基础设施层
//!
//! 持有存储与广播资源，只暴露能力，不认识分区或记录。

pub mod broadcast;
pub mod local_store;
pub mod memory_store;
pub mod store;

pub use broadcast::{BroadcastHandle, BroadcastRegistry};
pub use local_store::LocalStore;
pub use memory_store::MemoryStore;
pub use store::{file_name, is_hidden, join_key, ObjectStore};
