//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责作业调度与汇合，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `job` - 批量分类作业
//! - 前置检查、广播、启动并行阶段、重组、清理
//! - 控制并发数量（Semaphore）
//! - 输出全局统计信息
//!
//! ### `partition_processor` - 单个分区处理器
//! - 逐行驱动 `ClassificationWorker`
//! - 写出分区输出
//!
//! ### `splits` - 输入分片规划
//! - 每个源文件一个分片
//!
//! ## 层次关系
//!
//! ```text
//! job (处理 Vec<InputSplit>)
//!     ↓
//! partition_processor (处理一个源文件的所有行)
//!     ↓
//! workflow::ClassificationWorker (处理单行)
//!     ↓
//! services (能力层：pair sink / reassembler)
//!     ↓
//! infrastructure (基础设施：对象存储 / 广播)
//! ```

pub mod job;
pub mod partition_processor;
pub mod splits;

// 重新导出主要类型
pub use job::{ClassifyJob, ExecutionContext, JobLocations, JobReport, SCATTER_DIR};
pub use partition_processor::{partition_output_name, process_partition, PartitionStats};
pub use splits::plan_splits;
