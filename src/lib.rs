//! # Batch Classifier
//!
//! 把已训练的分类模型分发给一组并行 worker，对未标注记录批量打分，
//! 再把分散的分区输出重组成每个源文件一个预测文件，以及一个
//! (真实标签, 预测标签) 结果矩阵。
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有存储与广播资源，只暴露能力
//! - `ObjectStore` - 键寻址的对象存储（本地目录 / 内存）
//! - `BroadcastRegistry` - 只读产物的一次性分发
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `PairSink` - 写分区输出能力
//! - `Reassembler` - 重组分区输出能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一行输入"的处理流程
//! - `PartitionState` - 分区状态（标记行是否已输出 + 源文件名）
//! - `ClassificationWorker` - setup → 逐行分类 → 输出
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/job` - 批量分类作业，管理资源、并发与清理
//! - `orchestrator/partition_processor` - 单个分区处理器
//!
//! 另有 `codec`（二进制数组编解码）与 `models`（数据集、记录、模型、结果）。
//!
//! ## 模块结构

pub mod codec;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppResult, JobError};
pub use infrastructure::{BroadcastHandle, BroadcastRegistry, LocalStore, MemoryStore, ObjectStore};
pub use models::{Classifier, ConfusionMatrix, Dataset, FuzzyRuleBase, Instance, ResultMatrix};
pub use orchestrator::{ClassifyJob, ExecutionContext, JobLocations, JobReport};
pub use workflow::{ClassificationWorker, InputSplit, PartitionState};
