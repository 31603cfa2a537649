//! 批量分类作业 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个打分流水线的入口，负责作业生命周期与资源管理。
//!
//! ## 核心功能
//!
//! 1. **前置检查**：输出位置必须不存在
//! 2. **广播**：先注册数据集描述，再注册模型，然后一次性分发
//! 3. **并发控制**：每个输入文件一个 worker 任务，用 Semaphore 限制并发
//! 4. **汇合**：等待所有分区完成；任意分区失败即整个作业失败
//! 5. **重组**：生成每个源文件的 `.out` 文件与结果矩阵
//! 6. **清理**：成功时删除分散区；失败时删除本次作业创建的整个输出位置。
//!    广播缓存在两种情况下都会删除
//!
//! ## 设计特点
//!
//! - **无归约阶段**：每个 worker 的输出就是最终输出
//! - **资源所有者**：唯一持有存储与广播句柄的模块
//! - **向下委托**：单个分区交给 partition_processor

use crate::config::Config;
use crate::error::{AppResult, JobError};
use crate::infrastructure::{join_key, BroadcastHandle, BroadcastRegistry, ObjectStore};
use crate::models::ResultMatrix;
use crate::orchestrator::partition_processor::{process_partition, PartitionStats};
use crate::orchestrator::splits::plan_splits;
use crate::services::Reassembler;
use crate::utils::logging;
use crate::workflow::InputSplit;
use futures::stream::{FuturesUnordered, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// 分散区目录名
pub const SCATTER_DIR: &str = "partitions";

/// 作业涉及的存储位置
#[derive(Debug, Clone)]
pub struct JobLocations {
    pub model: String,
    pub input: String,
    pub dataset: String,
    pub output: String,
}

impl JobLocations {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.model_path.clone(),
            input: config.input_path.clone(),
            dataset: config.dataset_path.clone(),
            output: config.output_path.clone(),
        }
    }
}

/// 执行环境
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub max_concurrent_workers: usize,
    pub broadcast_cache_dir: PathBuf,
    pub skip_corrupt_partitions: bool,
}

impl ExecutionContext {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_concurrent_workers: config.max_concurrent_workers.max(1),
            broadcast_cache_dir: config.broadcast_cache_dir.clone(),
            skip_corrupt_partitions: config.skip_corrupt_partitions,
        }
    }
}

/// 作业统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobReport {
    pub partitions: usize,
    pub records: usize,
    pub output_files: usize,
    /// 开启 `skip_corrupt_partitions` 时被跳过的分区输出键
    pub skipped_partitions: Vec<String>,
    pub elapsed_ms: u128,
}

/// 批量分类作业
pub struct ClassifyJob<S: ObjectStore + 'static> {
    locations: JobLocations,
    store: Arc<S>,
    context: ExecutionContext,
    results: Option<ResultMatrix>,
}

impl<S: ObjectStore + 'static> ClassifyJob<S> {
    pub fn new(locations: JobLocations, store: Arc<S>, context: ExecutionContext) -> Self {
        Self {
            locations,
            store,
            context,
            results: None,
        }
    }

    /// 结果矩阵，仅在 `run` 成功后可用
    pub fn results(&self) -> Option<&ResultMatrix> {
        self.results.as_ref()
    }

    fn scatter_key(&self) -> String {
        join_key(&self.locations.output, SCATTER_DIR)
    }

    /// 运行作业
    pub async fn run(&mut self) -> AppResult<JobReport> {
        let started = Instant::now();
        self.results = None;
        logging::log_job_start(&self.locations, &self.context);

        if self.store.exists(&self.locations.output).await? {
            return Err(JobError::OutputAlreadyExists {
                path: self.locations.output.clone(),
            });
        }

        info!("📌 注册数据集描述到广播: {}", self.locations.dataset);
        let mut registry = BroadcastRegistry::new();
        registry.register_artifact(&self.locations.dataset)?;
        info!("📌 注册模型到广播: {}", self.locations.model);
        registry.register_artifact(&self.locations.model)?;

        let splits = plan_splits(self.store.as_ref(), &self.locations.input).await?;
        let broadcast = registry
            .distribute(self.store.as_ref(), &self.context.broadcast_cache_dir)
            .await?;

        let partitions = splits.len();
        let stage = self.run_stage(&broadcast, splits).await;
        broadcast.release().await;

        let outcome = match stage {
            Ok(records) => self.reassemble().await.map(|output| (records, output)),
            Err(e) => Err(e),
        };

        let (records, output) = match outcome {
            Ok(done) => {
                self.store.delete_recursive(&self.scatter_key()).await?;
                done
            }
            Err(e) => {
                // 输出位置在作业开始时不存在，其中的一切都由本次作业写入
                let output = &self.locations.output;
                if let Err(cleanup) = self.store.delete_recursive(output).await {
                    warn!("⚠️ 无法清理输出位置 {}: {}", output, cleanup);
                }
                error!("❌ 作业失败: {}", e);
                return Err(e);
            }
        };

        let report = JobReport {
            partitions,
            records,
            output_files: output.output_files.len(),
            skipped_partitions: output.skipped_partitions,
            elapsed_ms: started.elapsed().as_millis(),
        };
        self.results = Some(output.results);
        logging::print_final_stats(&report, &self.locations.output);

        Ok(report)
    }

    /// 并行打分阶段；返回预测总条数
    async fn run_stage(
        &self,
        broadcast: &BroadcastHandle,
        splits: Vec<InputSplit>,
    ) -> AppResult<usize> {
        let scatter = self.scatter_key();
        logging::log_stage_start(splits.len(), self.context.max_concurrent_workers);

        let semaphore = Arc::new(Semaphore::new(self.context.max_concurrent_workers));
        let mut running = FuturesUnordered::new();
        let mut abort_handles = Vec::with_capacity(splits.len());

        // 为每个分片创建 worker 任务
        for split in splits {
            let index = split.index;
            let store = Arc::clone(&self.store);
            let broadcast = broadcast.clone();
            let scatter = scatter.clone();
            let semaphore = Arc::clone(&semaphore);

            let handle = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| JobError::Stage(e.to_string()))?;
                process_partition(store.as_ref(), &broadcast, &split, &scatter).await
            });
            abort_handles.push(handle.abort_handle());
            running.push(async move { (index, handle.await) });
        }

        // 等待所有任务完成，第一个失败立即终止其余任务
        let mut records = 0;
        while let Some((index, joined)) = running.next().await {
            let outcome: AppResult<PartitionStats> = match joined {
                Ok(outcome) => outcome,
                Err(e) => Err(JobError::Stage(format!("worker 任务异常结束: {}", e))),
            };

            match outcome {
                Ok(stats) => {
                    records += stats.records;
                }
                Err(e) => {
                    error!("[分区 {}] ❌ 处理失败: {}", index, e);
                    for handle in &abort_handles {
                        handle.abort();
                    }
                    while running.next().await.is_some() {}
                    return Err(JobError::ScoringStageFailed {
                        partition: index,
                        source: Box::new(e),
                    });
                }
            }
        }

        self.store
            .put(&join_key(&scatter, "_SUCCESS"), Vec::new())
            .await?;
        Ok(records)
    }

    async fn reassemble(&self) -> AppResult<crate::services::ReassemblyOutput> {
        Reassembler::new(self.store.as_ref(), self.context.skip_corrupt_partitions)
            .reassemble(&self.scatter_key(), &self.locations.output)
            .await
    }
}
