//! 单个分区处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块负责一个输入分片从读取到写出分区输出的全过程。
//!
//! ## 核心功能
//!
//! 1. **setup**：从广播产物创建 `ClassificationWorker`
//! 2. **遍历行**：按字节偏移逐行交给 worker
//! 3. **写出**：把分区输出写到分散区的 `part-m-NNNNN`
//! 4. **统计输出**：记录预测条数

use crate::error::{AppResult, JobError};
use crate::infrastructure::{join_key, BroadcastHandle, ObjectStore};
use crate::services::PairSink;
use crate::workflow::{ClassificationWorker, InputSplit, PartitionState};
use tracing::info;

/// 分区处理统计
#[derive(Debug, Default, Clone, Copy)]
pub struct PartitionStats {
    pub records: usize,
}

/// 分区输出对象名
pub fn partition_output_name(index: usize) -> String {
    format!("part-m-{:05}", index)
}

/// 处理单个分区
///
/// # 参数
/// - `store`: 对象存储
/// - `broadcast`: 广播产物
/// - `split`: 输入分片
/// - `scatter`: 分散区前缀
///
/// # 返回
/// 返回分区统计；任何一行失败都会使整个分区失败
pub async fn process_partition<S>(
    store: &S,
    broadcast: &BroadcastHandle,
    split: &InputSplit,
    scatter: &str,
) -> AppResult<PartitionStats>
where
    S: ObjectStore + ?Sized,
{
    info!("[分区 {}] 开始处理 {}", split.index, split.key);

    let worker = ClassificationWorker::setup(broadcast).await?;

    let bytes = store.get(&split.key).await?;
    let content = String::from_utf8(bytes)
        .map_err(|e| JobError::malformed_record(&split.key, format!("不是 UTF-8 文本: {}", e)))?;

    let mut state = PartitionState::new(&split.source_name);
    let mut sink = PairSink::new();
    let mut offset = 0u64;

    for raw in content.split_inclusive('\n') {
        let line = raw.trim_end_matches('\n').trim_end_matches('\r');
        worker.process(&mut state, offset, line, &mut sink)?;
        offset += raw.len() as u64;
    }
    worker.finish(&mut state, &mut sink)?;

    let output_key = join_key(scatter, &partition_output_name(split.index));
    store.put(&output_key, sink.into_bytes()).await?;

    info!(
        "[分区 {}] ✓ {} 完成, 预测 {} 条",
        split.index, split.source_name, state.records
    );

    Ok(PartitionStats {
        records: state.records,
    })
}
