//! 分类 worker - 流程层
//!
//! 核心职责：把一个分区的输入行变成 (键, 值) 记录
//!
//! 输出顺序：
//! 1. 标记行（键 = 首行偏移，值 = 源文件名），每个分区恰好一条且在最前
//! 2. 每个非空行一条预测（键 = 真实标签，值 = 预测标签文本）

use std::sync::Arc;
use tracing::debug;

use crate::error::{AppResult, JobError};
use crate::infrastructure::BroadcastHandle;
use crate::models::{load_dataset, load_model, Classifier, DataConverter, Dataset};
use crate::services::PairSink;
use crate::workflow::partition_ctx::PartitionState;

/// 广播中必须存在的产物数量：数据集描述 + 模型
pub const REQUIRED_ARTIFACTS: usize = 2;

/// 分类 worker
///
/// - setup 时加载一次数据集描述与模型，之后只读
/// - 不持有分区状态，状态由 [`PartitionState`] 传入
/// - 不关心输出写到哪里
pub struct ClassificationWorker {
    dataset: Arc<Dataset>,
    model: Arc<dyn Classifier>,
    converter: DataConverter,
}

impl ClassificationWorker {
    /// 从广播产物加载；产物不足时在处理任何记录前失败
    pub async fn setup(broadcast: &BroadcastHandle) -> AppResult<Self> {
        let paths = broadcast.list_local_artifact_paths();
        if paths.len() < REQUIRED_ARTIFACTS {
            return Err(JobError::MissingArtifact {
                expected: REQUIRED_ARTIFACTS,
                found: paths.len(),
            });
        }

        let dataset = load_dataset(&paths[0]).await?;
        let model = load_model(&paths[1]).await?;
        debug!(
            "worker 已加载数据集 {} 与模型 {}",
            paths[0].display(),
            paths[1].display()
        );

        Self::from_parts(Arc::new(dataset), model)
    }

    pub fn from_parts(dataset: Arc<Dataset>, model: Arc<dyn Classifier>) -> AppResult<Self> {
        if model.input_count() != dataset.input_count() {
            return Err(JobError::malformed_artifact(
                "model.inputs",
                format!(
                    "模型需要 {} 个输入属性, 数据集提供 {} 个",
                    model.input_count(),
                    dataset.input_count()
                ),
            ));
        }
        if model.class_count() > dataset.class_count() {
            return Err(JobError::malformed_artifact(
                "model.classes",
                format!(
                    "模型类别下标最大为 {}, 数据集只有 {} 个类别",
                    model.class_count() - 1,
                    dataset.class_count()
                ),
            ));
        }
        let converter = DataConverter::new(Arc::clone(&dataset))?;
        Ok(Self {
            dataset,
            model,
            converter,
        })
    }

    /// 处理一行输入
    ///
    /// # 参数
    /// - `state`: 分区状态
    /// - `offset`: 该行在源文件中的字节偏移
    /// - `line`: 去掉换行符的行内容
    /// - `sink`: 记录输出
    pub fn process(
        &self,
        state: &mut PartitionState,
        offset: u64,
        line: &str,
        sink: &mut PairSink,
    ) -> AppResult<()> {
        if !state.emitted_marker {
            self.emit_marker(state, offset as f64, sink)?;
        }

        if line.trim().is_empty() {
            return Ok(());
        }

        let instance = self.converter.convert(line)?;
        let prediction = self.model.classify(&instance);
        sink.emit(self.dataset.label_of(&instance), &format_prediction(prediction))?;
        state.records += 1;
        Ok(())
    }

    /// 分区结束；源文件没有任何行时也补上标记行
    pub fn finish(&self, state: &mut PartitionState, sink: &mut PairSink) -> AppResult<()> {
        if !state.emitted_marker {
            self.emit_marker(state, 0.0, sink)?;
        }
        Ok(())
    }

    fn emit_marker(
        &self,
        state: &mut PartitionState,
        key: f64,
        sink: &mut PairSink,
    ) -> AppResult<()> {
        sink.emit(key, &state.source_name)?;
        state.emitted_marker = true;
        Ok(())
    }
}

/// 预测值的文本形式，整数值保留 `.0`
pub fn format_prediction(prediction: f64) -> String {
    format!("{:?}", prediction)
}
