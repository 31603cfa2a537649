//! 输出重组 - 业务能力层
//!
//! 读取所有分区输出，按标记行把预测写回每个源文件对应的 `.out` 文件，
//! 同时汇总 (真实标签, 预测标签) 结果矩阵。
//! 在所有 worker 完成之后单线程执行。

use crate::codec::decode_pairs;
use crate::error::{AppResult, JobError};
use crate::infrastructure::{join_key, ObjectStore};
use crate::models::ResultMatrix;
use tracing::{debug, info, warn};

/// 输出文件后缀
pub const OUTPUT_SUFFIX: &str = ".out";

/// 重组结果
#[derive(Debug, Default)]
pub struct ReassemblyOutput {
    pub results: ResultMatrix,
    /// 写出的 `.out` 文件键
    pub output_files: Vec<String>,
    /// 被跳过的损坏分区
    pub skipped_partitions: Vec<String>,
}

/// 输出重组器
pub struct Reassembler<'a, S: ObjectStore + ?Sized> {
    store: &'a S,
    skip_corrupt: bool,
}

/// 一个分区解析后的内容，确认完整后才写出
struct PartitionContent {
    source_name: String,
    text: String,
    rows: Vec<(f64, f64)>,
}

impl<'a, S: ObjectStore + ?Sized> Reassembler<'a, S> {
    /// # 参数
    /// - `store`: 对象存储
    /// - `skip_corrupt`: 遇到损坏分区时跳过而不是失败
    pub fn new(store: &'a S, skip_corrupt: bool) -> Self {
        Self {
            store,
            skip_corrupt,
        }
    }

    /// 重组 `scatter` 下的全部分区输出到 `output`
    pub async fn reassemble(&self, scatter: &str, output: &str) -> AppResult<ReassemblyOutput> {
        let partitions = self.store.list(scatter).await?;
        if partitions.is_empty() {
            return Err(JobError::NoOutputProduced {
                path: scatter.to_string(),
            });
        }

        info!("🧩 开始重组 {} 个分区输出", partitions.len());
        let mut result = ReassemblyOutput::default();

        for key in partitions {
            let content = match self.read_partition(&key).await {
                Ok(content) => content,
                Err(e @ JobError::CorruptPartitionOutput { .. }) if self.skip_corrupt => {
                    warn!("⚠️ 跳过损坏的分区输出: {}", e);
                    result.skipped_partitions.push(key);
                    continue;
                }
                Err(e) => return Err(e),
            };

            let destination = join_key(output, &format!("{}{}", content.source_name, OUTPUT_SUFFIX));
            self.store
                .put(&destination, content.text.into_bytes())
                .await?;
            debug!(
                "已写出 {} ({} 条预测)",
                destination,
                content.rows.len()
            );

            for (actual, predicted) in content.rows {
                result.results.push(actual, predicted);
            }
            result.output_files.push(destination);
        }

        Ok(result)
    }

    async fn read_partition(&self, key: &str) -> AppResult<PartitionContent> {
        let bytes = self.store.get(key).await?;
        let pairs =
            decode_pairs(&bytes).map_err(|e| JobError::corrupt_partition(key, e.to_string()))?;

        let mut pairs = pairs.into_iter();
        let Some((_, source_name)) = pairs.next() else {
            return Err(JobError::corrupt_partition(key, "缺少标记行"));
        };
        if source_name.is_empty() {
            return Err(JobError::corrupt_partition(key, "标记行中的源文件名为空"));
        }

        let mut text = String::new();
        let mut rows = Vec::new();
        for (actual, value) in pairs {
            let predicted: f64 = value.parse().map_err(|_| {
                JobError::corrupt_partition(key, format!("预测值 '{}' 不是数字", value))
            })?;
            text.push_str(&value);
            text.push('\n');
            rows.push((actual, predicted));
        }

        Ok(PartitionContent {
            source_name,
            text,
            rows,
        })
    }
}
