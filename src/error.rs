use thiserror::Error;

/// 作业错误类型
///
/// 本 crate 内没有任何错误会被内部重试，所有错误都会向上传递为作业失败。
#[derive(Debug, Error)]
pub enum JobError {
    /// 输出位置已存在（前置条件不满足）
    #[error("输出位置已存在: {path}")]
    OutputAlreadyExists { path: String },

    /// 广播产物不足，worker 无法完成 setup
    #[error("广播产物不足: 期望 {expected} 个, 实际 {found} 个")]
    MissingArtifact { expected: usize, found: usize },

    /// 并行打分阶段未能完成
    #[error("打分阶段失败 (分区 {partition}): {source}")]
    ScoringStageFailed {
        partition: usize,
        #[source]
        source: Box<JobError>,
    },

    /// 分区输出缺少标记行或内容无法解析
    #[error("分区输出损坏 ({key}): {reason}")]
    CorruptPartitionOutput { key: String, reason: String },

    /// 分散区中没有任何可处理的输出
    #[error("没有找到任何输出: {path}")]
    NoOutputProduced { path: String },

    /// 编解码时长度与声明不符
    #[error("产物格式错误 ({field}): {reason}")]
    MalformedArtifact {
        field: &'static str,
        reason: String,
    },

    /// 输入行无法转换为记录
    #[error("无法解析输入行 '{line}': {reason}")]
    MalformedRecord { line: String, reason: String },

    /// 数据集描述无效
    #[error("数据集描述无效: {0}")]
    Schema(String),

    /// 产物分发后仍尝试注册
    #[error("广播产物已分发，不能再注册: {path}")]
    BroadcastSealed { path: String },

    /// worker 任务未正常结束（panic、被取消等）
    #[error("执行阶段内部错误: {0}")]
    Stage(String),

    /// 对象存储操作失败
    #[error("存储操作失败 ({key}): {source}")]
    Storage {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),
}

// ========== 便捷构造函数 ==========

impl JobError {
    /// 创建存储错误
    pub fn storage(key: impl Into<String>, source: std::io::Error) -> Self {
        JobError::Storage {
            key: key.into(),
            source,
        }
    }

    /// 创建产物格式错误
    pub fn malformed_artifact(field: &'static str, reason: impl Into<String>) -> Self {
        JobError::MalformedArtifact {
            field,
            reason: reason.into(),
        }
    }

    /// 创建记录解析错误
    pub fn malformed_record(line: impl Into<String>, reason: impl Into<String>) -> Self {
        JobError::MalformedRecord {
            line: line.into(),
            reason: reason.into(),
        }
    }

    /// 创建分区输出损坏错误
    pub fn corrupt_partition(key: impl Into<String>, reason: impl Into<String>) -> Self {
        JobError::CorruptPartitionOutput {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

impl From<toml::de::Error> for JobError {
    fn from(err: toml::de::Error) -> Self {
        JobError::Schema(err.to_string())
    }
}

// ========== Result 类型别名 ==========

/// 作业结果类型
pub type AppResult<T> = Result<T, JobError>;
