//! 分区处理上下文
//!
//! 封装"我正在处理哪个源文件的哪个分区"这一信息

use std::fmt::Display;

/// 一个输入分片：恰好对应一个源文件，不会再切分
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSplit {
    /// 分区编号（从 0 开始）
    pub index: usize,
    /// 源文件在存储中的键
    pub key: String,
    /// 源文件名，写入标记行并决定输出文件名
    pub source_name: String,
}

impl Display for InputSplit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[分区 #{} 源文件 {}]", self.index, self.source_name)
    }
}

/// 单个分区的可变状态，由调用方显式传入 worker
#[derive(Debug, Clone)]
pub struct PartitionState {
    /// 标记行是否已输出
    pub emitted_marker: bool,
    pub source_name: String,
    /// 已输出的预测条数
    pub records: usize,
}

impl PartitionState {
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            emitted_marker: false,
            source_name: source_name.into(),
            records: 0,
        }
    }
}
