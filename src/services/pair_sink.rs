//! 分区输出写入 - 业务能力层
//!
//! 只负责"把记录编码进分区输出"，不关心记录从哪里来

use crate::codec::encode_pair;
use crate::error::AppResult;
use tracing::trace;

/// 分区输出缓冲
///
/// 职责：
/// - 按产生顺序追加 (键, 值) 记录
/// - 分区结束后整体交给存储写入
#[derive(Debug, Default)]
pub struct PairSink {
    buffer: Vec<u8>,
    pairs: usize,
}

impl PairSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条记录
    pub fn emit(&mut self, key: f64, value: &str) -> AppResult<()> {
        trace!("输出记录: {} → {}", key, value);
        encode_pair(&mut self.buffer, key, value)?;
        self.pairs += 1;
        Ok(())
    }

    /// 已追加的记录数
    pub fn pairs(&self) -> usize {
        self.pairs
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}
