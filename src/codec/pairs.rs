//! 分区输出的 (键, 文本) 记录
//!
//! 每条记录：8 字节 f64 键 + 4 字节长度 + UTF-8 文本。

use super::cursor::ByteReader;
use crate::error::{AppResult, JobError};

/// 追加一条记录
pub fn encode_pair(out: &mut Vec<u8>, key: f64, value: &str) -> AppResult<()> {
    let len = u32::try_from(value.len())
        .map_err(|_| JobError::malformed_artifact("pair.value", "文本过长"))?;
    out.extend_from_slice(&key.to_be_bytes());
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(value.as_bytes());
    Ok(())
}

/// 按写入顺序解码全部记录
pub fn decode_pairs(bytes: &[u8]) -> AppResult<Vec<(f64, String)>> {
    let mut reader = ByteReader::new(bytes);
    let mut pairs = Vec::new();
    while !reader.is_empty() {
        let key = reader.read_f64("pair.key")?;
        let len = reader.read_u32("pair.len")? as usize;
        let raw = reader.read_exact(len, "pair.value")?;
        let value = std::str::from_utf8(raw)
            .map_err(|e| JobError::malformed_artifact("pair.value", e.to_string()))?;
        pairs.push((key, value.to_string()));
    }
    Ok(pairs)
}
