use crate::error::{AppResult, JobError};

/// 字节切片上的游标，读取失败时带上字段名
#[derive(Debug, Clone, Copy)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    /// 当前偏移
    pub fn position(&self) -> usize {
        self.offset
    }

    /// 剩余字节数
    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.offset)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// 读取恰好 `len` 个字节
    pub fn read_exact(&mut self, len: usize, field: &'static str) -> AppResult<&'a [u8]> {
        if len > self.remaining() {
            return Err(JobError::malformed_artifact(
                field,
                format!("需要 {} 字节, 只剩 {} 字节", len, self.remaining()),
            ));
        }
        let start = self.offset;
        self.offset += len;
        Ok(&self.bytes[start..start + len])
    }

    /// 读取定长字节数组
    pub fn read_array<const N: usize>(&mut self, field: &'static str) -> AppResult<[u8; N]> {
        let bytes = self.read_exact(N, field)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_u32(&mut self, field: &'static str) -> AppResult<u32> {
        Ok(u32::from_be_bytes(self.read_array::<4>(field)?))
    }

    pub fn read_i32(&mut self, field: &'static str) -> AppResult<i32> {
        Ok(i32::from_be_bytes(self.read_array::<4>(field)?))
    }

    pub fn read_f64(&mut self, field: &'static str) -> AppResult<f64> {
        Ok(f64::from_be_bytes(self.read_array::<8>(field)?))
    }

    /// 确认所有字节都已读取
    pub fn ensure_consumed(&self, field: &'static str) -> AppResult<()> {
        if self.remaining() != 0 {
            return Err(JobError::malformed_artifact(
                field,
                format!("读取到 {} 字节后仍有 {} 字节剩余", self.position(), self.remaining()),
            ));
        }
        Ok(())
    }
}
