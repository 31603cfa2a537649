use super::cursor::ByteReader;
use crate::error::{AppResult, JobError};

fn write_count(out: &mut Vec<u8>, len: usize, field: &'static str) -> AppResult<()> {
    let count = u32::try_from(len)
        .map_err(|_| JobError::malformed_artifact(field, format!("元素个数 {} 超出 u32", len)))?;
    out.extend_from_slice(&count.to_be_bytes());
    Ok(())
}

/// 读取元素个数，并确认剩余字节足够容纳声明的元素
fn read_count(reader: &mut ByteReader<'_>, width: usize, field: &'static str) -> AppResult<usize> {
    let count = reader.read_u32(field)? as usize;
    let needed = count.checked_mul(width).ok_or_else(|| {
        JobError::malformed_artifact(field, format!("声明的元素个数 {} 过大", count))
    })?;
    if needed > reader.remaining() {
        return Err(JobError::malformed_artifact(
            field,
            format!(
                "声明 {} 个元素需要 {} 字节, 只剩 {} 字节",
                count,
                needed,
                reader.remaining()
            ),
        ));
    }
    Ok(count)
}

/// 写入 f64 数组
pub fn write_f64_array(out: &mut Vec<u8>, values: &[f64], field: &'static str) -> AppResult<()> {
    write_count(out, values.len(), field)?;
    for value in values {
        out.extend_from_slice(&value.to_be_bytes());
    }
    Ok(())
}

/// 写入 i32 数组
pub fn write_i32_array(out: &mut Vec<u8>, values: &[i32], field: &'static str) -> AppResult<()> {
    write_count(out, values.len(), field)?;
    for value in values {
        out.extend_from_slice(&value.to_be_bytes());
    }
    Ok(())
}

/// 从游标读取 f64 数组
pub fn read_f64_array(reader: &mut ByteReader<'_>, field: &'static str) -> AppResult<Vec<f64>> {
    let count = read_count(reader, 8, field)?;
    (0..count).map(|_| reader.read_f64(field)).collect()
}

/// 从游标读取 i32 数组
pub fn read_i32_array(reader: &mut ByteReader<'_>, field: &'static str) -> AppResult<Vec<i32>> {
    let count = read_count(reader, 4, field)?;
    (0..count).map(|_| reader.read_i32(field)).collect()
}

pub fn encode_f64_array(values: &[f64]) -> AppResult<Vec<u8>> {
    let mut out = Vec::with_capacity(4 + values.len() * 8);
    write_f64_array(&mut out, values, "f64_array")?;
    Ok(out)
}

pub fn encode_i32_array(values: &[i32]) -> AppResult<Vec<u8>> {
    let mut out = Vec::with_capacity(4 + values.len() * 4);
    write_i32_array(&mut out, values, "i32_array")?;
    Ok(out)
}

/// 解码整个缓冲区；声明的个数必须与字节长度完全一致
pub fn decode_f64_array(bytes: &[u8]) -> AppResult<Vec<f64>> {
    let mut reader = ByteReader::new(bytes);
    let values = read_f64_array(&mut reader, "f64_array")?;
    reader.ensure_consumed("f64_array")?;
    Ok(values)
}

pub fn decode_i32_array(bytes: &[u8]) -> AppResult<Vec<i32>> {
    let mut reader = ByteReader::new(bytes);
    let values = read_i32_array(&mut reader, "i32_array")?;
    reader.ensure_consumed("i32_array")?;
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn f64_arrays_survive_encoding() {
        for values in [vec![], vec![1.5], vec![0.0, -2.25, f64::MAX, 1e-9]] {
            let bytes = encode_f64_array(&values).unwrap();
            assert_eq!(bytes.len(), 4 + values.len() * 8);
            assert_eq!(decode_f64_array(&bytes).unwrap(), values);
        }
    }

    #[test]
    fn i32_arrays_survive_encoding() {
        for values in [vec![], vec![7], vec![i32::MIN, -1, 0, 3, i32::MAX]] {
            let bytes = encode_i32_array(&values).unwrap();
            assert_eq!(decode_i32_array(&bytes).unwrap(), values);
        }
    }

    #[test]
    fn count_prefix_is_big_endian() {
        let bytes = encode_i32_array(&[1, 2]).unwrap();
        assert_eq!(&bytes[..4], &[0, 0, 0, 2]);
        assert_eq!(&bytes[4..8], &[0, 0, 0, 1]);
    }

    #[test]
    fn truncated_bytes_are_malformed() {
        let bytes = encode_f64_array(&[1.0, 2.0, 3.0]).unwrap();
        let err = decode_f64_array(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, JobError::MalformedArtifact { .. }));

        let bytes = encode_i32_array(&[4, 5]).unwrap();
        assert!(decode_i32_array(&bytes[..6]).is_err());
        assert!(decode_i32_array(&bytes[..2]).is_err());
    }

    #[test]
    fn trailing_bytes_are_malformed() {
        let mut bytes = encode_i32_array(&[9]).unwrap();
        bytes.push(0);
        assert!(matches!(
            decode_i32_array(&bytes),
            Err(JobError::MalformedArtifact { .. })
        ));
    }

    #[test]
    fn streaming_reads_consecutive_arrays() {
        let mut out = Vec::new();
        write_i32_array(&mut out, &[1, 2, 3], "header").unwrap();
        write_f64_array(&mut out, &[0.5], "weights").unwrap();

        let mut reader = ByteReader::new(&out);
        assert_eq!(read_i32_array(&mut reader, "header").unwrap(), vec![1, 2, 3]);
        assert_eq!(read_f64_array(&mut reader, "weights").unwrap(), vec![0.5]);
        assert!(reader.is_empty());
    }
}
