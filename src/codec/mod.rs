//! 二进制编解码
//!
//! 所有持久化产物（模型、分区输出）都使用同一套大端布局：
//! 4 字节元素个数，随后按原顺序排列的定长元素。
//! 没有压缩，也没有版本字段，兼容性由调用方负责。

mod arrays;
mod cursor;
mod pairs;

pub use arrays::{
    decode_f64_array, decode_i32_array, encode_f64_array, encode_i32_array, read_f64_array,
    read_i32_array, write_f64_array, write_i32_array,
};
pub use cursor::ByteReader;
pub use pairs::{decode_pairs, encode_pair};
