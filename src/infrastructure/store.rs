//! 对象存储抽象
//!
//! 分散/汇集只依赖这里的几个操作，重组算法与具体存储无关。

use crate::error::AppResult;
use async_trait::async_trait;

/// 以 `/` 分隔键寻址的对象存储
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// 键是对象，或是某个对象的前缀
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// 键是一个对象（而不是前缀）
    async fn is_object(&self, key: &str) -> AppResult<bool>;

    /// 创建或覆盖对象
    async fn put(&self, key: &str, bytes: Vec<u8>) -> AppResult<()>;

    async fn get(&self, key: &str) -> AppResult<Vec<u8>>;

    /// 列出前缀下的直接子对象，按键排序，隐藏项已过滤
    async fn list(&self, prefix: &str) -> AppResult<Vec<String>>;

    /// 删除对象或整个前缀；不存在时不报错
    async fn delete_recursive(&self, key: &str) -> AppResult<()>;
}

/// 拼接父键与子名称
pub fn join_key(parent: &str, child: &str) -> String {
    let parent = parent.trim_end_matches('/');
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{}/{}", parent, child)
    }
}

/// 键的最后一段
pub fn file_name(key: &str) -> &str {
    key.trim_end_matches('/').rsplit('/').next().unwrap_or(key)
}

/// 隐藏或临时条目：`_SUCCESS`、`.part-*`、`*.crc`
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('_') || name.starts_with('.') || name.ends_with(".crc")
}
