//! 内存对象存储
//!
//! 所有数据在结构体销毁时丢失，主要用于测试。

use crate::error::{AppResult, JobError};
use crate::infrastructure::store::{file_name, is_hidden, ObjectStore};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::{Error, ErrorKind};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前所有对象的键
    pub async fn keys(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }
}

fn child_prefix(key: &str) -> String {
    format!("{}/", key.trim_end_matches('/'))
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn exists(&self, key: &str) -> AppResult<bool> {
        let objects = self.objects.read().await;
        let prefix = child_prefix(key);
        Ok(objects.contains_key(key) || objects.keys().any(|k| k.starts_with(&prefix)))
    }

    async fn is_object(&self, key: &str) -> AppResult<bool> {
        Ok(self.objects.read().await.contains_key(key))
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> AppResult<()> {
        self.objects.write().await.insert(key.to_string(), bytes);
        Ok(())
    }

    async fn get(&self, key: &str) -> AppResult<Vec<u8>> {
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| JobError::storage(key, Error::new(ErrorKind::NotFound, "对象不存在")))
    }

    async fn list(&self, prefix: &str) -> AppResult<Vec<String>> {
        let prefix = child_prefix(prefix);
        let objects = self.objects.read().await;
        Ok(objects
            .keys()
            .filter(|k| {
                k.strip_prefix(&prefix)
                    .is_some_and(|rest| !rest.contains('/') && !is_hidden(file_name(rest)))
            })
            .cloned()
            .collect())
    }

    async fn delete_recursive(&self, key: &str) -> AppResult<()> {
        let prefix = child_prefix(key);
        self.objects
            .write()
            .await
            .retain(|k, _| k != key && !k.starts_with(&prefix));
        Ok(())
    }
}
