use crate::error::{AppResult, JobError};
use crate::infrastructure::store::{is_hidden, join_key, ObjectStore};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;

/// 以本地目录为根的对象存储
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.root.join(key.trim_start_matches('/'))
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn exists(&self, key: &str) -> AppResult<bool> {
        fs::try_exists(self.path(key))
            .await
            .map_err(|e| JobError::storage(key, e))
    }

    async fn is_object(&self, key: &str) -> AppResult<bool> {
        match fs::metadata(self.path(key)).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(JobError::storage(key, e)),
        }
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> AppResult<()> {
        let path = self.path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| JobError::storage(key, e))?;
        }
        fs::write(&path, bytes)
            .await
            .map_err(|e| JobError::storage(key, e))
    }

    async fn get(&self, key: &str) -> AppResult<Vec<u8>> {
        fs::read(self.path(key))
            .await
            .map_err(|e| JobError::storage(key, e))
    }

    async fn list(&self, prefix: &str) -> AppResult<Vec<String>> {
        let mut entries = match fs::read_dir(self.path(prefix)).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(JobError::storage(prefix, e)),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| JobError::storage(prefix, e))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| JobError::storage(prefix, e))?;
            let name = entry.file_name().to_string_lossy().to_string();
            if file_type.is_file() && !is_hidden(&name) {
                keys.push(join_key(prefix, &name));
            }
        }
        keys.sort();
        Ok(keys)
    }

    async fn delete_recursive(&self, key: &str) -> AppResult<()> {
        let path = self.path(key);
        let result = match fs::metadata(&path).await {
            Ok(meta) if meta.is_dir() => fs::remove_dir_all(&path).await,
            Ok(_) => fs::remove_file(&path).await,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => Err(e),
        };
        result.map_err(|e| JobError::storage(key, e))
    }
}
