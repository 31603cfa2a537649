//! 只读产物的一次性广播
//!
//! 作业启动前按顺序注册产物（数据集描述在前，模型在后），
//! `distribute` 把每个产物复制一份到 worker 本地缓存目录并设为只读。
//! worker 通过 [`BroadcastHandle`] 按注册顺序拿到本地路径。

use crate::error::{AppResult, JobError};
use crate::infrastructure::store::{file_name, ObjectStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, warn};

/// 产物注册表
#[derive(Debug, Default)]
pub struct BroadcastRegistry {
    artifacts: Vec<String>,
    sealed: bool,
}

impl BroadcastRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一个产物；分发之后再注册会失败
    pub fn register_artifact(&mut self, key: impl Into<String>) -> AppResult<()> {
        let key = key.into();
        if self.sealed {
            return Err(JobError::BroadcastSealed { path: key });
        }
        debug!("注册广播产物: {}", key);
        self.artifacts.push(key);
        Ok(())
    }

    /// 把全部产物复制到 `cache_dir` 下本次作业独占的目录，只执行一次
    pub async fn distribute<S>(&mut self, store: &S, cache_dir: &Path) -> AppResult<BroadcastHandle>
    where
        S: ObjectStore + ?Sized,
    {
        if self.sealed {
            return Err(JobError::BroadcastSealed {
                path: cache_dir.display().to_string(),
            });
        }
        self.sealed = true;

        let job_dir = cache_dir.join(format!(
            "job-{}-{}",
            chrono::Local::now().format("%Y%m%d%H%M%S%f"),
            std::process::id()
        ));
        fs::create_dir_all(&job_dir)
            .await
            .map_err(|e| JobError::storage(job_dir.display().to_string(), e))?;

        let handle = BroadcastHandle {
            paths: Arc::new(Vec::new()),
            root: Some(job_dir.clone()),
        };
        match copy_artifacts(store, &self.artifacts, &job_dir).await {
            Ok(paths) => Ok(BroadcastHandle {
                paths: Arc::new(paths),
                ..handle
            }),
            Err(e) => {
                handle.release().await;
                Err(e)
            }
        }
    }
}

async fn copy_artifacts<S>(store: &S, artifacts: &[String], job_dir: &Path) -> AppResult<Vec<PathBuf>>
where
    S: ObjectStore + ?Sized,
{
    let mut paths = Vec::with_capacity(artifacts.len());
    for (index, key) in artifacts.iter().enumerate() {
        let bytes = store.get(key).await?;
        let local = job_dir.join(format!("{:02}-{}", index, file_name(key)));
        write_read_only(&local, bytes).await?;
        info!("📦 已分发产物 {} → {}", key, local.display());
        paths.push(local);
    }
    Ok(paths)
}

async fn write_read_only(path: &Path, bytes: Vec<u8>) -> AppResult<()> {
    let display = path.display().to_string();
    fs::write(path, bytes)
        .await
        .map_err(|e| JobError::storage(&display, e))?;
    let mut permissions = fs::metadata(path)
        .await
        .map_err(|e| JobError::storage(&display, e))?
        .permissions();
    permissions.set_readonly(true);
    fs::set_permissions(path, permissions)
        .await
        .map_err(|e| JobError::storage(&display, e))
}

/// worker 侧看到的广播产物
#[derive(Debug, Clone)]
pub struct BroadcastHandle {
    paths: Arc<Vec<PathBuf>>,
    root: Option<PathBuf>,
}

impl BroadcastHandle {
    /// 直接由本地路径构建，路径不归本句柄管理
    pub fn from_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            paths: Arc::new(paths),
            root: None,
        }
    }

    /// 本地副本路径，顺序与注册顺序一致
    pub fn list_local_artifact_paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// 删除本次作业的本地缓存目录
    pub async fn release(&self) {
        let Some(root) = &self.root else {
            return;
        };
        if let Err(e) = fs::remove_dir_all(root).await {
            warn!("⚠️ 无法清理广播缓存 {}: {}", root.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::MemoryStore;

    #[tokio::test]
    async fn distributes_in_registration_order() {
        let store = MemoryStore::new();
        store.put("meta/dataset.toml", b"schema".to_vec()).await.unwrap();
        store.put("meta/model.bin", b"model".to_vec()).await.unwrap();
        let cache = tempfile::tempdir().unwrap();

        let mut registry = BroadcastRegistry::new();
        registry.register_artifact("meta/dataset.toml").unwrap();
        registry.register_artifact("meta/model.bin").unwrap();
        let handle = registry.distribute(&store, cache.path()).await.unwrap();

        let paths = handle.list_local_artifact_paths();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("00-dataset.toml"));
        assert!(paths[1].ends_with("01-model.bin"));
        assert_eq!(std::fs::read(&paths[1]).unwrap(), b"model");
        assert!(std::fs::metadata(&paths[0]).unwrap().permissions().readonly());

        handle.release().await;
        assert!(!paths[0].exists());
    }

    #[tokio::test]
    async fn distributes_only_once() {
        let store = MemoryStore::new();
        let cache = tempfile::tempdir().unwrap();
        let mut registry = BroadcastRegistry::new();

        registry.distribute(&store, cache.path()).await.unwrap();
        assert!(matches!(
            registry.register_artifact("late.bin"),
            Err(JobError::BroadcastSealed { .. })
        ));
        assert!(registry.distribute(&store, cache.path()).await.is_err());
    }

    #[tokio::test]
    async fn missing_artifact_fails_distribution() {
        let store = MemoryStore::new();
        let cache = tempfile::tempdir().unwrap();
        let mut registry = BroadcastRegistry::new();
        registry.register_artifact("absent.bin").unwrap();

        assert!(matches!(
            registry.distribute(&store, cache.path()).await,
            Err(JobError::Storage { .. })
        ));
        assert_eq!(std::fs::read_dir(cache.path()).unwrap().count(), 0);
    }
}
