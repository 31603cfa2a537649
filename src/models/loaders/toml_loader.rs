use crate::error::{AppResult, JobError};
use crate::models::dataset::Dataset;
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载数据集描述
pub async fn load_dataset(path: &Path) -> AppResult<Dataset> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| JobError::storage(path.display().to_string(), e))?;

    let dataset = Dataset::from_toml_str(&content).map_err(|e| match e {
        JobError::Schema(reason) => JobError::Schema(format!("{}: {}", path.display(), reason)),
        other => other,
    })?;

    tracing::debug!(
        "数据集已加载: {} 列, {} 个类别",
        dataset.attribute_count(),
        dataset.class_count()
    );

    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dataset::tests::IRIS_TOML;

    #[tokio::test]
    async fn loads_dataset_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.toml");
        std::fs::write(&path, IRIS_TOML).unwrap();

        let dataset = load_dataset(&path).await.unwrap();
        assert_eq!(dataset.label_names(), &["setosa", "versicolor"]);
    }

    #[tokio::test]
    async fn missing_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_dataset(&dir.path().join("nope.toml")).await.unwrap_err();
        assert!(matches!(err, JobError::Storage { .. }));
    }

    #[tokio::test]
    async fn schema_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "labels = []\nattributes = []\n").unwrap();
        let err = load_dataset(&path).await.unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }
}
