use crate::error::{AppResult, JobError};
use crate::infrastructure::{file_name, ObjectStore};
use crate::workflow::InputSplit;
use tracing::info;

/// 规划输入分片
///
/// 输入可以是单个对象，也可以是前缀（只取直接子对象）。
/// 每个源文件恰好对应一个分片，文件本身不会被切分，
/// 这样分区输出的标记行才能唯一确定源文件。
pub async fn plan_splits<S>(store: &S, input: &str) -> AppResult<Vec<InputSplit>>
where
    S: ObjectStore + ?Sized,
{
    let keys = if store.is_object(input).await? {
        vec![input.trim_end_matches('/').to_string()]
    } else {
        store.list(input).await?
    };

    if keys.is_empty() {
        return Err(JobError::NoOutputProduced {
            path: input.to_string(),
        });
    }

    let splits: Vec<InputSplit> = keys
        .into_iter()
        .enumerate()
        .map(|(index, key)| InputSplit {
            index,
            source_name: file_name(&key).to_string(),
            key,
        })
        .collect();

    info!("✓ 找到 {} 个输入文件", splits.len());
    Ok(splits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::MemoryStore;

    #[tokio::test]
    async fn one_split_per_file() {
        let store = MemoryStore::new();
        store.put("in/b.txt", vec![]).await.unwrap();
        store.put("in/a.txt", vec![]).await.unwrap();
        store.put("in/_tmp", vec![]).await.unwrap();

        let splits = plan_splits(&store, "in").await.unwrap();
        let names: Vec<&str> = splits.iter().map(|s| s.source_name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
        assert_eq!(splits[1].index, 1);
        assert_eq!(splits[1].key, "in/b.txt");
    }

    #[tokio::test]
    async fn single_file_input() {
        let store = MemoryStore::new();
        store.put("in/only.csv", vec![1]).await.unwrap();

        let splits = plan_splits(&store, "in/only.csv").await.unwrap();
        assert_eq!(splits.len(), 1);
        assert_eq!(splits[0].source_name, "only.csv");
    }

    #[tokio::test]
    async fn empty_input_is_an_error() {
        let store = MemoryStore::new();
        assert!(matches!(
            plan_splits(&store, "in").await,
            Err(JobError::NoOutputProduced { .. })
        ));
    }
}
