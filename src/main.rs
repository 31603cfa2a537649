use anyhow::{Context, Result};
use batch_classifier::infrastructure::LocalStore;
use batch_classifier::models::{load_dataset, ConfusionMatrix};
use batch_classifier::utils::logging;
use batch_classifier::{logger, ClassifyJob, Config, ExecutionContext, JobLocations};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logger::init_with_verbose(config.verbose_logging);

    config.validate()?;

    let store = Arc::new(LocalStore::new(&config.store_root));
    let mut job = ClassifyJob::new(
        JobLocations::from_config(&config),
        store,
        ExecutionContext::from_config(&config),
    );

    job.run().await.context("分类作业失败")?;

    // 混淆矩阵
    let dataset_path = config.store_root.join(&config.dataset_path);
    let dataset = load_dataset(&dataset_path).await?;
    if let Some(results) = job.results() {
        let matrix = ConfusionMatrix::from_results(results, dataset.class_count());
        logging::log_confusion_matrix(&matrix, dataset.label_names());
    }

    Ok(())
}
