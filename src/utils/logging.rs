/// 日志工具模块
///
/// 提供作业日志格式化和输出的辅助函数
use crate::models::ConfusionMatrix;
use crate::orchestrator::{ExecutionContext, JobLocations, JobReport};
use tracing::{info, warn};

/// 记录作业启动信息
pub fn log_job_start(locations: &JobLocations, context: &ExecutionContext) {
    info!("{}", "=".repeat(60));
    info!("🚀 分类作业启动");
    info!("📄 输入: {}", locations.input);
    info!("🧠 模型: {}", locations.model);
    info!("📐 数据集: {}", locations.dataset);
    info!("📁 输出: {}", locations.output);
    info!("📊 最大并发 worker 数: {}", context.max_concurrent_workers);
    info!("{}", "=".repeat(60));
}

/// 记录打分阶段开始
///
/// # 参数
/// - `partitions`: 分区数量
/// - `max_concurrent`: 最大并发数
pub fn log_stage_start(partitions: usize, max_concurrent: usize) {
    info!("\n{}", "─".repeat(60));
    info!("📦 启动打分阶段: {} 个分区, 无归约", partitions);
    info!("💡 同时最多运行 {} 个 worker", max_concurrent);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(report: &JobReport, output: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 作业完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 分区: {}", report.partitions);
    info!("✅ 预测: {} 条", report.records);
    info!("✅ 输出文件: {} 个", report.output_files);
    if !report.skipped_partitions.is_empty() {
        warn!("⚠️ 跳过损坏分区: {} 个", report.skipped_partitions.len());
        for key in &report.skipped_partitions {
            warn!("   - {}", key);
        }
    }
    info!("⏱️ 耗时: {}", elapsed_time(report.elapsed_ms));
    info!("{}", "=".repeat(60));
    info!("\n结果已保存至: {}", output);
}

/// 记录混淆矩阵摘要
pub fn log_confusion_matrix(matrix: &ConfusionMatrix, labels: &[String]) {
    for (actual, name) in labels.iter().enumerate() {
        let row: Vec<String> = (0..labels.len())
            .map(|predicted| matrix.count(actual, predicted).to_string())
            .collect();
        info!("{:>12} | {}", truncate_text(name, 12), row.join(" "));
    }
    info!(
        "🎯 准确率: {:.4} ({}/{}, 未归类 {})",
        matrix.accuracy(),
        matrix.correct(),
        matrix.total() + matrix.unclassified(),
        matrix.unclassified()
    );
}

/// 把毫秒格式化为 "时h 分m 秒s 毫秒"
pub fn elapsed_time(millis: u128) -> String {
    let mut milli = millis;
    let mut seconds = milli / 1000;
    milli %= 1000;

    let mut minutes = seconds / 60;
    seconds %= 60;

    let hours = minutes / 60;
    minutes %= 60;

    format!("{}h {}m {}s {}", hours, minutes, seconds, milli)
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
