use crate::error::{AppResult, JobError};
use std::path::PathBuf;
use std::str::FromStr;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 已训练模型在存储中的位置
    pub model_path: String,
    /// 待分类数据的位置（单个文件或目录）
    pub input_path: String,
    /// 数据集描述的位置
    pub dataset_path: String,
    /// 输出位置，作业开始前必须不存在
    pub output_path: String,
    /// 本地对象存储的根目录
    pub store_root: PathBuf,
    /// worker 本地广播副本目录
    pub broadcast_cache_dir: PathBuf,
    /// 同时运行的 worker 数量
    pub max_concurrent_workers: usize,
    /// 重组时跳过损坏的分区输出，而不是让作业失败
    pub skip_corrupt_partitions: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_path: "model/rule_base.bin".to_string(),
            input_path: "data/test".to_string(),
            dataset_path: "data/dataset.toml".to_string(),
            output_path: "output".to_string(),
            store_root: PathBuf::from("."),
            broadcast_cache_dir: std::env::temp_dir().join("batch_classifier_cache"),
            max_concurrent_workers: 8,
            skip_corrupt_partitions: false,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 由任意变量来源构建；缺失或无法解析的值使用默认值
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();
        Self {
            model_path: lookup("MODEL_PATH").unwrap_or(default.model_path),
            input_path: lookup("INPUT_PATH").unwrap_or(default.input_path),
            dataset_path: lookup("DATASET_PATH").unwrap_or(default.dataset_path),
            output_path: lookup("OUTPUT_PATH").unwrap_or(default.output_path),
            store_root: lookup("STORE_ROOT")
                .map(PathBuf::from)
                .unwrap_or(default.store_root),
            broadcast_cache_dir: lookup("BROADCAST_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.broadcast_cache_dir),
            max_concurrent_workers: parse_var(&lookup, "MAX_CONCURRENT_WORKERS")
                .unwrap_or(default.max_concurrent_workers),
            skip_corrupt_partitions: parse_var(&lookup, "SKIP_CORRUPT_PARTITIONS")
                .unwrap_or(default.skip_corrupt_partitions),
            verbose_logging: parse_var(&lookup, "VERBOSE_LOGGING")
                .unwrap_or(default.verbose_logging),
        }
    }

    /// 检查配置是否可用于启动作业
    pub fn validate(&self) -> AppResult<()> {
        let locations = [
            ("MODEL_PATH", &self.model_path),
            ("INPUT_PATH", &self.input_path),
            ("DATASET_PATH", &self.dataset_path),
            ("OUTPUT_PATH", &self.output_path),
        ];
        for (name, value) in locations {
            if value.trim().is_empty() {
                return Err(JobError::Config(format!("{} 不能为空", name)));
            }
        }
        if self.max_concurrent_workers == 0 {
            return Err(JobError::Config("MAX_CONCURRENT_WORKERS 必须大于 0".to_string()));
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    lookup(name).and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_vars(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn reads_every_variable() {
        let config = from_vars(&[
            ("MODEL_PATH", "m/chi.bin"),
            ("INPUT_PATH", "in"),
            ("DATASET_PATH", "m/iris.toml"),
            ("OUTPUT_PATH", "out"),
            ("STORE_ROOT", "/data"),
            ("BROADCAST_CACHE_DIR", "/tmp/cache"),
            ("MAX_CONCURRENT_WORKERS", " 3 "),
            ("SKIP_CORRUPT_PARTITIONS", "true"),
            ("VERBOSE_LOGGING", "true"),
        ]);
        assert_eq!(config.model_path, "m/chi.bin");
        assert_eq!(config.input_path, "in");
        assert_eq!(config.dataset_path, "m/iris.toml");
        assert_eq!(config.output_path, "out");
        assert_eq!(config.store_root, PathBuf::from("/data"));
        assert_eq!(config.broadcast_cache_dir, PathBuf::from("/tmp/cache"));
        assert_eq!(config.max_concurrent_workers, 3);
        assert!(config.skip_corrupt_partitions);
        assert!(config.verbose_logging);
    }

    #[test]
    fn unparsable_values_fall_back_to_defaults() {
        let config = from_vars(&[
            ("MAX_CONCURRENT_WORKERS", "many"),
            ("SKIP_CORRUPT_PARTITIONS", "yes"),
        ]);
        let default = Config::default();
        assert_eq!(config.max_concurrent_workers, default.max_concurrent_workers);
        assert!(!config.skip_corrupt_partitions);
        assert_eq!(config.model_path, default.model_path);
        assert_eq!(config.store_root, default.store_root);
    }

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn zero_workers_rejected() {
        let config = Config {
            max_concurrent_workers: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(JobError::Config(_))));
    }

    #[test]
    fn empty_output_path_rejected() {
        let config = Config {
            output_path: "  ".to_string(),
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("OUTPUT_PATH"));
    }
}
