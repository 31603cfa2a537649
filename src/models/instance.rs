//! 输入记录与行转换

use crate::error::{AppResult, JobError};
use crate::models::dataset::{AttributeKind, Dataset};
use regex::Regex;
use std::sync::Arc;

/// 未标注记录的标签值
pub const UNKNOWN_LABEL: f64 = -1.0;

/// 一行输入解析后的记录
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    /// 输入属性值，顺序与数据集中的输入属性一致
    pub values: Vec<f64>,
    /// 真实标签下标；`?` 表示未知
    pub label: Option<f64>,
}

/// 将文本行转换为 [`Instance`]
pub struct DataConverter {
    dataset: Arc<Dataset>,
    separator: Regex,
}

impl DataConverter {
    pub fn new(dataset: Arc<Dataset>) -> AppResult<Self> {
        let separator = Regex::new(r"[, ]").map_err(|e| JobError::Schema(e.to_string()))?;
        Ok(Self { dataset, separator })
    }

    /// 转换一行；列数不符或取值无法识别时返回 `MalformedRecord`
    pub fn convert(&self, line: &str) -> AppResult<Instance> {
        let tokens: Vec<&str> = self
            .separator
            .split(line.trim())
            .filter(|t| !t.is_empty())
            .collect();

        let attributes = self.dataset.attributes();
        if tokens.len() != attributes.len() {
            return Err(JobError::malformed_record(
                line,
                format!("期望 {} 列, 实际 {} 列", attributes.len(), tokens.len()),
            ));
        }

        let mut values = Vec::with_capacity(self.dataset.input_count());
        let mut label = None;

        for (attr, token) in attributes.iter().zip(tokens) {
            match attr.kind {
                AttributeKind::Ignored => {}
                AttributeKind::Numeric => {
                    let value: f64 = token.parse().map_err(|_| {
                        JobError::malformed_record(
                            line,
                            format!("属性 {} 的值 '{}' 不是数字", attr.name, token),
                        )
                    })?;
                    values.push(value);
                }
                AttributeKind::Categorical => {
                    let index = attr.values.iter().position(|v| v == token).ok_or_else(|| {
                        JobError::malformed_record(
                            line,
                            format!("属性 {} 没有取值 '{}'", attr.name, token),
                        )
                    })?;
                    values.push(index as f64);
                }
                AttributeKind::Label => {
                    if token != "?" {
                        let index = self.dataset.label_index(token).ok_or_else(|| {
                            JobError::malformed_record(line, format!("未知标签 '{}'", token))
                        })?;
                        label = Some(index as f64);
                    }
                }
            }
        }

        Ok(Instance { values, label })
    }
}
