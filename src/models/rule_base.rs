//! 模型：分类能力与模糊规则库
//!
//! 打分流水线只通过 [`Classifier`] 使用模型，不接触规则的内部结构。
//! 规则学习不在本 crate 内完成，这里只负责加载与推理。

use crate::codec::{read_f64_array, read_i32_array, write_f64_array, write_i32_array, ByteReader};
use crate::error::{AppResult, JobError};
use crate::models::instance::Instance;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// 没有任何规则被激活时的预测值
pub const NO_PREDICTION: f64 = -1.0;

/// 分类能力
pub trait Classifier: Send + Sync {
    /// 返回预测的标签下标
    fn classify(&self, instance: &Instance) -> f64;

    /// 模型期望的输入属性数量
    fn input_count(&self) -> usize;

    /// 模型可能预测的类别数量（最大类别下标 + 1）
    fn class_count(&self) -> usize;
}

/// 产物头部记录的模型族
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    FuzzyRuleBase = 1,
}

impl ModelFamily {
    fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(ModelFamily::FuzzyRuleBase),
            _ => None,
        }
    }
}

/// 推理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferenceKind {
    /// 取匹配度 × 权重最高的单条规则
    WinningRule = 0,
    /// 按类别累加匹配度 × 权重
    AdditiveCombination = 1,
}

impl InferenceKind {
    fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(InferenceKind::WinningRule),
            1 => Some(InferenceKind::AdditiveCombination),
            _ => None,
        }
    }
}

/// 一条模糊规则
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyRule {
    /// 每个输入属性对应的模糊标签下标
    pub antecedent: Vec<i32>,
    /// 结论类别
    pub class: i32,
    pub weight: f64,
}

/// Chi 风格的模糊规则库
///
/// 每个输入属性在其取值范围上均匀划分为 `n_labels` 个三角隶属函数。
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyRuleBase {
    ranges: Vec<(f64, f64)>,
    n_labels: usize,
    inference: InferenceKind,
    rules: Vec<FuzzyRule>,
    n_classes: usize,
}

impl FuzzyRuleBase {
    pub fn new(
        ranges: Vec<(f64, f64)>,
        n_labels: usize,
        inference: InferenceKind,
        rules: Vec<FuzzyRule>,
    ) -> AppResult<Self> {
        if n_labels == 0 {
            return Err(JobError::malformed_artifact("model.n_labels", "至少需要一个模糊标签"));
        }
        for (index, rule) in rules.iter().enumerate() {
            if rule.antecedent.len() != ranges.len() {
                return Err(JobError::malformed_artifact(
                    "model.antecedents",
                    format!("规则 {} 有 {} 个前件, 期望 {}", index, rule.antecedent.len(), ranges.len()),
                ));
            }
            if rule.antecedent.iter().any(|&l| l < 0 || l as usize >= n_labels) {
                return Err(JobError::malformed_artifact(
                    "model.antecedents",
                    format!("规则 {} 的标签超出 [0, {})", index, n_labels),
                ));
            }
            if rule.class < 0 {
                return Err(JobError::malformed_artifact(
                    "model.classes",
                    format!("规则 {} 的类别为负数", index),
                ));
            }
        }
        let n_classes = rules.iter().map(|r| r.class as usize + 1).max().unwrap_or(0);
        Ok(Self {
            ranges,
            n_labels,
            inference,
            rules,
            n_classes,
        })
    }

    /// 三角隶属度；超出范围的值按边界处理
    fn membership(&self, variable: usize, label: usize, x: f64) -> f64 {
        let (min, max) = self.ranges[variable];
        if self.n_labels == 1 || max <= min {
            return 1.0;
        }
        let step = (max - min) / (self.n_labels - 1) as f64;
        let center = min + label as f64 * step;
        let x = x.clamp(min, max);
        (1.0 - (x - center).abs() / step).max(0.0)
    }

    fn matching_degree(&self, rule: &FuzzyRule, instance: &Instance) -> f64 {
        rule.antecedent
            .iter()
            .zip(&instance.values)
            .enumerate()
            .map(|(variable, (&label, &x))| self.membership(variable, label as usize, x))
            .product()
    }

    /// 按产物布局序列化
    pub fn to_bytes(&self) -> AppResult<Vec<u8>> {
        let header = [
            ModelFamily::FuzzyRuleBase as i32,
            self.inference as i32,
            self.ranges.len() as i32,
            self.n_labels as i32,
            self.rules.len() as i32,
        ];
        let mins: Vec<f64> = self.ranges.iter().map(|r| r.0).collect();
        let maxs: Vec<f64> = self.ranges.iter().map(|r| r.1).collect();
        let antecedents: Vec<i32> = self
            .rules
            .iter()
            .flat_map(|r| r.antecedent.iter().copied())
            .collect();
        let classes: Vec<i32> = self.rules.iter().map(|r| r.class).collect();
        let weights: Vec<f64> = self.rules.iter().map(|r| r.weight).collect();

        let mut out = Vec::new();
        write_i32_array(&mut out, &header, "model.header")?;
        write_f64_array(&mut out, &mins, "model.mins")?;
        write_f64_array(&mut out, &maxs, "model.maxs")?;
        write_i32_array(&mut out, &antecedents, "model.antecedents")?;
        write_i32_array(&mut out, &classes, "model.classes")?;
        write_f64_array(&mut out, &weights, "model.weights")?;
        Ok(out)
    }

    pub fn from_bytes(bytes: &[u8]) -> AppResult<Self> {
        let mut reader = ByteReader::new(bytes);
        let header = read_header(&mut reader)?;
        let inference = InferenceKind::from_code(header[1]).ok_or_else(|| {
            JobError::malformed_artifact("model.header", format!("未知推理方式 {}", header[1]))
        })?;
        let n_inputs = non_negative(header[2], "model.header")?;
        let n_labels = non_negative(header[3], "model.header")?;
        let n_rules = non_negative(header[4], "model.header")?;

        let mins = read_f64_array(&mut reader, "model.mins")?;
        let maxs = read_f64_array(&mut reader, "model.maxs")?;
        let antecedents = read_i32_array(&mut reader, "model.antecedents")?;
        let classes = read_i32_array(&mut reader, "model.classes")?;
        let weights = read_f64_array(&mut reader, "model.weights")?;
        reader.ensure_consumed("model")?;

        expect_len(mins.len(), n_inputs, "model.mins")?;
        expect_len(maxs.len(), n_inputs, "model.maxs")?;
        expect_len(antecedents.len(), n_rules * n_inputs, "model.antecedents")?;
        expect_len(classes.len(), n_rules, "model.classes")?;
        expect_len(weights.len(), n_rules, "model.weights")?;

        let ranges = mins.into_iter().zip(maxs).collect();
        let rules = (0..n_rules)
            .map(|i| FuzzyRule {
                antecedent: antecedents[i * n_inputs..(i + 1) * n_inputs].to_vec(),
                class: classes[i],
                weight: weights[i],
            })
            .collect();

        Self::new(ranges, n_labels, inference, rules)
    }
}

impl Classifier for FuzzyRuleBase {
    fn classify(&self, instance: &Instance) -> f64 {
        match self.inference {
            InferenceKind::WinningRule => {
                let mut best_class = NO_PREDICTION;
                let mut best_degree = 0.0;
                for rule in &self.rules {
                    let degree = self.matching_degree(rule, instance) * rule.weight;
                    if degree > best_degree {
                        best_degree = degree;
                        best_class = rule.class as f64;
                    }
                }
                best_class
            }
            InferenceKind::AdditiveCombination => {
                // 按类别下标有序累加，平局时取下标较小者
                let mut sums: BTreeMap<i32, f64> = BTreeMap::new();
                for rule in &self.rules {
                    *sums.entry(rule.class).or_insert(0.0) +=
                        self.matching_degree(rule, instance) * rule.weight;
                }
                let mut best_class = NO_PREDICTION;
                let mut best_sum = 0.0;
                for (&class, &sum) in &sums {
                    if sum > best_sum {
                        best_sum = sum;
                        best_class = class as f64;
                    }
                }
                best_class
            }
        }
    }

    fn input_count(&self) -> usize {
        self.ranges.len()
    }

    fn class_count(&self) -> usize {
        self.n_classes
    }
}

fn read_header(reader: &mut ByteReader<'_>) -> AppResult<Vec<i32>> {
    let header = read_i32_array(reader, "model.header")?;
    if header.len() != 5 {
        return Err(JobError::malformed_artifact(
            "model.header",
            format!("头部应有 5 个字段, 实际 {}", header.len()),
        ));
    }
    Ok(header)
}

fn non_negative(value: i32, field: &'static str) -> AppResult<usize> {
    usize::try_from(value).map_err(|_| JobError::malformed_artifact(field, format!("负数 {}", value)))
}

fn expect_len(actual: usize, expected: usize, field: &'static str) -> AppResult<()> {
    if actual != expected {
        return Err(JobError::malformed_artifact(
            field,
            format!("期望 {} 个元素, 实际 {}", expected, actual),
        ));
    }
    Ok(())
}

/// 按头部的模型族解码
pub fn decode_model(bytes: &[u8]) -> AppResult<Arc<dyn Classifier>> {
    let header = read_header(&mut ByteReader::new(bytes))?;
    match ModelFamily::from_code(header[0]) {
        Some(ModelFamily::FuzzyRuleBase) => Ok(Arc::new(FuzzyRuleBase::from_bytes(bytes)?)),
        None => Err(JobError::malformed_artifact(
            "model.header",
            format!("未知模型族 {}", header[0]),
        )),
    }
}

/// 从本地路径加载模型
pub async fn load_model(path: &Path) -> AppResult<Arc<dyn Classifier>> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| JobError::storage(path.display().to_string(), e))?;
    decode_model(&bytes)
}
