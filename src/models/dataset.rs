//! 数据集描述
//!
//! 描述每个属性的类型与取值范围，以及类别标签名称。
//! worker 在 setup 时从广播副本加载一次，之后不再修改。

use crate::error::{AppResult, JobError};
use crate::models::instance::{Instance, UNKNOWN_LABEL};
use serde::{Deserialize, Serialize};

/// 属性类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    /// 数值属性，需要 `min`/`max`
    Numeric,
    /// 类别属性，取值为 `values` 中的下标
    Categorical,
    /// 转换时忽略的列
    Ignored,
    /// 类别标签列
    Label,
}

/// 单个属性的描述
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub kind: AttributeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DatasetDoc {
    labels: Vec<String>,
    attributes: Vec<Attribute>,
}

/// 已校验的数据集描述
#[derive(Debug, Clone)]
pub struct Dataset {
    labels: Vec<String>,
    attributes: Vec<Attribute>,
}

impl Dataset {
    /// 从 TOML 文本解析并校验
    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        let doc: DatasetDoc = toml::from_str(content)?;
        Self::new(doc.labels, doc.attributes)
    }

    pub fn new(labels: Vec<String>, attributes: Vec<Attribute>) -> AppResult<Self> {
        if labels.is_empty() {
            return Err(JobError::Schema("labels 不能为空".to_string()));
        }

        let label_columns = attributes
            .iter()
            .filter(|a| a.kind == AttributeKind::Label)
            .count();
        if label_columns != 1 {
            return Err(JobError::Schema(format!(
                "必须恰好有一个 label 属性, 实际 {} 个",
                label_columns
            )));
        }

        for attr in &attributes {
            match attr.kind {
                AttributeKind::Numeric => match (attr.min, attr.max) {
                    (Some(min), Some(max)) if min <= max => {}
                    (Some(_), Some(_)) => {
                        return Err(JobError::Schema(format!("属性 {} 的 min 大于 max", attr.name)))
                    }
                    _ => {
                        return Err(JobError::Schema(format!(
                            "数值属性 {} 缺少 min/max",
                            attr.name
                        )))
                    }
                },
                AttributeKind::Categorical if attr.values.is_empty() => {
                    return Err(JobError::Schema(format!("类别属性 {} 缺少 values", attr.name)));
                }
                _ => {}
            }
        }

        Ok(Self { labels, attributes })
    }

    /// 类别数量
    pub fn class_count(&self) -> usize {
        self.labels.len()
    }

    /// 列数（包含标签列与忽略列）
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    /// 参与推理的输入属性数量
    pub fn input_count(&self) -> usize {
        self.inputs().count()
    }

    pub fn label_names(&self) -> &[String] {
        &self.labels
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// 每个输入属性的 (min, max)；类别属性为 (0, 取值数 - 1)
    pub fn attribute_ranges(&self) -> Vec<(f64, f64)> {
        self.inputs()
            .map(|attr| match attr.kind {
                AttributeKind::Categorical => (0.0, (attr.values.len() - 1) as f64),
                _ => (attr.min.unwrap_or(0.0), attr.max.unwrap_or(0.0)),
            })
            .collect()
    }

    /// 标签名对应的下标
    pub fn label_index(&self, name: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == name)
    }

    /// 记录的真实标签；未标注时为 [`UNKNOWN_LABEL`]
    pub fn label_of(&self, instance: &Instance) -> f64 {
        instance.label.unwrap_or(UNKNOWN_LABEL)
    }

    fn inputs(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes
            .iter()
            .filter(|a| matches!(a.kind, AttributeKind::Numeric | AttributeKind::Categorical))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const IRIS_TOML: &str = r#"
labels = ["setosa", "versicolor"]

[[attributes]]
name = "id"
kind = "ignored"

[[attributes]]
name = "petal_length"
kind = "numeric"
min = 1.0
max = 5.0

[[attributes]]
name = "color"
kind = "categorical"
values = ["white", "blue", "purple"]

[[attributes]]
name = "class"
kind = "label"
"#;

    #[test]
    fn parses_schema_counts() {
        let dataset = Dataset::from_toml_str(IRIS_TOML).unwrap();
        assert_eq!(dataset.class_count(), 2);
        assert_eq!(dataset.attribute_count(), 4);
        assert_eq!(dataset.input_count(), 2);
        assert_eq!(dataset.attribute_ranges(), vec![(1.0, 5.0), (0.0, 2.0)]);
        assert_eq!(dataset.label_index("versicolor"), Some(1));
    }

    #[test]
    fn label_of_unlabeled_record_is_unknown() {
        let dataset = Dataset::from_toml_str(IRIS_TOML).unwrap();
        let labeled = Instance {
            values: vec![1.0, 0.0],
            label: Some(1.0),
        };
        let unlabeled = Instance {
            values: vec![1.0, 0.0],
            label: None,
        };
        assert_eq!(dataset.label_of(&labeled), 1.0);
        assert_eq!(dataset.label_of(&unlabeled), UNKNOWN_LABEL);
    }

    #[test]
    fn rejects_missing_label_column() {
        let toml = r#"
labels = ["a"]
[[attributes]]
name = "x"
kind = "numeric"
min = 0.0
max = 1.0
"#;
        assert!(matches!(Dataset::from_toml_str(toml), Err(JobError::Schema(_))));
    }

    #[test]
    fn rejects_inverted_range() {
        let toml = r#"
labels = ["a"]
[[attributes]]
name = "x"
kind = "numeric"
min = 2.0
max = 1.0
[[attributes]]
name = "y"
kind = "label"
"#;
        let err = Dataset::from_toml_str(toml).unwrap_err();
        assert!(err.to_string().contains("min"));
    }

    #[test]
    fn rejects_unknown_kind() {
        let toml = r#"
labels = ["a"]
[[attributes]]
name = "x"
kind = "date"
"#;
        assert!(Dataset::from_toml_str(toml).is_err());
    }
}
