//! 结果矩阵与混淆矩阵

use crate::models::rule_base::NO_PREDICTION;

/// 所有分区的 (真实标签, 预测标签) 序列
///
/// 跨分区没有顺序保证，但每条数据行恰好出现一次。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultMatrix {
    rows: Vec<(f64, f64)>,
}

impl ResultMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, actual: f64, predicted: f64) {
        self.rows.push((actual, predicted));
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn as_slice(&self) -> &[(f64, f64)] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &(f64, f64)> {
        self.rows.iter()
    }
}

/// 由结果矩阵构建的混淆矩阵
///
/// 行为真实类别，列为预测类别。真实标签未知或预测为
/// [`NO_PREDICTION`]/越界的行计入 `unclassified`。
#[derive(Debug, Clone, PartialEq)]
pub struct ConfusionMatrix {
    counts: Vec<Vec<usize>>,
    unclassified: usize,
}

impl ConfusionMatrix {
    pub fn from_results(results: &ResultMatrix, class_count: usize) -> Self {
        let mut counts = vec![vec![0; class_count]; class_count];
        let mut unclassified = 0;

        for &(actual, predicted) in results.iter() {
            match (class_index(actual, class_count), class_index(predicted, class_count)) {
                (Some(a), Some(p)) => counts[a][p] += 1,
                _ => unclassified += 1,
            }
        }

        Self {
            counts,
            unclassified,
        }
    }

    pub fn count(&self, actual: usize, predicted: usize) -> usize {
        self.counts
            .get(actual)
            .and_then(|row| row.get(predicted))
            .copied()
            .unwrap_or(0)
    }

    /// 对角线之和
    pub fn correct(&self) -> usize {
        (0..self.counts.len()).map(|i| self.counts[i][i]).sum()
    }

    /// 已归类的行数
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn unclassified(&self) -> usize {
        self.unclassified
    }

    /// 准确率；未归类的行按错误计
    pub fn accuracy(&self) -> f64 {
        let all = self.total() + self.unclassified;
        if all == 0 {
            return 0.0;
        }
        self.correct() as f64 / all as f64
    }
}

fn class_index(value: f64, class_count: usize) -> Option<usize> {
    if value == NO_PREDICTION || value < 0.0 || value.fract() != 0.0 {
        return None;
    }
    let index = value as usize;
    (index < class_count).then_some(index)
}
