use serde::{Deserialize, Serialize};
use std::fmt;

use super::form::lenient_text;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintStrategy {
    PercentageDistribution,
    ExactValue,
    Range,
}

impl ConstraintStrategy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "percentage_distribution" | "PercentageDistribution" => Some(Self::PercentageDistribution),
            "exact_value" | "ExactValue" => Some(Self::ExactValue),
            "range" | "Range" => Some(Self::Range),
            _ => None,
        }
    }
}

/// 精确值约束推断出的值类型
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum ExactValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for ExactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExactValue::Boolean(b) => write!(f, "{}", b),
            ExactValue::Integer(n) => write!(f, "{}", n),
            ExactValue::Float(n) => write!(f, "{}", n),
            ExactValue::Text(s) => f.write_str(s),
        }
    }
}

/// 已通过校验的字段约束，线上格式按 strategy 打标签
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum Constraint {
    PercentageDistribution {
        field: String,
        value: String,
        percentage: f64,
    },
    ExactValue {
        field: String,
        value: ExactValue,
    },
    Range {
        field: String,
        min_value: Option<f64>,
        max_value: Option<f64>,
    },
}

impl Constraint {
    pub fn field(&self) -> &str {
        match self {
            Constraint::PercentageDistribution { field, .. }
            | Constraint::ExactValue { field, .. }
            | Constraint::Range { field, .. } => field,
        }
    }

    pub fn strategy(&self) -> ConstraintStrategy {
        match self {
            Constraint::PercentageDistribution { .. } => ConstraintStrategy::PercentageDistribution,
            Constraint::ExactValue { .. } => ConstraintStrategy::ExactValue,
            Constraint::Range { .. } => ConstraintStrategy::Range,
        }
    }
}

fn bound(v: Option<f64>) -> String {
    v.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string())
}

// 与约束列表中的展示文案一致
impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::PercentageDistribution { field, value, percentage } => {
                write!(f, "{}: {}% of '{}'", field, percentage, value)
            }
            Constraint::ExactValue { field, value } => {
                write!(f, "{}: Exact Value '{}'", field, value)
            }
            Constraint::Range { field, min_value, max_value } => {
                write!(f, "{}: Range [{}, {}]", field, bound(*min_value), bound(*max_value))
            }
        }
    }
}

/// 约束构建器里尚未校验的草稿，字段保持表单原样
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConstraintDraft {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub strategy: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub percentage: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub min_value: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub max_value: Option<String>,
}

impl ConstraintDraft {
    pub fn new(field: &str, strategy: &str) -> Self {
        Self {
            field: field.to_string(),
            strategy: strategy.to_string(),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }

    pub fn with_percentage(mut self, percentage: &str) -> Self {
        self.percentage = Some(percentage.to_string());
        self
    }

    pub fn with_bounds(mut self, min: Option<&str>, max: Option<&str>) -> Self {
        self.min_value = min.map(str::to_string);
        self.max_value = max.map(str::to_string);
        self
    }
}
