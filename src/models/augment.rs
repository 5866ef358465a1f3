use serde::{Deserialize, Serialize};

use super::form::lenient_text;
use super::result::Row;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AugmentationStrategy {
    TargetPercentage,
    BalanceCategories,
    OversampleValue,
}

impl AugmentationStrategy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "target_percentage" => Some(Self::TargetPercentage),
            "balance_categories" => Some(Self::BalanceCategories),
            "oversample_value" => Some(Self::OversampleValue),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AugmentationRule {
    pub field: String,
    pub strategy: AugmentationStrategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_count: Option<u64>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AugmentationRuleDraft {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub strategy: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub target_percentage: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub target_count: Option<String>,
}

/// 增强的数据来源：直接给数据，或者引用历史记录
#[derive(Debug, Serialize, Clone, PartialEq)]
pub enum AugmentSource {
    #[serde(rename = "data")]
    Data(Vec<Row>),
    #[serde(rename = "history_id")]
    History(i64),
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct AugmentRequest {
    pub rules: Vec<AugmentationRule>,
    #[serde(flatten)]
    pub source: AugmentSource,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AugmentForm {
    #[serde(default)]
    pub rules: Vec<AugmentationRuleDraft>,
    #[serde(default)]
    pub history_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AugmentResponse {
    pub augmented_data: Vec<Row>,
    #[serde(default)]
    pub original_count: usize,
    #[serde(default)]
    pub augmented_count: usize,
    #[serde(default)]
    pub message: String,
}
