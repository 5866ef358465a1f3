use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::request::GenerationMode;

/// 平表结果在表头映射里使用的键
pub const FLAT_TABLE_KEY: &str = "data";

/// 生成结果的一行，保持服务端返回的列顺序
pub type Row = Map<String, Value>;

/// 归一化后的生成结果，两种形态互斥
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeneratedResult {
    Flat { rows: Vec<Row> },
    Relational { tables: IndexMap<String, Vec<Row>> },
}

impl GeneratedResult {
    pub fn mode(&self) -> GenerationMode {
        match self {
            GeneratedResult::Flat { .. } => GenerationMode::Single,
            GeneratedResult::Relational { .. } => GenerationMode::Relational,
        }
    }

    pub fn row_count(&self) -> usize {
        match self {
            GeneratedResult::Flat { rows } => rows.len(),
            GeneratedResult::Relational { tables } => tables.values().map(Vec::len).sum(),
        }
    }

    /// 导出时上报的 domain 标签
    pub fn export_domain(&self) -> &'static str {
        match self {
            GeneratedResult::Flat { .. } => "Generated",
            GeneratedResult::Relational { .. } => "Relational",
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            GeneratedResult::Flat { rows } => {
                Value::Array(rows.iter().cloned().map(Value::Object).collect())
            }
            GeneratedResult::Relational { tables } => Value::Object(
                tables
                    .iter()
                    .map(|(name, rows)| {
                        let rows = rows.iter().cloned().map(Value::Object).collect();
                        (name.clone(), Value::Array(rows))
                    })
                    .collect(),
            ),
        }
    }

    /// 关系型结果按表顺序拼接成一张平表（增强接口只接受平表）
    pub fn flatten_rows(&self) -> Vec<Row> {
        match self {
            GeneratedResult::Flat { rows } => rows.clone(),
            GeneratedResult::Relational { tables } => tables.values().flatten().cloned().collect(),
        }
    }

    /// 表头取首行的键
    pub fn headers(&self) -> IndexMap<String, Vec<String>> {
        fn keys(rows: &[Row]) -> Vec<String> {
            rows.first().map(|r| r.keys().cloned().collect()).unwrap_or_default()
        }
        match self {
            GeneratedResult::Flat { rows } => {
                let mut out = IndexMap::new();
                out.insert(FLAT_TABLE_KEY.to_string(), keys(rows));
                out
            }
            GeneratedResult::Relational { tables } => tables
                .iter()
                .map(|(name, rows)| (name.clone(), keys(rows)))
                .collect(),
        }
    }
}

/// 历史记录条目
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HistoryEntry {
    pub id: i64,
    pub domain: String,
    #[serde(default)]
    pub rows_generated: i64,
    #[serde(default)]
    pub custom_prompt: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    /// 可能是 JSON 字符串，也可能已经是解码后的值
    #[serde(default)]
    pub data_json: Option<Value>,
    #[serde(default)]
    pub preview: Option<Value>,
}

impl HistoryEntry {
    pub fn created_at(&self) -> Option<chrono::NaiveDateTime> {
        let raw = self.created_at.as_deref()?;
        chrono::DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.naive_utc())
            .or_else(|_| chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
            .ok()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HistoryList {
    pub history: Vec<HistoryEntry>,
}

/// 非致命提示
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    /// 只有预览数据可用
    PartialDataWarning,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct HistoryResolution {
    pub result: GeneratedResult,
    pub notice: Option<Notice>,
}
