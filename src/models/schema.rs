use serde::{Deserialize, Serialize};

use super::form::{lenient_flag, lenient_text};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ColumnDataType {
    String,
    Integer,
    Float,
    Boolean,
    Date,
    Datetime,
}

impl ColumnDataType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "string" => Some(Self::String),
            "integer" => Some(Self::Integer),
            "float" => Some(Self::Float),
            "boolean" => Some(Self::Boolean),
            "date" => Some(Self::Date),
            "datetime" => Some(Self::Datetime),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data_type: ColumnDataType,
    pub description: Option<String>,
    pub is_primary_key: bool,
    pub is_foreign_key: bool,
    pub references_table: Option<String>,
    pub references_column: Option<String>,
    pub unique: bool,
}

impl Column {
    /// 外键指向 (表, 列)
    pub fn reference(&self) -> Option<(&str, &str)> {
        if !self.is_foreign_key {
            return None;
        }
        match (&self.references_table, &self.references_column) {
            (Some(t), Some(c)) => Some((t.as_str(), c.as_str())),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub rows: u32,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// 列构建器草稿
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ColumnDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub data_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub is_primary_key: bool,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub is_foreign_key: bool,
    #[serde(default, deserialize_with = "lenient_text")]
    pub references_table: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub references_column: Option<String>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub unique: bool,
}

impl ColumnDraft {
    pub fn new(name: &str, data_type: &str) -> Self {
        Self {
            name: name.to_string(),
            data_type: Some(data_type.to_string()),
            ..Self::default()
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub fn references(mut self, table: &str, column: &str) -> Self {
        self.is_foreign_key = true;
        self.references_table = Some(table.to_string());
        self.references_column = Some(column.to_string());
        self
    }
}

fn default_table_rows() -> i64 {
    5
}

/// 表构建器草稿，列来自会话中的"待建表"
#[derive(Debug, Deserialize, Clone)]
pub struct TableDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_table_rows")]
    pub rows: i64,
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl TableDraft {
    pub fn new(name: &str, rows: i64, columns: Vec<Column>) -> Self {
        Self {
            name: name.to_string(),
            rows,
            columns,
        }
    }
}
