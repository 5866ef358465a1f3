use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::models::constraint::Constraint;
use crate::models::request::{GenerationMode, GenerationRequest, RelationalRequest, SingleRequest};
use crate::models::result::{GeneratedResult, HistoryEntry, HistoryResolution, Notice, Row};
use crate::models::schema::Table;

pub const CUSTOM_DOMAIN: &str = "Custom";
pub const RELATIONAL_DOMAIN: &str = "Relational";

/// 关系型历史只有预览时（服务端给的是首表首行），放在这个表名下展示
pub const PREVIEW_TABLE: &str = "preview";

/// 表单里的行数，可以是数字也可以是字符串；缺省时退回 `default`
pub fn parse_rows(raw: Option<&str>, default: Option<i64>) -> Result<i64> {
    match raw.map(str::trim) {
        None => default.ok_or_else(|| AppError::missing("rows")),
        Some(s) => s.parse::<i64>().map_err(|_| {
            AppError::InvalidRange(format!("rows must be a whole number, got '{}'", s))
        }),
    }
}

/// 组装单表生成请求；只有 Custom 领域才携带自定义提示词
pub fn build_single_request(
    domain: &str,
    rows: i64,
    custom_prompt: &str,
    constraints: &[Constraint],
) -> Result<GenerationRequest> {
    let domain = domain.trim();
    if domain.is_empty() {
        return Err(AppError::missing("domain"));
    }
    let is_custom = domain == CUSTOM_DOMAIN;
    if is_custom && custom_prompt.trim().is_empty() {
        return Err(AppError::missing("custom_prompt"));
    }
    if rows < 1 {
        return Err(AppError::InvalidRange(format!("rows must be at least 1, got {}", rows)));
    }
    let rows = u32::try_from(rows)
        .map_err(|_| AppError::InvalidRange(format!("rows too large: {}", rows)))?;

    Ok(GenerationRequest::Single(SingleRequest {
        domain: domain.to_string(),
        rows,
        custom_prompt: is_custom.then(|| custom_prompt.to_string()),
        constraints: constraints.to_vec(),
    }))
}

pub fn build_relational_request(
    tables: &[Table],
    global_constraints: &[Constraint],
) -> Result<GenerationRequest> {
    if tables.is_empty() {
        return Err(AppError::EmptyTableSet);
    }
    Ok(GenerationRequest::Relational(RelationalRequest {
        tables: tables.to_vec(),
        global_constraints: global_constraints.to_vec(),
    }))
}

fn into_rows(raw: Value, context: &str) -> std::result::Result<Vec<Row>, String> {
    let Value::Array(items) = raw else {
        return Err(format!("{} is not a row sequence", context));
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(row) => Ok(row),
            other => Err(format!("{} row {} is not an object: {}", context, i, other)),
        })
        .collect()
}

fn into_tables(raw: Value) -> std::result::Result<IndexMap<String, Vec<Row>>, String> {
    let Value::Object(map) = raw else {
        return Err("relational data is not a table mapping".to_string());
    };
    // 零行的表保留，展示为空表
    map.into_iter()
        .map(|(name, rows)| {
            let rows = into_rows(rows, &format!("table '{}'", name))?;
            Ok((name, rows))
        })
        .collect()
}

/// 把远程返回的 `data` 按生成模式归一化
pub fn normalize_response(raw: Value, mode: GenerationMode) -> Result<GeneratedResult> {
    let result = match mode {
        GenerationMode::Relational => into_tables(raw).map(|tables| GeneratedResult::Relational { tables }),
        GenerationMode::Single => into_rows(raw, "data").map(|rows| GeneratedResult::Flat { rows }),
    };
    result.map_err(AppError::MalformedResponse)
}

/// `data_json` 的空值哨兵
fn is_absent_sentinel(raw: &str) -> bool {
    matches!(raw.trim(), "" | "null" | "undefined")
}

fn is_empty_data(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// 解析历史条目：优先用完整数据，否则退回预览并给出提示
pub fn resolve_history_entry(entry: &HistoryEntry) -> Result<HistoryResolution> {
    let full = match &entry.data_json {
        None | Some(Value::Null) => None,
        Some(Value::String(raw)) if is_absent_sentinel(raw) => None,
        Some(Value::String(raw)) => Some(
            serde_json::from_str::<Value>(raw)
                .map_err(|e| AppError::MalformedHistoryData(e.to_string()))?,
        ),
        Some(decoded) => Some(decoded.clone()),
    };

    let (data, notice) = match full {
        Some(data) => (data, None),
        None => {
            warn!("历史记录 {} 只有预览数据", entry.id);
            (
                entry.preview.clone().unwrap_or(Value::Null),
                Some(Notice::PartialDataWarning),
            )
        }
    };

    if is_empty_data(&data) {
        return Err(AppError::EmptyHistoryData);
    }

    let result = if entry.domain == RELATIONAL_DOMAIN {
        match data {
            Value::Array(_) => {
                let rows = into_rows(data, PREVIEW_TABLE).map_err(AppError::MalformedHistoryData)?;
                let mut tables = IndexMap::new();
                tables.insert(PREVIEW_TABLE.to_string(), rows);
                GeneratedResult::Relational { tables }
            }
            other => GeneratedResult::Relational {
                tables: into_tables(other).map_err(AppError::MalformedHistoryData)?,
            },
        }
    } else {
        GeneratedResult::Flat {
            rows: into_rows(data, "history data").map_err(AppError::MalformedHistoryData)?,
        }
    };

    debug!("历史记录 {} 解析完成，共 {} 行", entry.id, result.row_count());
    Ok(HistoryResolution { result, notice })
}
