use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::Value;

use crate::models::export::ExportFormat;

fn filename_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)filename\s*=\s*(?:"([^"]+)"|([^;\s]+))"#).expect("static regex")
    })
}

/// 从 Content-Disposition 里取文件名，兼容带引号和不带引号两种写法
pub fn filename_from_disposition(header: &str) -> Option<String> {
    let caps = filename_regex().captures(header)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().trim().to_string())
        .filter(|name| !name.is_empty())
}

/// 服务端没给文件名时的兜底：dataset_<domain>_<时间戳>.<扩展名>
pub fn fallback_filename(domain: &str, format: ExportFormat, now: DateTime<Utc>) -> String {
    format!(
        "dataset_{}_{}.{}",
        domain,
        now.format("%Y-%m-%dT%H-%M-%S"),
        format.extension()
    )
}

/// 从错误响应体中提取 `detail`，否则截断原文
pub fn error_detail(body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        match map.get("detail") {
            Some(Value::String(s)) => return s.clone(),
            Some(other) => return other.to_string(),
            None => {}
        }
    }
    if body.chars().count() > 500 {
        let cut: String = body.chars().take(500).collect();
        format!("{}... (truncated)", cut)
    } else {
        body.to_string()
    }
}
