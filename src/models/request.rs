use serde::{Deserialize, Serialize};

use super::constraint::Constraint;
use super::form::lenient_text;
use super::schema::Table;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    Single,
    Relational,
}

/// 单表生成请求，对应远程 `/generate`
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SingleRequest {
    pub domain: String,
    pub rows: u32,
    pub custom_prompt: Option<String>,
    pub constraints: Vec<Constraint>,
}

/// 关系型生成请求，对应远程 `/generate/relational`
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RelationalRequest {
    pub tables: Vec<Table>,
    pub global_constraints: Vec<Constraint>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum GenerationRequest {
    Single(SingleRequest),
    Relational(RelationalRequest),
}

impl GenerationRequest {
    pub fn mode(&self) -> GenerationMode {
        match self {
            GenerationRequest::Single(_) => GenerationMode::Single,
            GenerationRequest::Relational(_) => GenerationMode::Relational,
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            GenerationRequest::Single(_) => "/generate",
            GenerationRequest::Relational(_) => "/generate/relational",
        }
    }

    pub fn constraints(&self) -> &[Constraint] {
        match self {
            GenerationRequest::Single(r) => &r.constraints,
            GenerationRequest::Relational(r) => &r.global_constraints,
        }
    }
}

/// 浏览器提交单表生成时的表单
#[derive(Debug, Deserialize, Clone)]
pub struct SingleGenerationForm {
    #[serde(default)]
    pub domain: String,
    /// 数字或数字字符串，解析在会话校验时进行
    #[serde(default, deserialize_with = "lenient_text")]
    pub rows: Option<String>,
    #[serde(default)]
    pub custom_prompt: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DomainList {
    pub domains: Vec<String>,
}
