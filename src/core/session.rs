use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::Notify;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::assembler::{
    build_relational_request, build_single_request, normalize_response, parse_rows,
    resolve_history_entry,
};
use crate::core::constraint_builder::{append, remove_at, validate_and_build};
use crate::core::schema_builder::{add_column, add_table, remove_table};
use crate::core::table_graph::{analyze_schema, SchemaReport};
use crate::error::{AppError, Result};
use crate::models::constraint::{Constraint, ConstraintDraft};
use crate::models::request::{GenerationMode, GenerationRequest, SingleGenerationForm};
use crate::models::result::{GeneratedResult, HistoryEntry, Notice, Row};
use crate::models::schema::{Column, ColumnDraft, Table, TableDraft};

/// 请求/结果会话的状态
#[derive(Debug, Serialize, Clone, PartialEq, Default)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Idle,
    Validating,
    Submitted { request_id: Uuid, mode: GenerationMode },
    Displayed,
    Rejected { error: String, message: String },
}

/// 一次已通过校验、等待远程执行的提交
#[derive(Debug)]
pub struct Submission {
    pub request_id: Uuid,
    pub request: GenerationRequest,
    pub cancel: Arc<Notify>,
}

/// 请求构建会话，只通过整体替换来修改列表
#[derive(Debug, Default)]
pub struct GenerationSession {
    phase: SessionPhase,
    constraints: Vec<Constraint>,
    draft_columns: Vec<Column>,
    tables: Vec<Table>,
    result: Option<GeneratedResult>,
    in_flight: Option<(Uuid, Arc<Notify>)>,
}

#[derive(Debug, Serialize)]
pub struct SessionSnapshot<'a> {
    pub phase: &'a SessionPhase,
    pub constraints: &'a [Constraint],
    pub draft_columns: &'a [Column],
    pub tables: &'a [Table],
    pub result: Option<&'a GeneratedResult>,
}

impl GenerationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn draft_columns(&self) -> &[Column] {
        &self.draft_columns
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn result(&self) -> Option<&GeneratedResult> {
        self.result.as_ref()
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self.phase, SessionPhase::Submitted { .. })
    }

    pub fn snapshot(&self) -> SessionSnapshot<'_> {
        SessionSnapshot {
            phase: &self.phase,
            constraints: &self.constraints,
            draft_columns: &self.draft_columns,
            tables: &self.tables,
            result: self.result.as_ref(),
        }
    }

    /// 任何编辑都会把 Rejected 拉回 Idle
    fn touch(&mut self) {
        if matches!(self.phase, SessionPhase::Rejected { .. }) {
            self.phase = SessionPhase::Idle;
        }
    }

    fn reject(&mut self, err: &AppError) {
        self.phase = SessionPhase::Rejected {
            error: err.kind().to_string(),
            message: err.to_string(),
        };
    }

    pub fn add_constraint(&mut self, draft: &ConstraintDraft) -> Result<&[Constraint]> {
        self.touch();
        let constraint = validate_and_build(draft)?;
        debug!(
            "新增约束: field={}, strategy={:?}, {}",
            constraint.field(),
            constraint.strategy(),
            constraint
        );
        self.constraints = append(&self.constraints, constraint);
        Ok(&self.constraints)
    }

    pub fn remove_constraint(&mut self, index: usize) -> &[Constraint] {
        self.touch();
        self.constraints = remove_at(&self.constraints, index);
        &self.constraints
    }

    pub fn add_column(&mut self, draft: &ColumnDraft) -> Result<&[Column]> {
        self.touch();
        let column = add_column(draft)?;
        let mut next = self.draft_columns.clone();
        next.push(column);
        self.draft_columns = next;
        Ok(&self.draft_columns)
    }

    pub fn remove_column(&mut self, index: usize) -> &[Column] {
        self.touch();
        self.draft_columns = remove_at(&self.draft_columns, index);
        &self.draft_columns
    }

    /// 用待建表中的列生成一张表，成功后清空待建列
    pub fn add_table(&mut self, name: &str, rows: i64) -> Result<&[Table]> {
        self.touch();
        let draft = TableDraft::new(name, rows, self.draft_columns.clone());
        self.tables = add_table(&self.tables, draft)?;
        self.draft_columns.clear();
        Ok(&self.tables)
    }

    pub fn remove_table(&mut self, index: usize) -> &[Table] {
        self.touch();
        self.tables = remove_table(&self.tables, index);
        &self.tables
    }

    pub fn schema_report(&self) -> SchemaReport {
        analyze_schema(&self.tables)
    }

    fn begin(&mut self, build: impl FnOnce(&Self) -> Result<GenerationRequest>) -> Result<Submission> {
        if self.is_submitted() {
            return Err(AppError::RequestInFlight);
        }
        self.phase = SessionPhase::Validating;
        let request = match build(self) {
            Ok(request) => request,
            Err(err) => {
                if err.is_validation() {
                    warn!("生成请求校验失败: {}", err);
                } else {
                    warn!("生成请求无法构建: kind={}, {}", err.kind(), err);
                }
                self.reject(&err);
                return Err(err);
            }
        };

        // 校验通过才清掉旧结果
        self.result = None;
        let request_id = Uuid::new_v4();
        let cancel = Arc::new(Notify::new());
        self.in_flight = Some((request_id, cancel.clone()));
        self.phase = SessionPhase::Submitted {
            request_id,
            mode: request.mode(),
        };
        info!("生成请求已提交: request_id={}, mode={:?}", request_id, request.mode());
        Ok(Submission {
            request_id,
            request,
            cancel,
        })
    }

    /// 表单提交：行数的解析也算作校验的一部分
    pub fn begin_single_form(&mut self, form: &SingleGenerationForm) -> Result<Submission> {
        self.begin(|s| {
            let rows = parse_rows(form.rows.as_deref(), None)?;
            let prompt = form.custom_prompt.as_deref().unwrap_or_default();
            build_single_request(&form.domain, rows, prompt, &s.constraints)
        })
    }

    pub fn begin_single(&mut self, domain: &str, rows: i64, custom_prompt: &str) -> Result<Submission> {
        self.begin(|s| build_single_request(domain, rows, custom_prompt, &s.constraints))
    }

    /// 会话中的约束作为全局约束随关系型请求发送
    pub fn begin_relational(&mut self) -> Result<Submission> {
        let report = self.schema_report();
        if !report.is_clean() {
            warn!(
                "表结构存在提示项: 悬空外键 {}, 重名表 {}, 重名列 {}, 环 {}",
                report.dangling_references.len(),
                report.duplicate_tables.len(),
                report.duplicate_columns.len(),
                report.has_cycle
            );
        }
        self.begin(|s| build_relational_request(&s.tables, &s.constraints))
    }

    fn owns(&self, request_id: Uuid) -> bool {
        matches!(self.in_flight, Some((id, _)) if id == request_id)
    }

    /// 远程返回后落结果；过期的请求 id 直接忽略
    pub fn complete(&mut self, request_id: Uuid, mode: GenerationMode, raw: Value) -> Result<&GeneratedResult> {
        if !self.owns(request_id) {
            debug!("忽略过期的生成结果: request_id={}", request_id);
            return Err(AppError::Cancelled);
        }
        self.in_flight = None;
        match normalize_response(raw, mode) {
            Ok(result) => {
                info!("生成完成: request_id={}, rows={}", request_id, result.row_count());
                self.phase = SessionPhase::Displayed;
                Ok(&*self.result.insert(result))
            }
            Err(err) => {
                self.reject(&err);
                Err(err)
            }
        }
    }

    pub fn fail(&mut self, request_id: Uuid, err: &AppError) {
        if !self.owns(request_id) {
            return;
        }
        self.in_flight = None;
        warn!("生成失败: request_id={}, error={}", request_id, err);
        self.reject(err);
    }

    /// 协作式取消当前在途请求
    pub fn cancel(&mut self) -> bool {
        match self.in_flight.take() {
            Some((request_id, cancel)) => {
                cancel.notify_one();
                info!("生成请求已取消: request_id={}", request_id);
                self.reject(&AppError::Cancelled);
                true
            }
            None => false,
        }
    }

    /// 载入历史条目；失败时保留当前展示的数据
    pub fn load_history(&mut self, entry: &HistoryEntry) -> Result<Option<Notice>> {
        if self.is_submitted() {
            return Err(AppError::RequestInFlight);
        }
        let resolution = resolve_history_entry(entry)?;
        self.result = Some(resolution.result);
        self.phase = SessionPhase::Displayed;
        Ok(resolution.notice)
    }

    /// 增强结果替换当前展示；生成在途时拒绝，避免覆盖 Submitted
    pub fn show_augmented(&mut self, rows: Vec<Row>) -> Result<&GeneratedResult> {
        if self.is_submitted() {
            return Err(AppError::RequestInFlight);
        }
        self.phase = SessionPhase::Displayed;
        Ok(&*self.result.insert(GeneratedResult::Flat { rows }))
    }

    /// 注销或会话过期：取消在途请求并清空所有状态
    pub fn reset(&mut self) {
        if let Some((_, cancel)) = self.in_flight.take() {
            cancel.notify_one();
        }
        *self = Self::default();
    }
}
