use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::ax_state::AppState;
use crate::core::assembler::parse_rows;
use crate::error::Result;
use crate::models::constraint::ConstraintDraft;
use crate::models::form::lenient_text;
use crate::models::schema::ColumnDraft;

// --- 会话快照 ---

pub async fn get_session(State(state): State<Arc<AppState>>) -> Response {
    let session = state.session.read().await;
    Json(session.snapshot()).into_response()
}

// --- 约束列表 ---

pub async fn add_constraint(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<ConstraintDraft>,
) -> Result<Response> {
    let mut session = state.session.write().await;
    let constraints = session.add_constraint(&draft)?;
    Ok(Json(constraints).into_response())
}

/// 越界下标不报错，原样返回列表
pub async fn remove_constraint(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Response {
    let mut session = state.session.write().await;
    Json(session.remove_constraint(index)).into_response()
}

// --- 表构建器 ---

pub async fn add_column(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<ColumnDraft>,
) -> Result<Response> {
    let mut session = state.session.write().await;
    let columns = session.add_column(&draft)?;
    Ok(Json(columns).into_response())
}

pub async fn remove_column(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Response {
    let mut session = state.session.write().await;
    Json(session.remove_column(index)).into_response()
}

const DEFAULT_TABLE_ROWS: i64 = 5;

#[derive(Debug, Deserialize)]
pub struct NewTableForm {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub rows: Option<String>,
}

/// 把待建列收拢成一张表
pub async fn add_table(
    State(state): State<Arc<AppState>>,
    Json(form): Json<NewTableForm>,
) -> Result<Response> {
    let rows = parse_rows(form.rows.as_deref(), Some(DEFAULT_TABLE_ROWS))?;
    let mut session = state.session.write().await;
    let tables = session.add_table(&form.name, rows)?;
    Ok(Json(tables).into_response())
}

pub async fn remove_table(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Response {
    let mut session = state.session.write().await;
    Json(session.remove_table(index)).into_response()
}

pub async fn schema_graph(State(state): State<Arc<AppState>>) -> Response {
    let session = state.session.read().await;
    Json(session.schema_report()).into_response()
}
