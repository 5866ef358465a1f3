use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::api::{access_token, guard_expiry, ResultView};
use crate::ax_state::AppState;
use crate::error::{AppError, Result};

pub async fn list_history(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let token = access_token(&state).await?;
    let mut history = guard_expiry(&state, state.client.history(&token).await).await?;
    // 新的在前；时间解析不了的排到最后
    history.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    Ok(Json(json!({ "history": history })))
}

/// 按 id 取历史条目并展示；解析失败时保留当前数据
pub async fn load_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ResultView>> {
    let token = access_token(&state).await?;
    let history = guard_expiry(&state, state.client.history(&token).await).await?;
    let entry = history
        .into_iter()
        .find(|e| e.id == id)
        .ok_or(AppError::HistoryEntryNotFound(id))?;

    let mut session = state.session.write().await;
    let notice = session.load_history(&entry).inspect_err(|e| {
        warn!("历史记录载入失败: id={}, error={}", id, e);
    })?;
    let result = session.result().cloned().ok_or(AppError::NoResult)?;
    info!("已载入历史记录: id={}, domain={}, rows={}", id, entry.domain, result.row_count());
    Ok(Json(ResultView::new(result, notice)))
}
