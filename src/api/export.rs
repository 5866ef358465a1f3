use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::api::{access_token, guard_expiry};
use crate::ax_state::AppState;
use crate::error::{AppError, Result};
use crate::models::export::{ExportFormat, ExportPayload, ExportQuery, ExportedFile};

fn parse_format(raw: &str) -> Result<ExportFormat> {
    ExportFormat::parse(raw).ok_or_else(|| AppError::UnsupportedExportFormat(raw.to_string()))
}

fn file_response(file: ExportedFile) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", file.filename);
    (
        [
            (header::CONTENT_TYPE, file.content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response()
}

/// 导出当前展示的数据，关系型结果整体上报
pub async fn export_result(
    State(state): State<Arc<AppState>>,
    Path(format): Path<String>,
) -> Result<Response> {
    let format = parse_format(&format)?;
    let payload = {
        let session = state.session.read().await;
        let result = session.result().ok_or(AppError::NoResult)?;
        ExportPayload {
            data: result.to_value(),
            domain: result.export_domain().to_string(),
        }
    };
    let token = access_token(&state).await?;
    let file = guard_expiry(&state, state.client.export(&token, format, &payload).await).await?;
    Ok(file_response(file))
}

pub async fn export_by_query(
    State(state): State<Arc<AppState>>,
    Path(format): Path<String>,
    Query(query): Query<ExportQuery>,
) -> Result<Response> {
    let format = parse_format(&format)?;
    if query.domain.trim().is_empty() {
        return Err(AppError::missing("domain"));
    }
    let token = access_token(&state).await?;
    let file = guard_expiry(&state, state.client.export_by_query(&token, format, &query).await)
        .await?;
    Ok(file_response(file))
}
