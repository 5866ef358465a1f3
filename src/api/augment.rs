use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::info;

use crate::api::{access_token, guard_expiry, ResultView};
use crate::ax_state::AppState;
use crate::core::augment::{build_augment_request, validate_rule};
use crate::error::{AppError, Result};
use crate::models::augment::AugmentForm;

#[derive(Debug, Serialize)]
pub struct AugmentOutcome {
    pub original_count: usize,
    pub augmented_count: usize,
    pub message: String,
    #[serde(flatten)]
    pub view: ResultView,
}

/// 对当前数据（或指定历史记录）做增强，结果替换当前展示
pub async fn augment(
    State(state): State<Arc<AppState>>,
    Json(form): Json<AugmentForm>,
) -> Result<Json<AugmentOutcome>> {
    let rules = form
        .rules
        .iter()
        .map(validate_rule)
        .collect::<Result<Vec<_>>>()?;

    let data = {
        let session = state.session.read().await;
        if session.is_submitted() {
            return Err(AppError::RequestInFlight);
        }
        match form.history_id {
            Some(_) => None,
            None => session.result().map(|r| r.flatten_rows()),
        }
    };
    let request = build_augment_request(rules, data, form.history_id)?;

    let token = access_token(&state).await?;
    let response = guard_expiry(&state, state.client.augment(&token, &request).await).await?;
    info!(
        "数据增强完成: original={}, augmented={}",
        response.original_count, response.augmented_count
    );

    // 远程调用期间可能已经开始了新的生成，落结果时在写锁下再检查一次
    let result = state
        .session
        .write()
        .await
        .show_augmented(response.augmented_data)?
        .clone();
    Ok(Json(AugmentOutcome {
        original_count: response.original_count,
        augmented_count: response.augmented_count,
        message: response.message,
        view: ResultView::new(result, None),
    }))
}
