use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::api::{access_token, expire_session, guard_expiry, ResultView};
use crate::ax_state::AppState;
use crate::core::session::Submission;
use crate::error::{AppError, Result};
use crate::models::request::SingleGenerationForm;

pub async fn list_domains(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let token = access_token(&state).await?;
    let domains = guard_expiry(&state, state.client.domains(&token).await).await?;
    Ok(Json(json!({ "domains": domains })))
}

pub async fn generate_single(
    State(state): State<Arc<AppState>>,
    Json(form): Json<SingleGenerationForm>,
) -> Result<Json<ResultView>> {
    let token = access_token(&state).await?;
    let submission = state.session.write().await.begin_single_form(&form)?;
    execute(state, token, submission).await.map(Json)
}

/// 会话里的表作为 tables，约束作为全局约束
pub async fn generate_relational(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ResultView>> {
    let token = access_token(&state).await?;
    let submission = state.session.write().await.begin_relational()?;
    execute(state, token, submission).await.map(Json)
}

pub async fn cancel_generation(State(state): State<Arc<AppState>>) -> Json<Value> {
    let cancelled = state.session.write().await.cancel();
    Json(json!({ "cancelled": cancelled }))
}

pub async fn current_result(State(state): State<Arc<AppState>>) -> Result<Json<ResultView>> {
    let session = state.session.read().await;
    let result = session.result().cloned().ok_or(AppError::NoResult)?;
    Ok(Json(ResultView::new(result, None)))
}

/// 远程调用放到独立任务里，调用方断开也会把结果落回会话
async fn execute(state: Arc<AppState>, token: String, submission: Submission) -> Result<ResultView> {
    let Submission {
        request_id,
        request,
        cancel,
    } = submission;
    let mode = request.mode();
    let worker = state.clone();

    let task = tokio::spawn(async move {
        let outcome = tokio::select! {
            res = worker.client.generate(&token, &request) => Some(res),
            _ = cancel.notified() => None,
        };
        match outcome {
            None => {
                info!("生成任务收到取消信号: request_id={}", request_id);
                Err(AppError::Cancelled)
            }
            Some(Ok(raw)) => {
                let mut session = worker.session.write().await;
                let view = session
                    .complete(request_id, mode, raw)
                    .map(|result| ResultView::new(result.clone(), None));
                view
            }
            Some(Err(AppError::SessionExpired)) => {
                expire_session(&worker).await;
                Err(AppError::SessionExpired)
            }
            Some(Err(err)) => {
                worker.session.write().await.fail(request_id, &err);
                Err(err)
            }
        }
    });

    match task.await {
        Ok(outcome) => outcome,
        Err(join_err) => {
            error!("生成任务异常退出: request_id={}, error={}", request_id, join_err);
            let err = AppError::RemoteRequestFailed(format!("generation task aborted: {}", join_err));
            state.session.write().await.fail(request_id, &err);
            Err(err)
        }
    }
}
