pub mod augment;
pub mod auth;
pub mod builder;
pub mod export;
pub mod generate;
pub mod history;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::warn;

use crate::ax_state::AppState;
use crate::error::{AppError, Result};
use crate::models::request::GenerationMode;
use crate::models::result::{GeneratedResult, Notice};

/// 当前展示的数据，附带每张表的表头
#[derive(Debug, Serialize)]
pub struct ResultView {
    pub mode: GenerationMode,
    pub row_count: usize,
    pub headers: IndexMap<String, Vec<String>>,
    pub result: GeneratedResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
}

impl ResultView {
    pub fn new(result: GeneratedResult, notice: Option<Notice>) -> Self {
        Self {
            mode: result.mode(),
            row_count: result.row_count(),
            headers: result.headers(),
            result,
            notice,
        }
    }
}

/// 取当前登录令牌，未登录直接拒绝
pub(crate) async fn access_token(state: &AppState) -> Result<String> {
    state
        .auth
        .read()
        .await
        .token()
        .map(str::to_string)
        .ok_or(AppError::NotAuthenticated)
}

/// 远程返回 401 时强制注销：清掉令牌和整个会话
pub(crate) async fn expire_session(state: &AppState) {
    warn!("登录已过期，清空令牌与会话");
    state.auth.write().await.clear();
    state.session.write().await.reset();
}

pub(crate) async fn guard_expiry<T>(state: &AppState, result: Result<T>) -> Result<T> {
    if matches!(result, Err(AppError::SessionExpired)) {
        expire_session(state).await;
    }
    result
}
