use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::info;

use crate::api::{access_token, guard_expiry};
use crate::ax_state::AppState;
use crate::error::Result;
use crate::models::auth::{
    ForgotPasswordRequest, LoginRequest, MessageResponse, RegisterRequest, ResetPasswordRequest,
    UserProfile,
};

/// 登录成功后令牌只保存在网关进程内，不回传给浏览器
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>> {
    let token = state.client.login(&payload).await?;
    state.auth.write().await.set(token.access_token);
    info!("用户登录成功: username={}", payload.username);
    Ok(Json(json!({
        "authenticated": true,
        "token_type": token.token_type,
    })))
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<UserProfile>> {
    let user = state.client.register(&payload).await?;
    info!("注册成功: username={}", user.username);
    Ok(Json(user))
}

pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>> {
    Ok(Json(state.client.forgot_password(&payload).await?))
}

pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>> {
    Ok(Json(state.client.reset_password(&payload).await?))
}

/// 注销：清令牌，同时取消在途请求并清空会话
pub async fn logout(State(state): State<Arc<AppState>>) -> Json<Value> {
    state.auth.write().await.clear();
    state.session.write().await.reset();
    info!("用户已注销");
    Json(json!({ "authenticated": false }))
}

pub async fn me(State(state): State<Arc<AppState>>) -> Result<Json<UserProfile>> {
    let token = access_token(&state).await?;
    let user = guard_expiry(&state, state.client.me(&token).await).await?;
    Ok(Json(user))
}
