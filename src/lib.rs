pub mod api;
pub mod core;
pub mod error;
pub mod infra;
pub mod models;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::{augment, auth, builder, export, generate, history};

pub mod ax_state {
    use tokio::sync::RwLock;

    use crate::core::session::GenerationSession;
    use crate::infra::client::GeneratorClient;
    use crate::infra::config::AppConfig;
    use crate::models::auth::AuthState;

    pub struct AppState {
        pub client: GeneratorClient,
        pub session: RwLock<GenerationSession>,
        pub auth: RwLock<AuthState>,
    }

    impl AppState {
        /// 配置里预置了令牌时直接视为已登录
        pub fn new(config: &AppConfig, client: GeneratorClient) -> Self {
            let auth = AuthState::new(config.access_token.clone());
            Self {
                client,
                session: RwLock::new(GenerationSession::new()),
                auth: RwLock::new(auth),
            }
        }
    }
}

pub fn build_router(state: Arc<ax_state::AppState>) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        // 登录态
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/forgot-password", post(auth::forgot_password))
        .route("/api/auth/reset-password", post(auth::reset_password))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        // 请求构建
        .route("/api/session", get(builder::get_session))
        .route("/api/constraints", post(builder::add_constraint))
        .route("/api/constraints/{index}", delete(builder::remove_constraint))
        .route("/api/columns", post(builder::add_column))
        .route("/api/columns/{index}", delete(builder::remove_column))
        .route("/api/tables", post(builder::add_table))
        .route("/api/tables/{index}", delete(builder::remove_table))
        .route("/api/tables/graph", get(builder::schema_graph))
        // 生成
        .route("/api/domains", get(generate::list_domains))
        .route("/api/generate", post(generate::generate_single))
        .route("/api/generate/relational", post(generate::generate_relational))
        .route("/api/generate/cancel", post(generate::cancel_generation))
        .route("/api/result", get(generate::current_result))
        // 历史与增强
        .route("/api/history", get(history::list_history))
        .route("/api/history/{id}/load", post(history::load_history))
        .route("/api/augment", post(augment::augment))
        // 导出
        .route(
            "/api/export/{format}",
            post(export::export_result).get(export::export_by_query),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
