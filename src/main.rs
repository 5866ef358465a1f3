use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use synthgen_gateway::ax_state::AppState;
use synthgen_gateway::build_router;
use synthgen_gateway::infra::client::GeneratorClient;
use synthgen_gateway::infra::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("synthgen_gateway=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    let client = GeneratorClient::new(&config)?;
    let addr = config.bind_addr;
    info!(
        "远程生成服务: {}, 超时 {}s, 预置令牌: {}",
        client.base_url(),
        config.request_timeout.as_secs(),
        config.access_token.is_some()
    );

    let state = Arc::new(AppState::new(&config, client));
    let app = build_router(state);

    info!("🚀 Synthgen Gateway 运行在 http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
