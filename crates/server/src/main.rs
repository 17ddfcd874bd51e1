use analysis_engine::EngineClient;
use server::config::Config;
use server::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env();

    let engine = match config.engine.clone() {
        Some(engine_config) => {
            tracing::info!(path = %engine_config.path, "Starting analysis engine...");
            EngineClient::start(engine_config).await
        }
        None => None,
    };
    if engine.is_none() {
        tracing::info!("No engine available - analysis disabled");
    }
    if config.openai_api_key.is_none() {
        tracing::info!("OPENAI_API_KEY not set - chat will report a configuration error");
    }

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(config, engine.clone());
    let app = server::app(state);

    tracing::info!("Starting server on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    if let Some(engine) = engine {
        engine.shutdown().await;
    }
    Ok(())
}
