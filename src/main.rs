use mentor::api::{self, app_state::AppState};
use mentor::config::loader::ConfigLoader;
use mentor::observability::{self, ObservabilityState, create_observability_router};
use mentor::security::create_authenticator;
use mentor::tutor::create_tutor_system;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init_tracing("mentor");

    info!("Starting Mentor...");

    let config = ConfigLoader::load()?;
    ConfigLoader::validate(&config)?;
    info!("Configuration loaded successfully");

    let server_config = config.server.clone();
    let api_key = config.security.api_key.clone();

    let tutor = Arc::new(create_tutor_system(config)?);
    info!("Tutor system created");

    let observability_state = Arc::new(ObservabilityState::new(
        env!("CARGO_PKG_VERSION").to_string(),
    ));

    // 引导失败不阻止服务启动：chat 接口会返回未初始化的固定回复，
    // 就绪探针保持未就绪。
    match tutor.initialize().await {
        Ok(()) => {
            observability_state.mark_ready();
            info!("Tutor system initialized successfully!");
        }
        Err(e) => {
            error!("Error initializing tutor system: {}", e);
        }
    }

    let authenticator = create_authenticator(&api_key);
    let app_state = AppState::new(tutor, observability_state.clone(), authenticator);
    info!("Application state created");

    let api_router = api::create_router(app_state);
    let router = create_observability_router(observability_state.clone())
        .merge(api_router)
        .layer(axum::middleware::from_fn_with_state(
            observability_state,
            observability::metrics_middleware,
        ));
    info!("API router created with observability endpoints");

    let addr = format!("{}:{}", server_config.host, server_config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
