use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use adcraft_api::config::ServerConfig;
use adcraft_api::locks::AdsetLocks;
use adcraft_api::router::build_app_router;
use adcraft_api::state::AppState;
use adcraft_genai::GenAiApi;
use adcraft_pipeline::{DeployOrchestrator, VariantPipeline};
use adcraft_platform::AdPlatformApi;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "adcraft_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = adcraft_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    adcraft_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    adcraft_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- External API clients ---
    let genai = Arc::new(GenAiApi::new(
        config.genai_api_url.clone(),
        config.genai_api_key.clone(),
    ));
    let platform = Arc::new(AdPlatformApi::new(
        config.platform_api_url.clone(),
        config.platform_access_token.clone(),
    ));

    // --- Pipelines ---
    let variant_pipeline = Arc::new(VariantPipeline::new(
        pool.clone(),
        genai,
        config.storage_root.clone(),
        config.generation_concurrency,
        config.slot_timeout,
    ));
    let deploy_orchestrator = Arc::new(DeployOrchestrator::new(
        pool.clone(),
        platform,
        config.deploy_concurrency,
    ));

    // --- State and router ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        locks: Arc::new(AdsetLocks::new()),
        variant_pipeline,
        deploy_orchestrator,
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Server stopped");
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
