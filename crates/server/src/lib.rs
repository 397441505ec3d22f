use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use movies_api_core::{Config, db::create_pool, db::DbPool, services::MovieService};

pub mod error;
pub mod json;
pub mod routes;

pub use error::{ApiError, ApiResult};

use routes::{healthcheck, movies};

/// Application version reported by the healthcheck
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct AppState {
    pub movie_service: MovieService,
    pub environment: String,
}

impl AppState {
    pub fn new(pool: DbPool, environment: impl Into<String>) -> Self {
        Self {
            movie_service: MovieService::new(pool),
            environment: environment.into(),
        }
    }
}

/// Creates the application state with all services initialized
pub async fn create_app_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let pool = create_pool(&config.database_url, config.db_max_connections).await?;
    tracing::info!("Database connected");

    Ok(Arc::new(AppState::new(pool, config.environment.clone())))
}

/// Creates the router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/healthcheck", get(healthcheck::healthcheck))
        .route("/v1/movies", post(movies::create))
        .route(
            "/v1/movies/{id}",
            get(movies::show)
                .patch(movies::update)
                .delete(movies::delete),
        )
        .method_not_allowed_fallback(routes::method_not_allowed)
        .fallback(routes::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Starts the server and blocks until shutdown
pub async fn start_server(config: Config) -> anyhow::Result<()> {
    tracing::info!(environment = %config.environment, version = VERSION, "Starting movies API server...");

    let state = create_app_state(&config).await?;
    let app = create_router(state);

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
