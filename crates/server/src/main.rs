use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use movies_api_core::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file early for environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,movies_api_server=debug,movies_api_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
    if let Err(errors) = config.validate() {
        anyhow::bail!("Invalid config: {:?}", errors);
    }

    movies_api_server::start_server(config).await
}
