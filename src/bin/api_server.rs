// API Server Binary Entry Point
//
// Purpose: Start the Axum API server for disease detection, crop
// recommendation and the weather proxy
// Usage: cargo run --bin api_server

use smart_agro::{create_router, AppState, ServiceConfig};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up OPENWEATHER_API_KEY etc. from a local .env if present
    dotenv::dotenv().ok();

    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    // Default log level: info for our crate, warn for others
                    "smart_agro=info,tower_http=debug,axum=debug,warn".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting API server...");

    let config = ServiceConfig::from_env()?;

    tracing::info!("Configuration:");
    tracing::info!("  PORT: {}", config.port);
    tracing::info!("  DISEASE_MODEL_PATH: {:?}", config.disease_model_path);
    tracing::info!("  CROP_MODEL_PATH: {:?}", config.crop_model_path);
    tracing::info!("  SCALER_PATH: {:?}", config.scaler_path);
    tracing::info!("  WEATHER_BASE_URL: {}", config.weather_base_url);
    tracing::info!("  WEATHER_TIMEOUT: {:?}", config.weather_timeout);

    // Initialize application state (crop model, scaler, weather client)
    let state = AppState::new(&config).await?;
    tracing::info!("Application state initialized successfully");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .await?;

    Ok(())
}
