use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use vehicle_dashboard::{
    config::{self, engine::EngineConfig},
    core::{engine::TelemetryEngine, settings::seed_settings},
    errors::Result,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Load .env file so RUST_LOG and DATABASE_URL can come from it
    dotenv().ok(); // Non-fatal, env vars can be set externally

    // 2. Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 3. Engine configuration
    let engine_config = EngineConfig::from_env()
        .inspect_err(|e| error!("Invalid telemetry configuration: {}", e))?;

    // 4. Database and schema
    let db = config::database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    config::database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Seed initial settings
    let seed = config::settings::load_default_config()?;
    seed_settings(&db, &seed.settings)
        .await
        .inspect_err(|e| error!("Failed to seed settings: {}", e))?;

    // 6. Run the telemetry engine until Ctrl-C
    let engine = TelemetryEngine::new(db, engine_config);
    engine
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Shutdown signal received.");
        })
        .await;

    Ok(())
}
