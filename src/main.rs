use tracing::info;
use tracing_subscriber::EnvFilter;

use docman_api::config::config;
use docman_api::database::DatabaseManager;
use docman_api::services::role_service::RoleService;
use docman_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = config();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_filter)),
        )
        .init();

    info!("Starting Docman API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set outside development");
    }

    info!("Connecting to {}", config.redacted_database_url());
    let pool = DatabaseManager::connect(&config.database).await?;

    if config.database.run_migrations {
        DatabaseManager::migrate(&pool).await?;
    }
    RoleService::new(pool.clone()).sync_permissions().await?;

    tokio::fs::create_dir_all(&config.storage.upload_dir).await?;

    let state = AppState::new(pool, config.clone());
    let app = docman_api::app(state);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Docman API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
