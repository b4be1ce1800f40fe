use tracing_subscriber::EnvFilter;

use medilog::api::{self, ApiContext};
use medilog::{config, db};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let data_dir = config::app_data_dir();
    std::fs::create_dir_all(&data_dir)?;

    // Open once up front so migrations run (and fail) before we bind.
    let db_path = config::database_path();
    db::open_database(&db_path)?;
    tracing::info!(path = %db_path.display(), "Database ready");

    let ctx = ApiContext::new(db_path, config::horizon_days());
    let app = api::api_router(ctx);

    api::server::serve(app, config::bind_addr()).await?;
    Ok(())
}
