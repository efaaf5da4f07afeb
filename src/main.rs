//! NextPress server

use anyhow::Result;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nextpress::{
    api::{self, AppState},
    config::Config,
    db,
};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nextpress=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load_with_env(Path::new("config.yml"))?;

    let pool = db::create_pool(&config.database).await?;
    pool.ping().await?;
    tracing::info!(driver = ?config.database.driver, "Database connected");

    db::migrations::run_migrations(&pool).await?;

    tokio::fs::create_dir_all(&config.upload.path).await?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = api::build_router(AppState::new(pool.clone(), config)?);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("NextPress listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;

    pool.close().await;
    Ok(())
}
