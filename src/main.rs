use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use alumni_portal::{
    api,
    config::Settings,
    repository,
    service::ServiceContext,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "alumni_portal=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration. A missing signing secret is fatal.
    let settings = Settings::new().context("Failed to load configuration")?;

    tracing::info!("Starting Alumni Portal API on {}:{}", settings.server.host, settings.server.port);

    // Initialize database and run migrations
    let db_pool = repository::connect(
        &settings.database.url,
        settings.database.max_connections,
    )
    .await?;

    tokio::fs::create_dir_all(&settings.uploads.dir).await?;

    let service_context = Arc::new(ServiceContext::new(db_pool, &settings));

    let app = api::create_app(service_context, Arc::new(settings.clone()));

    let listener = tokio::net::TcpListener::bind(
        format!("{}:{}", settings.server.host, settings.server.port)
    ).await?;

    tracing::info!("Server listening on http://{}:{}", settings.server.host, settings.server.port);

    axum::serve(listener, app).await?;

    Ok(())
}
