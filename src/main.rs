use std::{str::FromStr, sync::Arc, time::Duration};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use residence::{
    api,
    auth::AuthService,
    bootstrap,
    config::Settings,
    integrations::{IntegrationManager, webhook::WebhookIntegration},
    service::ServiceContext,
};

const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "residence=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    tracing::info!("Starting Residence portal on {}:{}", settings.server.host, settings.server.port);

    // Initialize database
    let connect_options = SqliteConnectOptions::from_str(&settings.database.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let db_pool = SqlitePoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect_with(connect_options)
        .await?;

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    let auth_service = Arc::new(AuthService::new(
        db_pool.clone(),
        settings.auth.session_duration_hours,
    ));

    // Register integrations
    let integration_manager = Arc::new(IntegrationManager::new());

    if let Some(webhook) = WebhookIntegration::new(settings.integrations.webhook.clone()) {
        integration_manager.register(Arc::new(webhook)).await;
    }

    for (name, result) in integration_manager.health_check_all().await {
        match result {
            Ok(_) => tracing::info!("Integration {} is healthy", name),
            Err(e) => tracing::warn!("Integration {} health check failed: {:?}", name, e),
        }
    }

    let service_context = Arc::new(ServiceContext::new(
        db_pool.clone(),
        integration_manager,
        auth_service.clone(),
    ));

    bootstrap::ensure_default_admin(&service_context.user_service, &settings.bootstrap).await?;

    // Expired sessions are swept periodically
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            match auth_service.cleanup_expired_sessions().await {
                Ok(0) => {}
                Ok(removed) => tracing::debug!("Removed {} expired sessions", removed),
                Err(e) => tracing::warn!("Session cleanup failed: {}", e),
            }
        }
    });

    let app = api::create_app(service_context, Arc::new(settings.clone()));

    let listener = tokio::net::TcpListener::bind(
        format!("{}:{}", settings.server.host, settings.server.port)
    ).await?;

    tracing::info!("Server listening on {}", settings.server.base_url);

    axum::serve(listener, app).await?;

    Ok(())
}
