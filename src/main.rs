use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pathshala::{
    api,
    auth::{self, SqliteRolePolicy},
    config::Settings,
    integrations::{BulkSmsGateway, NoopSmsGateway, SmsGateway, YouTubeClient},
    service::ServiceContext,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pathshala=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load and validate configuration; an enabled integration with
    // missing credentials aborts here rather than failing per request.
    let settings = Settings::new()?;
    settings.validate()?;

    tracing::info!("Starting Pathshala server on {}:{}", settings.server.host, settings.server.port);

    // Initialize database
    let db_pool = SqlitePoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect(&settings.database.url)
        .await?;

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    // Auth and authorization
    let auth_service = Arc::new(auth::AuthService::new(db_pool.clone()));
    let role_policy = Arc::new(SqliteRolePolicy::new(db_pool.clone()));

    // SMS gateway: real when configured, logging no-op otherwise
    let sms_gateway: Arc<dyn SmsGateway> = match BulkSmsGateway::new(settings.sms.clone()) {
        Some(gateway) => {
            gateway.health_check().await?;
            tracing::info!("SMS gateway enabled");
            Arc::new(gateway)
        }
        None => {
            tracing::warn!("SMS disabled; codes will be logged, not sent");
            Arc::new(NoopSmsGateway)
        }
    };

    // YouTube metadata lookup for the lesson editor
    let youtube_client = match YouTubeClient::new(settings.youtube.clone()) {
        Some(client) => {
            tracing::info!("YouTube metadata lookup enabled");
            Some(Arc::new(client))
        }
        None => {
            tracing::warn!("YouTube metadata lookup disabled");
            None
        }
    };

    // Create service context
    let service_context = Arc::new(ServiceContext::new(
        auth_service,
        role_policy,
        sms_gateway,
        db_pool.clone(),
    ));

    let app = api::create_app(service_context, youtube_client, Arc::new(settings.clone()));

    let listener = tokio::net::TcpListener::bind(
        format!("{}:{}", settings.server.host, settings.server.port)
    ).await?;

    tracing::info!("Server listening on http://{}:{}", settings.server.host, settings.server.port);

    axum::serve(listener, app).await?;

    Ok(())
}
