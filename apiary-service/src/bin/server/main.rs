use std::sync::Arc;

use apiary_service::config::Config;
use apiary_service::domain::account::models::AccountSettings;
use apiary_service::domain::account::service::AccountService;
use apiary_service::inbound::http::router::create_router;
use apiary_service::outbound::mailer::OutboundMailer;
use apiary_service::outbound::repositories::access::PostgresAccessRepository;
use apiary_service::outbound::repositories::password_reset::PostgresResetTokenRepository;
use apiary_service::outbound::repositories::user::PostgresUserRepository;
use auth::Authenticator;
use auth::JwtHandler;
use auth::SystemClock;
use chrono::Duration;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "apiary_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "apiary-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        request_timeout_ms = config.server.request_timeout_ms,
        jwt_algorithm = %config.jwt.algorithm,
        session_minutes = config.jwt.expiration_minutes,
        reset_minutes = config.password_reset.expiration_minutes,
        mail_enabled = config.mail.enabled,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let jwt_handler = JwtHandler::from_config(config.jwt.secret.as_bytes(), &config.jwt.algorithm)?;
    let authenticator = Arc::new(Authenticator::new(
        jwt_handler,
        Duration::minutes(config.jwt.expiration_minutes),
        Arc::new(SystemClock),
    ));

    let mailer = Arc::new(OutboundMailer::from_config(&config.mail)?);
    let settings = AccountSettings {
        request_timeout: config.server.request_timeout(),
        reset_token_ttl: Duration::minutes(config.password_reset.expiration_minutes),
        reset_url: config.password_reset.reset_url.clone(),
    };

    let account_service = Arc::new(AccountService::new(
        Arc::new(PostgresUserRepository::new(pg_pool.clone())),
        Arc::new(PostgresResetTokenRepository::new(pg_pool.clone())),
        Arc::new(PostgresAccessRepository::new(pg_pool)),
        mailer,
        authenticator,
        settings,
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(account_service);
    axum::serve(http_listener, http_application)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server exited successfully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
