use std::sync::Arc;

use auth::JwtHandler;
use auth_service::config::Config;
use auth_service::domain::auth::responder::ValidationResponder;
use auth_service::domain::auth::service::AuthService;
use auth_service::inbound::http::router::create_router;
use auth_service::outbound::events::KafkaMessagePublisher;
use auth_service::outbound::events::KafkaMessageSubscriber;
use auth_service::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "auth-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        kafka_brokers = %config.kafka.brokers,
        kafka_group_id = %config.kafka.group_id,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await?;
    tracing::info!(max_connections = 5, "Database connection pool created");

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!("Database migrations completed");

    let jwt_handler = Arc::new(JwtHandler::new(config.jwt.secret.as_bytes()));
    let repository = Arc::new(PostgresUserRepository::new(pg_pool));
    let auth_service = Arc::new(AuthService::new(repository, Arc::clone(&jwt_handler)));

    let publisher = Arc::new(KafkaMessagePublisher::new(&config)?);
    let subscriber = Arc::new(KafkaMessageSubscriber::new(&config));

    // The responder gets its own task so broker consumption never blocks
    // the synchronous register/login path.
    let responder = ValidationResponder::new(Arc::clone(&auth_service), subscriber, publisher);
    tokio::spawn(responder.run());

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(address = %http_address, "Http server listening");

    let application = create_router(auth_service, jwt_handler);
    axum::serve(http_listener, application).await?;

    Ok(())
}
