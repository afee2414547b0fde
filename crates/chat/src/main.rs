use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use agora_core::cleanup::CleanupScheduler;
use agora_db::repositories::{CategoryRepo, MessageRepo, TopicRepo};
use tokio_util::sync::CancellationToken;

use agora_chat::background::message_purge::MessagePurge;
use agora_chat::config::ChatConfig;
use agora_chat::router::build_router;
use agora_chat::state::AppState;
use agora_chat::verifier::RemoteVerifier;
use agora_chat::ws::Hub;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    agora_web::telemetry::init("agora_chat=debug,agora_core=debug,tower_http=debug");

    // --- Configuration ---
    let config = ChatConfig::from_env().expect("Invalid chat service configuration");
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        auth_service_url = %config.auth_service_url,
        "Loaded server configuration"
    );

    // --- Database ---
    let pool = agora_db::create_pool(&config.database_url, config.database_max_connections)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    agora_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    agora_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Identity verification ---
    let verifier = RemoteVerifier::new(&config.auth_service_url, config.auth_verify_timeout)
        .expect("Failed to build auth service client");

    // --- Fan-out hub ---
    let hub = Arc::new(Hub::new(config.ws_queue_capacity));
    tracing::info!(capacity = config.ws_queue_capacity, "Fan-out hub created");

    // --- App state ---
    let state = AppState::new(
        Arc::new(CategoryRepo::new(pool.clone())),
        Arc::new(TopicRepo::new(pool.clone())),
        Arc::new(MessageRepo::new(pool.clone())),
        Arc::new(verifier),
        Arc::clone(&hub),
    )
    .with_pool(pool);

    // --- Message retention ---
    let cancel = CancellationToken::new();
    let scheduler = CleanupScheduler::new(config.cleanup_interval, config.cleanup_timeout).with_job(
        Arc::new(MessagePurge::new(
            Arc::clone(&state.messages),
            config.message_retention,
        )),
    );
    let cleanup_handle = tokio::spawn(scheduler.run(cancel.clone()));

    // --- Router ---
    let app = agora_web::server::with_middleware(build_router(state), &config.server)
        .expect("Invalid CORS configuration");

    // --- Start server ---
    let addr = SocketAddr::new(
        config.server.host.parse().expect("Invalid HOST address"),
        config.server.port,
    );
    tracing::info!(%addr, "Starting chat service");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(agora_web::server::shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    let ws_count = hub.connection_count().await;
    tracing::info!(count = ws_count, "Closing WebSocket subscribers");
    hub.shutdown_all().await;

    cancel.cancel();
    let grace = Duration::from_secs(config.server.shutdown_timeout_secs);
    let _ = tokio::time::timeout(grace, cleanup_handle).await;
    tracing::info!("Graceful shutdown complete");
}
