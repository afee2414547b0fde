use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use agora_core::cleanup::CleanupScheduler;
use agora_db::repositories::{SessionRepo, UserRepo};
use tokio_util::sync::CancellationToken;

use agora_auth::background::session_sweep::SessionSweep;
use agora_auth::config::AuthConfig;
use agora_auth::router::build_router;
use agora_auth::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    agora_web::telemetry::init("agora_auth=debug,agora_core=debug,tower_http=debug");

    // --- Configuration ---
    let config = AuthConfig::from_env().expect("Invalid auth service configuration");
    tracing::info!(host = %config.server.host, port = config.server.port, "Loaded server configuration");

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

    // --- App state ---
    let state = AppState::new(
        Arc::new(UserRepo::new(pool.clone())),
        Arc::new(SessionRepo::new(pool.clone())),
        config.jwt.clone(),
        config.refresh_cookie_secure,
    )
    .with_pool(pool);

    // --- Session cleanup ---
    let cancel = CancellationToken::new();
    let scheduler = CleanupScheduler::new(config.cleanup_interval, config.cleanup_timeout).with_job(
        Arc::new(SessionSweep::new(Arc::clone(&state.sessions))),
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
    tracing::info!(%addr, "Starting auth service");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(agora_web::server::shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    cancel.cancel();
    let grace = Duration::from_secs(config.server.shutdown_timeout_secs);
    let _ = tokio::time::timeout(grace, cleanup_handle).await;
    tracing::info!("Graceful shutdown complete");
}
