use std::net::SocketAddr;
use std::sync::Arc;

use promptcademy_api::config::ServerConfig;
use promptcademy_api::router::build_app_router;
use promptcademy_api::state::AppState;
use promptcademy_coach::CoachClient;
use promptcademy_db::memory::MemoryStore;
use promptcademy_db::seed::seed_starter_lessons;
use promptcademy_db::store::{PgStore, Store};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        utc_offset_minutes = config.lesson_utc_offset_minutes,
        "Loaded server configuration"
    );

    let store = open_store(&config).await;

    if config.seed_on_boot {
        let inserted = seed_starter_lessons(store.as_ref())
            .await
            .expect("Failed to seed starter lessons");
        tracing::info!(inserted, "Starter lessons checked");
    }

    let coach = CoachClient::from_env().expect("Failed to build the AI HTTP client");
    match coach.model() {
        Some(model) => tracing::info!(model, "AI coach enabled"),
        None => tracing::warn!("OPENAI_API_KEY not set, scoring and the playground are disabled"),
    }

    let state = AppState::new(store, config.clone(), coach)
        .expect("LESSON_UTC_OFFSET_MINUTES is out of range");
    let app = build_app_router(state, &config);

    let ip = config.host.parse().expect("HOST must be an IP address");
    let addr = SocketAddr::new(ip, config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(%addr, "PromptCademy API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Shut down cleanly");
}

/// `RUST_LOG` wins; otherwise debug for this crate and tower-http.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("promptcademy_api=debug,tower_http=debug"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// PostgreSQL when `DATABASE_URL` is set (connected, checked, migrated),
/// otherwise a process-local store.
async fn open_store(config: &ServerConfig) -> Arc<dyn Store> {
    let Some(url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set, using the in-memory store (nothing is persisted)");
        return Arc::new(MemoryStore::new());
    };

    let pool = promptcademy_db::create_pool(url)
        .await
        .expect("Failed to connect to database");
    promptcademy_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    promptcademy_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready");

    Arc::new(PgStore::new(pool))
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Ctrl-C received, shutting down"),
        () = terminate => tracing::info!("SIGTERM received, shutting down"),
    }
}
