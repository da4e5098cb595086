use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod db;
mod error;
mod extract;
mod routes;
mod schema;
mod seed;
mod session_store;
mod state;
mod storage;

mod crypto {
    pub mod password;
    pub mod token;
}

mod models {
    pub mod application;
    pub mod job;
    pub mod session;
    pub mod user;
}

mod repositories {
    pub mod application;
    pub mod job;
    pub mod user;
}

mod services {
    pub mod applications;
    pub mod auth;
    pub mod jobs;
}

mod handlers {
    pub mod admin;
    pub mod applications;
    pub mod auth;
    pub mod jobs;
}

mod middleware_layer {
    pub mod auth;
}

mod validation {
    pub mod applications;
    pub mod auth;
    pub mod jobs;
    pub mod rules;
}

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("✅ Configuration loaded successfully");

    let state = AppState::new(&config).await?;
    tracing::info!("✅ AppState initialized");

    if let Err(e) = schema::bootstrap(&state.db).await {
        tracing::error!("❌ Schema bootstrap failed: {}", e);
        return Err(e.into());
    }

    seed::run(&state).await?;
    tracing::info!("✅ Seed data verified");

    let app = routes::build_router(state.clone())?;

    let addr = config.bind_addr;
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.db.close();
    tracing::info!("👋 Database pool closed, bye");

    Ok(())
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("❌ Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("❌ Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("🛑 Shutdown signal received");
}
