use std::future::Future;

use axum::Router;
use configs::{AppConfig, PasswordHashing};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::{errors::StartupError, routes, state::ServerState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Connect to storage, optionally synchronize the schema, and build the router.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    let db = models::db::connect(&cfg.database)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    if cfg.database.synchronize {
        models::db::synchronize(&db).await.map_err(|e| StartupError::Database(e.to_string()))?;
    }
    if cfg.security.password_hashing == PasswordHashing::Plaintext {
        warn!(event = "plaintext_passwords", "passwords are stored verbatim; set security.password_hashing = \"argon2\"");
    }
    let state = ServerState::new(db, cfg.security.password_hashing);
    Ok(routes::build_router(state, build_cors()))
}

/// Serve `app` until `shutdown` resolves, then let in-flight requests finish.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    info!(event = "drained", "http server stopped accepting and drained connections");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM. A handler that cannot be installed never resolves.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(event = "signal_handler_failed", error = %e, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(event = "signal_handler_failed", error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!(event = "shutdown_signal", "shutdown requested, draining connections");
}

/// Build the app from an already loaded configuration and serve it until a shutdown signal.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_app(&cfg).await?;

    let listener = TcpListener::bind(cfg.server.bind_addr()).await?;
    info!(addr = %listener.local_addr()?, event = "listening", "http server ready");
    serve(listener, app, shutdown_signal()).await?;
    Ok(())
}
