use linguacard_backend::config::Config;
use linguacard_backend::services::generation::GenerationProvider;
use linguacard_backend::state::AppState;
use linguacard_backend::{create_app, db, logging};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = logging::init_tracing(&config.log_level);

    let pool = match db::init_pool().await {
        Ok(pool) => pool,
        Err(err) => {
            tracing::error!(error = %err, "database initialization failed");
            return;
        }
    };

    let generation = GenerationProvider::from_env();
    if !generation.is_available() {
        tracing::warn!("generation provider not configured, translate routes will refuse requests");
    }

    let state = AppState::new(pool, generation);
    let app = create_app(state);

    let addr = config.bind_addr();
    tracing::info!(%addr, "linguacard backend listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind listener failed");

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

    if let Err(e) = server.await {
        tracing::error!(error = %e, "server error");
    }

    tracing::info!("HTTP server stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
