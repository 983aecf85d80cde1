mod auth;
mod config;
mod http;
mod state;

use anyhow::Context;
use dotenvy::dotenv;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::info;

use auth::TokenVerifier;
use config::Settings;
use http::router::build_router;
use state::AppState;
use storage::Db;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let settings = Settings::new().context("Failed to load configuration")?;

    let db = Db::new(&settings.database.url).await?;

    let mut moderator = domain::ContentModerator::with_defaults();
    moderator.extend(
        settings
            .moderation
            .extra_words
            .iter()
            .map(|w| w.to_filter())
            .collect(),
    );

    let (tx_cmd, rx_cmd) = mpsc::channel(100);
    let (tx_ingest, _rx_ingest) = broadcast::channel(100);
    let cancel_token = CancellationToken::new();

    let db_for_worker = db.clone();
    let tx_ingest_for_worker = tx_ingest.clone();
    let worker_token = cancel_token.clone();

    tokio::spawn(async move {
        if let Err(e) = engine::start_with_cancel_token(
            db_for_worker,
            moderator,
            rx_cmd,
            tx_ingest_for_worker,
            worker_token,
        )
        .await
        {
            tracing::error!("Engine worker crashed: {:?}", e);
        }
    });

    let state = AppState {
        db,
        sender: tx_cmd,
        tx_ingest,
        auth: TokenVerifier::new(settings.security.auth_secret.clone()),
        identity_salt: settings.security.identity_salt.clone(),
    };

    let app = build_router(state, &settings.server.cors_origins);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to address: {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cancel_token.cancel();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}
