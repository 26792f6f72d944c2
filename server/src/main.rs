use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use server::config::ServerConfig;
use server::routes::{app, AppState, SharedEngine};
use tts_core::{PiperEngine, VoiceCatalog};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();

    // Model load is the slow part of the process lifetime; pay it exactly
    // once, before the listener exists. A failure here is fatal by contract:
    // the error propagates out of main and the process exits non-zero
    // without ever accepting a connection.
    info!("Loading voice models (this takes a few seconds)...");
    let started = Instant::now();
    let catalog = VoiceCatalog::from_file(&config.voices_map)
        .with_context(|| format!("reading voice catalog {}", config.voices_map))?;
    let engine = PiperEngine::load(&catalog).context("loading synthesis models")?;
    info!(
        "Loaded {} voice(s) in {:.1}s. Server ready.",
        engine.voice_count(),
        started.elapsed().as_secs_f32()
    );

    let engine: SharedEngine = Arc::new(Mutex::new(engine));
    let router = app(AppState { engine }, &config);

    // Loopback only. The service has no authentication; reachability from
    // other hosts must stay impossible.
    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("TTS server running on http://{addr}");
    info!("Endpoints: POST /speak, GET /ping");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete.");
    Ok(())
}

/// Resolve on SIGINT or SIGTERM; axum then stops accepting and drains
/// in-flight requests before `serve` returns.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        },
    }
}
