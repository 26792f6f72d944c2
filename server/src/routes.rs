use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use tts_core::{assemble, write_wav, SynthesisEngine, SAMPLE_RATE};

use crate::config::{ServerConfig, REQUEST_BODY_LIMIT};
use crate::error::ApiError;
use crate::validation::validate_speak_request;

/// Voice used when a request does not name one.
pub const DEFAULT_VOICE: &str = "af_heart";

/// The one engine instance, shared by every connection. The mutex is the
/// serialization discipline: at most one synthesis call in flight at a time,
/// and the reference itself is never replaced after startup.
pub type SharedEngine = Arc<Mutex<dyn SynthesisEngine>>;

#[derive(Clone)]
pub struct AppState {
    pub engine: SharedEngine,
}

#[derive(Deserialize)]
pub struct SpeakRequest {
    #[serde(default)]
    text: String,
    voice: Option<String>,
    #[serde(default)]
    output_path: String,
}

#[derive(Serialize)]
pub struct SpeakResponse {
    success: bool,
}

/// Build the router. Anything outside the route table answers 404 for any
/// method, matching the wire protocol rather than axum's default 405.
pub fn app(state: AppState, config: &ServerConfig) -> Router {
    let mut router = Router::new()
        .route("/speak", post(speak))
        .route("/ping", get(ping).post(ping))
        .fallback(not_found)
        .method_not_allowed_fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TimeoutLayer::new(config.request_timeout()))
                .layer(RequestBodyLimitLayer::new(REQUEST_BODY_LIMIT))
                .into_inner(),
        )
        .with_state(state);

    if config.request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router
}

/// Liveness probe for supervisors. The engine loads before the listener
/// binds, so "accepting connections" and "ready to synthesize" are the same
/// signal.
async fn ping() -> &'static str {
    "pong"
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// POST /speak. The body is decoded explicitly instead of through the `Json`
/// extractor so that an undecodable payload and a missing field stay
/// distinct error kinds with their own statuses.
async fn speak(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SpeakResponse>, ApiError> {
    let req: SpeakRequest =
        serde_json::from_slice(&body).map_err(|e| ApiError::MalformedBody(e.to_string()))?;

    let SpeakRequest {
        text,
        voice,
        output_path,
    } = req;
    let voice = voice.unwrap_or_else(|| DEFAULT_VOICE.to_string());

    validate_speak_request(&text, &output_path)?;

    // Synthesis is CPU-bound and can take seconds; keep it off the async
    // workers. The blocking task runs to completion even when the client
    // disconnects, so a dropped connection never interrupts engine work.
    let engine = state.engine.clone();
    tokio::task::spawn_blocking(move || -> Result<(), ApiError> {
        let engine = engine.lock().map_err(|_| {
            ApiError::Synthesis(anyhow::anyhow!(
                "Engine lock poisoned by a previous panic. Restart the server."
            ))
        })?;
        let stream = engine.synthesize(&text, &voice)?;
        let samples = assemble(stream)?;
        write_wav(&samples, SAMPLE_RATE, &output_path)?;
        Ok(())
    })
    .await
    .map_err(|e| ApiError::Synthesis(anyhow::anyhow!("Synthesis task failed: {e}")))??;

    Ok(Json(SpeakResponse { success: true }))
}
