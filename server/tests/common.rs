//! Common utilities for integration tests: an engine double with observable
//! probes, and a router factory over it.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;

use server::config::ServerConfig;
use server::routes::{app, AppState, SharedEngine};
use tts_core::{ChunkStream, SynthesisEngine};

/// Observations shared between a [`MockEngine`] and the test that built it.
#[derive(Clone, Default)]
pub struct EngineProbe {
    calls: Arc<AtomicUsize>,
    voices: Arc<Mutex<Vec<String>>>,
    overlap_seen: Arc<AtomicBool>,
    in_flight: Arc<AtomicBool>,
}

impl EngineProbe {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn voices_seen(&self) -> Vec<String> {
        self.voices.lock().unwrap().clone()
    }

    pub fn saw_overlap(&self) -> bool {
        self.overlap_seen.load(Ordering::SeqCst)
    }
}

/// Test double for the synthesis capability: configurable chunk output or
/// failure, plus overlap detection for the serialization contract.
pub struct MockEngine {
    chunks: Vec<Vec<f32>>,
    fail_with: Option<String>,
    delay: Duration,
    probe: EngineProbe,
}

impl MockEngine {
    pub fn with_chunks(chunks: Vec<Vec<f32>>) -> (Self, EngineProbe) {
        let probe = EngineProbe::default();
        (
            Self {
                chunks,
                fail_with: None,
                delay: Duration::ZERO,
                probe: probe.clone(),
            },
            probe,
        )
    }

    pub fn failing(message: &str) -> (Self, EngineProbe) {
        let (mut engine, probe) = Self::with_chunks(Vec::new());
        engine.fail_with = Some(message.to_string());
        (engine, probe)
    }

    /// Hold each synthesize call open for `delay`, so overlapping calls have
    /// a window in which to collide.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl SynthesisEngine for MockEngine {
    fn synthesize(&self, _text: &str, voice: &str) -> anyhow::Result<ChunkStream<'_>> {
        let probe = &self.probe;
        if probe.in_flight.swap(true, Ordering::SeqCst) {
            probe.overlap_seen.store(true, Ordering::SeqCst);
        }
        probe.calls.fetch_add(1, Ordering::SeqCst);
        probe.voices.lock().unwrap().push(voice.to_string());
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        probe.in_flight.store(false, Ordering::SeqCst);

        if let Some(message) = &self.fail_with {
            anyhow::bail!("{message}");
        }
        let chunks = self.chunks.clone();
        Ok(Box::new(chunks.into_iter().map(Ok)))
    }
}

/// Router over a mock engine with default configuration.
pub fn test_app(engine: MockEngine) -> Router {
    let engine: SharedEngine = Arc::new(Mutex::new(engine));
    app(AppState { engine }, &ServerConfig::default())
}

/// Unique scratch path under the system temp dir.
pub fn temp_wav_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("speak_test_{}_{name}.wav", std::process::id()))
}
