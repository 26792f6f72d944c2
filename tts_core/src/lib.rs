mod wav;

pub use wav::write_wav;

use std::{collections::HashMap, fs, path::Path};

use anyhow::Context;
use piper_rs::synth::{PiperSpeechStreamParallel, PiperSpeechSynthesizer};
use serde::Deserialize;

/// Output rate for every written file. Samples pass through exactly as the
/// engine produced them; nothing in the pipeline resamples.
pub const SAMPLE_RATE: u32 = 24_000;

/// A finite sequence of sample chunks in emission order. Not restartable;
/// drain it exactly once.
pub type ChunkStream<'a> = Box<dyn Iterator<Item = anyhow::Result<Vec<f32>>> + 'a>;

/// The warm synthesis capability: (text, voice) to chunked audio.
pub trait SynthesisEngine: Send {
    fn synthesize(&self, text: &str, voice: &str) -> anyhow::Result<ChunkStream<'_>>;
}

/// Concatenate a chunk stream into one contiguous sample buffer.
///
/// Chunk N lands before chunk N+1 exactly as emitted. A stream that yields
/// nothing produces an empty buffer; what an empty write means is the
/// caller's decision.
pub fn assemble(stream: ChunkStream<'_>) -> anyhow::Result<Vec<f32>> {
    let mut samples: Vec<f32> = Vec::new();
    for chunk in stream {
        samples.extend(chunk?);
    }
    Ok(samples)
}

/// Voice identifier to model config path, read from a JSON object file:
/// `{"af_heart": "models/af_heart/model.onnx.json", ...}`.
#[derive(Debug, Clone, Deserialize)]
pub struct VoiceCatalog {
    #[serde(flatten)]
    voices: HashMap<String, String>,
}

impl VoiceCatalog {
    /// Create from a prebuilt map
    pub fn new(voices: HashMap<String, String>) -> Self {
        Self { voices }
    }

    /// Load from a catalog file, e.g. `models/voices.json`
    pub fn from_file<P: AsRef<Path>>(p: P) -> anyhow::Result<Self> {
        let text = fs::read_to_string(p.as_ref())
            .with_context(|| format!("Failed to load {}", p.as_ref().display()))?;
        let catalog: Self = serde_json::from_str(&text).with_context(|| {
            format!(
                "{} is not a JSON object of voice -> config path",
                p.as_ref().display()
            )
        })?;
        if catalog.voices.is_empty() {
            anyhow::bail!("{} lists no voices", p.as_ref().display());
        }
        Ok(catalog)
    }

    /// Sorted voice identifiers
    pub fn voices(&self) -> Vec<String> {
        let mut out: Vec<String> = self.voices.keys().cloned().collect();
        out.sort();
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.voices.iter()
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }
}

/// One loaded Piper model per catalog voice.
///
/// All models are loaded up front so the process is fully warm before it
/// serves its first request; nothing is loaded or reloaded afterwards.
pub struct PiperEngine {
    voices: HashMap<String, PiperSpeechSynthesizer>,
}

impl PiperEngine {
    /// Load every catalog voice. Slow (seconds per model); runs once per
    /// process, before the listener binds. Any failure here is fatal to
    /// startup by contract.
    pub fn load(catalog: &VoiceCatalog) -> anyhow::Result<Self> {
        let mut voices = HashMap::new();
        for (voice, cfg_path) in catalog.iter() {
            let model = piper_rs::from_config_path(Path::new(cfg_path))
                .map_err(|e| anyhow::anyhow!("piper load error for voice '{voice}': {e}"))?;
            let synth = PiperSpeechSynthesizer::new(model)
                .with_context(|| format!("building synthesizer for voice '{voice}'"))?;
            voices.insert(voice.clone(), synth);
        }
        Ok(Self { voices })
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }
}

impl SynthesisEngine for PiperEngine {
    fn synthesize(&self, text: &str, voice: &str) -> anyhow::Result<ChunkStream<'_>> {
        let synth = self.voices.get(voice).ok_or_else(|| {
            let mut known: Vec<&str> = self.voices.keys().map(String::as_str).collect();
            known.sort_unstable();
            anyhow::anyhow!(
                "Unknown voice '{voice}'. Available voices: {}",
                known.join(", ")
            )
        })?;

        let iter: PiperSpeechStreamParallel = synth
            .synthesize_parallel(text.to_string(), None)
            .map_err(|e| anyhow::anyhow!("piper synth error: {e}"))?;

        Ok(Box::new(iter.map(|part| {
            part.map(|samples| samples.into_vec())
                .map_err(|e| anyhow::anyhow!("chunk error: {e}"))
        })))
    }
}
