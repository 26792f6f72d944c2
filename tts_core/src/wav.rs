use std::path::Path;

use anyhow::Context;

/// Write PCM f32 samples to `path` as 16-bit PCM mono WAV at `sample_rate`.
///
/// Samples are clamped to [-1.0, 1.0] and quantized to i16. An empty buffer
/// still produces a valid, zero-sample file.
pub fn write_wav<P: AsRef<Path>>(samples: &[f32], sample_rate: u32, path: P) -> anyhow::Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path.as_ref(), spec)
        .with_context(|| format!("Failed to create {}", path.as_ref().display()))?;

    const I16_MAX_F32: f32 = i16::MAX as f32;
    for &s in samples {
        let v = (s.clamp(-1.0, 1.0) * I16_MAX_F32) as i16;
        writer
            .write_sample(v)
            .map_err(|e| anyhow::anyhow!("wav sample err: {e}"))?;
    }

    // finalize rewrites the header with the real data length
    writer
        .finalize()
        .map_err(|e| anyhow::anyhow!("wav finalize err: {e}"))?;
    Ok(())
}
