//! Subcommand implementations: framed-stream extraction, WAV framing, and
//! direct WAV extraction.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use anyhow::Context;
use mf_core::EngineConfig;
use mf_dsp::MfccEngine;
use mf_serial::FrameReader;

/// Extract features from a framed PCM stream.
///
/// A dedicated reader thread owns the blocking byte stream and hands
/// complete frames over a bounded channel; the engine runs on the calling
/// thread and prints one CSV line per frame.
///
/// # Errors
/// Returns an error if the input cannot be opened, the engine
/// configuration is invalid, or stdout fails.
pub fn extract(config: EngineConfig, input: &str) -> anyhow::Result<()> {
    let mut engine = MfccEngine::new(config)?;
    let frame_len = engine.frame_len();

    let source: Box<dyn Read + Send> = if input == "-" {
        log::info!("reading framed PCM from stdin");
        Box::new(io::stdin())
    } else {
        log::info!("reading framed PCM from {input}");
        Box::new(File::open(input).with_context(|| format!("opening frame stream {input}"))?)
    };

    let (tx, rx) = flume::bounded::<Vec<i16>>(4);
    let reader_thread = std::thread::spawn(move || {
        let mut reader = FrameReader::new(source, frame_len);
        let mut frame = vec![0i16; frame_len];
        loop {
            match reader.read_frame(&mut frame) {
                Ok(true) => {
                    if tx.send(frame.clone()).is_err() {
                        break;
                    }
                }
                Ok(false) => break,
                Err(e) => {
                    log::error!("frame stream: {e}");
                    break;
                }
            }
        }
    });

    let mut writer = BufWriter::new(io::stdout().lock());
    let mut features = vec![0.0f32; engine.num_outputs()];
    let mut frames = 0usize;
    for frame in rx.iter() {
        engine.compute(&frame, &mut features);
        write_csv(&mut writer, &features)?;
        frames += 1;
    }
    writer.flush()?;

    if reader_thread.join().is_err() {
        anyhow::bail!("frame reader thread panicked");
    }
    log::info!("extracted features for {frames} frames");
    Ok(())
}

/// Frame a mono 16-bit WAV file into the wire format on stdout.
///
/// # Errors
/// Returns an error if the WAV file is unreadable, not mono 16-bit
/// integer PCM, or stdout fails.
pub fn encode(config: EngineConfig, wav: &Path, hop: Option<usize>) -> anyhow::Result<()> {
    let samples = read_mono_i16(wav, config.sample_rate_hz)?;
    let frame_len = config.fft_len;
    let hop = hop.unwrap_or(frame_len);
    anyhow::ensure!(hop > 0, "hop must be positive");

    let mut writer = BufWriter::new(io::stdout().lock());
    let mut count = 0usize;
    for frame in frames_of(&samples, frame_len, hop) {
        mf_serial::write_frame(&mut writer, frame)?;
        count += 1;
    }
    writer.flush()?;
    log::info!("encoded {count} frames from {}", wav.display());
    Ok(())
}

/// Extract features directly from a WAV file, one CSV line per frame.
///
/// # Errors
/// Same failure modes as [`encode`], plus engine construction.
pub fn wav(config: EngineConfig, wav: &Path, hop: Option<usize>) -> anyhow::Result<()> {
    let mut engine = MfccEngine::new(config)?;
    let samples = read_mono_i16(wav, config.sample_rate_hz)?;
    let frame_len = engine.frame_len();
    let hop = hop.unwrap_or(frame_len);
    anyhow::ensure!(hop > 0, "hop must be positive");

    let mut writer = BufWriter::new(io::stdout().lock());
    let mut features = vec![0.0f32; engine.num_outputs()];
    let mut frames = 0usize;
    for frame in frames_of(&samples, frame_len, hop) {
        engine.compute(frame, &mut features);
        write_csv(&mut writer, &features)?;
        frames += 1;
    }
    writer.flush()?;
    log::info!("extracted features for {frames} frames from {}", wav.display());
    Ok(())
}

/// Successive frame starts at multiples of `hop`; a buffer shorter than
/// one frame yields nothing.
fn frames_of(samples: &[i16], frame_len: usize, hop: usize) -> impl Iterator<Item = &[i16]> {
    samples.windows(frame_len).step_by(hop)
}

fn write_csv<W: Write>(writer: &mut W, features: &[f32]) -> io::Result<()> {
    for (i, c) in features.iter().enumerate() {
        if i > 0 {
            write!(writer, ",")?;
        }
        write!(writer, "{c:.6}")?;
    }
    writeln!(writer)
}

fn read_mono_i16(path: &Path, expected_rate: u32) -> anyhow::Result<Vec<i16>> {
    let mut reader =
        hound::WavReader::open(path).with_context(|| format!("opening {}", path.display()))?;
    let spec = reader.spec();
    anyhow::ensure!(
        spec.channels == 1,
        "{} has {} channels, expected mono",
        path.display(),
        spec.channels
    );
    anyhow::ensure!(
        spec.bits_per_sample == 16 && spec.sample_format == hound::SampleFormat::Int,
        "{} is not 16-bit integer PCM",
        path.display()
    );
    if spec.sample_rate != expected_rate {
        log::warn!(
            "{}: file sample rate {} differs from configured {expected_rate}",
            path.display(),
            spec.sample_rate
        );
    }
    let samples = reader
        .samples::<i16>()
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("decoding {}", path.display()))?;
    log::debug!("{}: {} samples", path.display(), samples.len());
    Ok(samples)
}
