//! Command-line interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use mf_core::EngineConfig;

/// Bounded-memory MFCC feature extraction over framed PCM.
#[derive(Parser, Debug)]
#[command(name = "melframe", version, about)]
pub struct Cli {
    /// Engine configuration file (TOML). Flags override its values.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub engine: EngineOpts,

    #[command(subcommand)]
    pub command: Command,
}

/// Engine parameter overrides, applied on top of the config file (or the
/// defaults when no file is given).
#[derive(Args, Debug, Default)]
pub struct EngineOpts {
    /// Sample rate of the incoming frames, in Hz.
    #[arg(long, global = true)]
    pub sample_rate: Option<u32>,

    /// Samples per frame (power of two).
    #[arg(long, global = true)]
    pub fft_len: Option<usize>,

    /// Number of triangular mel filters.
    #[arg(long, global = true)]
    pub mel_filters: Option<usize>,

    /// Cepstral coefficients per frame.
    #[arg(long, global = true)]
    pub cepstral_outputs: Option<usize>,
}

impl EngineOpts {
    /// Overlay the flagged fields onto `config`. Validation happens after
    /// the merge, in one place.
    #[must_use]
    pub fn apply(&self, mut config: EngineConfig) -> EngineConfig {
        if let Some(rate) = self.sample_rate {
            config.sample_rate_hz = rate;
        }
        if let Some(len) = self.fft_len {
            config.fft_len = len;
        }
        if let Some(mels) = self.mel_filters {
            config.num_mel_filters = mels;
        }
        if let Some(outputs) = self.cepstral_outputs {
            config.num_cepstral_outputs = outputs;
        }
        config
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract features from a framed PCM stream, one CSV line per frame.
    Extract {
        /// Input stream path; `-` reads stdin.
        #[arg(long, default_value = "-")]
        input: String,
    },
    /// Frame a mono 16-bit WAV file into the wire format on stdout.
    Encode {
        /// Source WAV file.
        wav: PathBuf,
        /// Hop between frame starts in samples; defaults to the frame
        /// length (non-overlapping tiling).
        #[arg(long)]
        hop: Option<usize>,
    },
    /// Extract features directly from a WAV file.
    Wav {
        /// Source WAV file.
        wav: PathBuf,
        /// Hop between frame starts in samples; defaults to the frame
        /// length.
        #[arg(long)]
        hop: Option<usize>,
    },
}
