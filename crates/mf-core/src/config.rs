//! Engine configuration: TOML-loadable, validated once, immutable after.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::limits::{
    MAX_DCT_OUTPUTS, MAX_FFT_LEN, MAX_MEL_FILTERS, MIN_FFT_LEN,
};

/// Immutable engine parameters.
///
/// The defaults are the reference configuration: 8 kHz audio, 1024-point
/// frames, 20 mel bands, 13 cepstral outputs.
///
/// # Example
/// ```
/// use mf_core::EngineConfig;
/// let config = EngineConfig::default();
/// assert!(config.validate().is_ok());
/// assert_eq!(config.num_spectrum_bins(), 513);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Sample rate of the incoming frames, in Hz.
    pub sample_rate_hz: u32,
    /// Samples per frame; power of two.
    pub fft_len: usize,
    /// Number of triangular mel filters.
    pub num_mel_filters: usize,
    /// Cepstral coefficients produced per frame.
    pub num_cepstral_outputs: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 8_000,
            fft_len: 1024,
            num_mel_filters: 20,
            num_cepstral_outputs: 13,
        }
    }
}

impl EngineConfig {
    /// Check every compile-time bound.
    ///
    /// # Errors
    /// One [`ConfigError`] variant per violated bound; the first violation
    /// in declaration order wins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.fft_len.is_power_of_two() {
            return Err(ConfigError::FftLenNotPowerOfTwo(self.fft_len));
        }
        if self.fft_len < MIN_FFT_LEN || self.fft_len > MAX_FFT_LEN {
            return Err(ConfigError::FftLenOutOfRange {
                got: self.fft_len,
                min: MIN_FFT_LEN,
                max: MAX_FFT_LEN,
            });
        }
        if self.num_mel_filters == 0 || self.num_mel_filters > MAX_MEL_FILTERS {
            return Err(ConfigError::MelFiltersOutOfRange {
                got: self.num_mel_filters,
                max: MAX_MEL_FILTERS,
            });
        }
        if self.num_cepstral_outputs == 0 || self.num_cepstral_outputs > MAX_DCT_OUTPUTS {
            return Err(ConfigError::CepstralOutputsOutOfRange {
                got: self.num_cepstral_outputs,
                max: MAX_DCT_OUTPUTS,
            });
        }
        Ok(())
    }

    /// Number of bins in the one-sided power spectrum.
    #[must_use]
    pub const fn num_spectrum_bins(&self) -> usize {
        self.fft_len / 2 + 1
    }

    /// Load and validate a configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file is unreadable, not valid TOML, or
    /// violates a bound.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading engine config {}", path.display()))?;
        let config: Self = toml::from_str(&text)
            .with_context(|| format!("parsing engine config {}", path.display()))?;
        config.validate()?;
        log::debug!("loaded engine config from {}", path.display());
        Ok(config)
    }
}
