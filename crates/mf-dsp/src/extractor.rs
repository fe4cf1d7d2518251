//! Per-frame MFCC pipeline: window → FFT → power spectrum → mel energies
//! → log compression → DCT-II.

use mf_core::config::EngineConfig;
use mf_core::error::ConfigError;
use mf_core::limits::WEIGHT_POOL_CAPACITY;

use crate::filterbank::Filterbank;
use crate::spectrum::SpectralEngine;
use crate::tables::{self, DctMatrix};

/// Silence floor applied to mel energies before the log. A saturation
/// policy, not an error: all-zero frames stay finite and are never
/// surfaced to the caller.
const ENERGY_FLOOR: f32 = 1e-12;

/// MFCC engine for one fixed configuration.
///
/// Owns every table and scratch buffer. [`Self::compute`] performs no
/// allocation and carries no state between frames beyond overwriting its
/// scratch, so rerunning the same frame is bit-identical. One instance is
/// not reentrant (callers serialize access); independent instances share
/// nothing.
///
/// # Example
/// ```
/// use mf_core::EngineConfig;
/// use mf_dsp::MfccEngine;
///
/// let mut engine = MfccEngine::new(EngineConfig::default())?;
/// let frame = vec![0i16; engine.frame_len()];
/// let mut features = vec![0.0f32; engine.num_outputs()];
/// engine.compute(&frame, &mut features);
/// # Ok::<(), mf_core::ConfigError>(())
/// ```
pub struct MfccEngine {
    config: EngineConfig,
    window: Vec<f32>,
    dct: DctMatrix,
    filterbank: Filterbank,
    spectral: SpectralEngine,
    mel_energies: Vec<f32>,
}

impl MfccEngine {
    /// Validate `config` and build all four tables (filter specs, weight
    /// pool, window, DCT matrix). Either every table builds or no engine
    /// is returned; there is no partial construction.
    ///
    /// # Errors
    /// Any [`ConfigError`] from bound validation or filterbank packing.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let filterbank = Filterbank::build(
            config.sample_rate_hz,
            config.fft_len,
            config.num_mel_filters,
            WEIGHT_POOL_CAPACITY,
        )?;
        log::info!(
            "mfcc engine: {} Hz, fft {}, {} mel filters, {} outputs",
            config.sample_rate_hz,
            config.fft_len,
            config.num_mel_filters,
            config.num_cepstral_outputs
        );
        Ok(Self {
            window: tables::hamming_window(config.fft_len),
            dct: DctMatrix::new(config.num_cepstral_outputs, config.num_mel_filters),
            spectral: SpectralEngine::new(config.fft_len),
            mel_energies: vec![0.0; config.num_mel_filters],
            filterbank,
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Samples expected per frame.
    #[must_use]
    pub fn frame_len(&self) -> usize {
        self.config.fft_len
    }

    /// Coefficients written per frame.
    #[must_use]
    pub fn num_outputs(&self) -> usize {
        self.config.num_cepstral_outputs
    }

    /// The filterbank backing this engine (read-only).
    #[must_use]
    pub fn filterbank(&self) -> &Filterbank {
        &self.filterbank
    }

    /// Log mel energies of the most recently computed frame.
    #[must_use]
    pub fn mel_energies(&self) -> &[f32] {
        &self.mel_energies
    }

    /// Extract cepstral coefficients from one frame of signed 16-bit PCM.
    ///
    /// Samples are normalized to `[-1, 1)` by `/32768` before windowing.
    /// Total and deterministic: no error channel, no data-dependent
    /// branching beyond the silence floor.
    ///
    /// # Panics
    /// If `frame.len() != self.frame_len()` or
    /// `out.len() != self.num_outputs()`.
    pub fn compute(&mut self, frame: &[i16], out: &mut [f32]) {
        assert_eq!(frame.len(), self.frame_len(), "frame length mismatch");
        let input = self.spectral.input_mut();
        for ((dst, &s), &w) in input.iter_mut().zip(frame).zip(&self.window) {
            *dst = (f32::from(s) / 32768.0) * w;
        }
        self.finish(out);
    }

    /// Same pipeline for frames already normalized to `[-1, 1)`.
    ///
    /// # Panics
    /// Same contract as [`Self::compute`].
    pub fn compute_f32(&mut self, frame: &[f32], out: &mut [f32]) {
        assert_eq!(frame.len(), self.frame_len(), "frame length mismatch");
        let input = self.spectral.input_mut();
        for ((dst, &s), &w) in input.iter_mut().zip(frame).zip(&self.window) {
            *dst = s * w;
        }
        self.finish(out);
    }

    fn finish(&mut self, out: &mut [f32]) {
        assert_eq!(out.len(), self.num_outputs(), "output length mismatch");
        let power = self.spectral.power_spectrum();
        self.filterbank.accumulate(power, &mut self.mel_energies);
        for energy in &mut self.mel_energies {
            *energy = energy.max(ENERGY_FLOOR).ln();
        }
        self.dct.apply(&self.mel_energies, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    fn reference_config() -> EngineConfig {
        EngineConfig::default() // 8 kHz, 1024, 20 mel, 13 outputs
    }

    #[test]
    fn accepts_power_of_two_rejects_other_lengths() {
        assert!(MfccEngine::new(reference_config()).is_ok());

        let bad = EngineConfig {
            fft_len: 1000,
            ..reference_config()
        };
        assert_eq!(
            MfccEngine::new(bad).err(),
            Some(ConfigError::FftLenNotPowerOfTwo(1000))
        );
    }

    #[test]
    fn silence_saturates_at_the_floor() {
        let mut engine = MfccEngine::new(reference_config()).unwrap();
        let frame = vec![0i16; 1024];
        let mut out = vec![0.0f32; 13];
        engine.compute(&frame, &mut out);

        // Every band floors to 1e-12, so the output is the DCT of a
        // constant ln(1e-12) vector.
        let floored = vec![(1e-12f32).ln(); 20];
        let dct = DctMatrix::new(13, 20);
        let mut expected = vec![0.0f32; 13];
        dct.apply(&floored, &mut expected);
        for (k, (&got, &want)) in out.iter().zip(&expected).enumerate() {
            assert!((got - want).abs() < 1e-3, "c[{k}]: {got} vs {want}");
        }
        assert!(out.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn zero_frames_agree_across_sample_formats() {
        let mut engine = MfccEngine::new(reference_config()).unwrap();
        let mut from_i16 = vec![0.0f32; 13];
        engine.compute(&vec![0i16; 1024], &mut from_i16);
        let mut from_f32 = vec![0.0f32; 13];
        engine.compute_f32(&vec![0.0f32; 1024], &mut from_f32);
        for (a, b) in from_i16.iter().zip(&from_f32) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn sine_peaks_in_the_band_containing_its_frequency() {
        let mut engine = MfccEngine::new(reference_config()).unwrap();

        // 250 Hz sine = bin 32 exactly at 8 kHz / 1024.
        let target_bin = 32usize;
        let frame: Vec<i16> = (0..1024)
            .map(|i| (12_000.0 * (TAU * target_bin as f32 * i as f32 / 1024.0).sin()) as i16)
            .collect();
        let mut out = vec![0.0f32; 13];
        engine.compute(&frame, &mut out);

        let loudest = engine
            .mel_energies()
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(m, _)| m)
            .unwrap();
        let spec = engine.filterbank().specs()[loudest];
        assert!(
            (spec.start_bin..spec.start_bin + spec.len).contains(&target_bin),
            "band {loudest} [{}..{}] does not contain bin {target_bin}",
            spec.start_bin,
            spec.start_bin + spec.len
        );
    }

    #[test]
    fn identical_frames_are_bit_identical() {
        let mut engine = MfccEngine::new(reference_config()).unwrap();
        let frame: Vec<i16> = (0..1024)
            .map(|i| (10_000.0 * (TAU * 57.0 * i as f32 / 1024.0).sin()) as i16)
            .collect();
        let mut first = vec![0.0f32; 13];
        engine.compute(&frame, &mut first);
        let mut second = vec![0.0f32; 13];
        engine.compute(&frame, &mut second);
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    #[should_panic(expected = "frame length mismatch")]
    fn short_frame_is_a_caller_bug() {
        let mut engine = MfccEngine::new(reference_config()).unwrap();
        let mut out = vec![0.0f32; 13];
        engine.compute(&[0i16; 512], &mut out);
    }
}
