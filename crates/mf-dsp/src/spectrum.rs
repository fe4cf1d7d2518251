//! One-sided power spectrum via a real-to-complex FFT.
//!
//! The FFT kernel is realfft's; its output layout (`fft_len/2 + 1` complex
//! bins, DC and Nyquist with no imaginary part) is pinned inside this
//! module so the rest of the engine only ever sees non-negative power
//! values. Swapping in another kernel touches this file alone.

use std::sync::Arc;

use realfft::num_complex::Complex;
use realfft::{RealFftPlanner, RealToComplex};

/// Windowed-frame → power-spectrum stage with all scratch pre-allocated.
pub struct SpectralEngine {
    fft: Arc<dyn RealToComplex<f32>>,
    input: Vec<f32>,
    spectrum: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    power: Vec<f32>,
}

impl SpectralEngine {
    /// Plan a forward real FFT of `fft_len` points and allocate every
    /// buffer the transform will touch. `fft_len` must already be
    /// validated by the caller (power of two, within engine bounds).
    #[must_use]
    pub fn new(fft_len: usize) -> Self {
        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(fft_len);
        let spectrum = fft.make_output_vec();
        let scratch = fft.make_scratch_vec();
        Self {
            fft,
            input: vec![0.0; fft_len],
            spectrum,
            scratch,
            power: vec![0.0; fft_len / 2 + 1],
        }
    }

    /// Mutable view of the time-domain input frame. Callers overwrite all
    /// of it before [`Self::power_spectrum`]; the transform scrambles it.
    pub fn input_mut(&mut self) -> &mut [f32] {
        &mut self.input
    }

    /// Transform the current input frame and return the one-sided power
    /// spectrum, `re² + im²` per bin. For DC and Nyquist the imaginary
    /// part is structurally zero, so those powers reduce to the squared
    /// single coefficient.
    pub fn power_spectrum(&mut self) -> &[f32] {
        // Buffer lengths are fixed at construction; realfft only fails on
        // mismatched slice sizes.
        if self
            .fft
            .process_with_scratch(&mut self.input, &mut self.spectrum, &mut self.scratch)
            .is_err()
        {
            unreachable!("FFT buffers are sized at construction");
        }
        for (p, c) in self.power.iter_mut().zip(&self.spectrum) {
            *p = c.re * c.re + c.im * c.im;
        }
        &self.power
    }

    /// Points per input frame.
    #[must_use]
    pub fn fft_len(&self) -> usize {
        self.input.len()
    }

    /// Bins in the one-sided spectrum.
    #[must_use]
    pub fn num_bins(&self) -> usize {
        self.power.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    #[test]
    fn impulse_has_flat_unit_power() {
        let mut engine = SpectralEngine::new(64);
        engine.input_mut()[0] = 1.0;
        let power = engine.power_spectrum();
        assert_eq!(power.len(), 33);
        for (k, &p) in power.iter().enumerate() {
            assert!((p - 1.0).abs() < 1e-5, "bin {k}: {p}");
        }
    }

    #[test]
    fn constant_signal_concentrates_at_dc() {
        let mut engine = SpectralEngine::new(64);
        engine.input_mut().fill(1.0);
        let power = engine.power_spectrum();
        assert!((power[0] - 64.0 * 64.0).abs() < 1e-2);
        for (k, &p) in power.iter().enumerate().skip(1) {
            assert!(p < 1e-4, "bin {k} leaked {p}");
        }
    }

    #[test]
    fn sine_lands_on_its_bin() {
        let n = 256;
        let target = 19;
        let mut engine = SpectralEngine::new(n);
        for (i, sample) in engine.input_mut().iter_mut().enumerate() {
            *sample = (TAU * target as f32 * i as f32 / n as f32).sin();
        }
        let power = engine.power_spectrum();
        let peak = power
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(k, _)| k)
            .unwrap();
        assert_eq!(peak, target);
        // A bin-aligned sine of amplitude 1 carries (N/2)² of power.
        let expected = (n as f32 / 2.0).powi(2);
        assert!((power[target] - expected).abs() / expected < 1e-3);
    }

    #[test]
    fn power_is_never_negative() {
        let mut engine = SpectralEngine::new(128);
        for (i, sample) in engine.input_mut().iter_mut().enumerate() {
            *sample = ((i * 37 % 17) as f32 - 8.0) / 8.0;
        }
        assert!(engine.power_spectrum().iter().all(|&p| p >= 0.0));
    }
}
