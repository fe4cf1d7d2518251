//! Triangular mel filterbank: construction and band-energy aggregation.
//!
//! Built in two passes: the first measures every filter's bin span and the
//! packed weight total, the second fills the shared pool. Capacity is
//! checked between the passes, before any write, so a [`Filterbank`] never
//! exists in a partially built state.

use mf_core::error::ConfigError;
use mf_core::limits::MEL_LOW_HZ;

/// One triangular filter: a contiguous run of power-spectrum bins plus the
/// offset of its per-bin weights in the shared pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSpec {
    /// First spectrum bin covered (always ≥ 1; DC is excluded).
    pub start_bin: usize,
    /// Number of consecutive bins covered.
    pub len: usize,
    /// Start of this filter's weights in the packed pool.
    pub weight_offset: usize,
}

/// Mel-spaced triangular filterbank with all weights packed into one flat
/// pool, in filter order.
#[derive(Debug)]
pub struct Filterbank {
    specs: Vec<FilterSpec>,
    weights: Vec<f32>,
}

/// Linear frequency (Hz) to mel scale.
#[inline]
#[must_use]
pub fn hz_to_mel(hz: f32) -> f32 {
    1127.0 * (1.0 + hz / 700.0).ln()
}

/// Mel scale back to linear frequency (Hz).
#[inline]
#[must_use]
pub fn mel_to_hz(mel: f32) -> f32 {
    700.0 * ((mel / 1127.0).exp() - 1.0)
}

/// Bin-level geometry of one filter, shared by both build passes.
struct FilterSpan {
    left: usize,
    center: usize,
    right: usize,
    f_left: f32,
    f_center: f32,
    f_right: f32,
}

impl FilterSpan {
    fn from_freqs(f_left: f32, f_center: f32, f_right: f32, bin_hz: f32, half: usize) -> Self {
        let left = (f_left / bin_hz).floor() as usize;
        let center = (f_center / bin_hz).floor() as usize;
        let right = (f_right / bin_hz).floor() as usize;

        // DC stays excluded and both edges keep at least one bin even when
        // tight mel spacing collapses the raw indices. The Nyquist cap is
        // applied last so the span never leaves the one-sided spectrum.
        let left = left.max(1);
        let center = center.max(left + 1);
        let right = right.max(center + 1).min(half);
        let center = center.min(right - 1);
        let left = left.min(center - 1);

        Self {
            left,
            center,
            right,
            f_left,
            f_center,
            f_right,
        }
    }

    fn len(&self) -> usize {
        self.right - self.left + 1
    }

    /// Append this filter's triangular weights: a rising edge up to the
    /// center bin, then a falling edge, each clamped to `[0, 1]`.
    fn fill_weights(&self, bin_hz: f32, pool: &mut Vec<f32>) {
        for bin in self.left..=self.center {
            let hz = bin as f32 * bin_hz;
            pool.push(((hz - self.f_left) / (self.f_center - self.f_left)).clamp(0.0, 1.0));
        }
        for bin in self.center + 1..=self.right {
            let hz = bin as f32 * bin_hz;
            pool.push(((self.f_right - hz) / (self.f_right - self.f_center)).clamp(0.0, 1.0));
        }
    }
}

impl Filterbank {
    /// Build `num_filters` triangular filters with centers equally spaced
    /// on the mel scale between [`MEL_LOW_HZ`] and Nyquist.
    ///
    /// `fft_len` and `num_filters` must already satisfy the engine bounds;
    /// only the packed-weight total is checked here, against
    /// `pool_capacity`, before anything is written.
    ///
    /// # Errors
    /// [`ConfigError::WeightPoolOverflow`] when the packed weights would
    /// not fit the pool.
    pub fn build(
        sample_rate_hz: u32,
        fft_len: usize,
        num_filters: usize,
        pool_capacity: usize,
    ) -> Result<Self, ConfigError> {
        let half = fft_len / 2;
        let bin_hz = sample_rate_hz as f32 / fft_len as f32;
        let mel_low = hz_to_mel(MEL_LOW_HZ);
        let mel_high = hz_to_mel(sample_rate_hz as f32 / 2.0);
        let mel_step = (mel_high - mel_low) / (num_filters + 1) as f32;

        // Pass 1: bin spans and the packed total.
        let mut spans = Vec::with_capacity(num_filters);
        let mut total = 0usize;
        for m in 0..num_filters {
            let f_left = mel_to_hz(mel_low + mel_step * m as f32);
            let f_center = mel_to_hz(mel_low + mel_step * (m + 1) as f32);
            let f_right = mel_to_hz(mel_low + mel_step * (m + 2) as f32);
            let span = FilterSpan::from_freqs(f_left, f_center, f_right, bin_hz, half);
            total += span.len();
            spans.push(span);
        }
        if total > pool_capacity {
            return Err(ConfigError::WeightPoolOverflow {
                required: total,
                capacity: pool_capacity,
            });
        }

        // Pass 2: fill the pool, contiguously in filter order.
        let mut specs = Vec::with_capacity(num_filters);
        let mut weights = Vec::with_capacity(total);
        for span in &spans {
            specs.push(FilterSpec {
                start_bin: span.left,
                len: span.len(),
                weight_offset: weights.len(),
            });
            span.fill_weights(bin_hz, &mut weights);
        }
        log::debug!(
            "mel filterbank: {num_filters} filters, {} packed weights",
            weights.len()
        );
        Ok(Self { specs, weights })
    }

    /// Filter descriptors, ordered by increasing center frequency.
    #[must_use]
    pub fn specs(&self) -> &[FilterSpec] {
        &self.specs
    }

    /// The packed weight pool, all filters contiguous.
    #[must_use]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    #[must_use]
    pub fn num_filters(&self) -> usize {
        self.specs.len()
    }

    /// Aggregate per-band energies from a one-sided power spectrum.
    ///
    /// Each bin contributes its magnitude (square root of power), not the
    /// power itself. Downstream models are calibrated against this
    /// magnitude-weighted form; do not "correct" it to the power form.
    pub fn accumulate(&self, power: &[f32], energies: &mut [f32]) {
        for (spec, energy) in self.specs.iter().zip(energies.iter_mut()) {
            let bins = &power[spec.start_bin..spec.start_bin + spec.len];
            let weights = &self.weights[spec.weight_offset..spec.weight_offset + spec.len];
            *energy = bins
                .iter()
                .zip(weights)
                .map(|(&p, &w)| p.sqrt() * w)
                .sum();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mf_core::limits::WEIGHT_POOL_CAPACITY;

    #[test]
    fn mel_hz_roundtrip() {
        for &hz in &[20.0f32, 300.0, 1000.0, 4000.0] {
            let back = mel_to_hz(hz_to_mel(hz));
            assert!((back - hz).abs() < 0.01, "hz={hz}, roundtrip={back}");
        }
    }

    #[test]
    fn mel_scale_monotonic() {
        let mut prev = hz_to_mel(0.0);
        for i in 1..40 {
            let mel = hz_to_mel(i as f32 * 100.0);
            assert!(mel > prev);
            prev = mel;
        }
    }

    #[test]
    fn spans_stay_inside_one_sided_spectrum() {
        let bank = Filterbank::build(8_000, 1024, 20, WEIGHT_POOL_CAPACITY).unwrap();
        let mut prev_start = 0usize;
        for spec in bank.specs() {
            assert!(spec.start_bin >= 1, "DC bin must stay excluded");
            assert!(spec.len >= 2, "both edges need at least one bin");
            assert!(spec.start_bin + spec.len - 1 <= 512, "span past Nyquist");
            assert!(spec.start_bin >= prev_start, "start bins must not regress");
            prev_start = spec.start_bin;
        }
        let total: usize = bank.specs().iter().map(|s| s.len).sum();
        assert_eq!(total, bank.weights().len());
        assert!(total <= WEIGHT_POOL_CAPACITY);
    }

    #[test]
    fn weights_are_packed_in_filter_order() {
        let bank = Filterbank::build(8_000, 1024, 20, WEIGHT_POOL_CAPACITY).unwrap();
        let mut expected_offset = 0usize;
        for spec in bank.specs() {
            assert_eq!(spec.weight_offset, expected_offset);
            expected_offset += spec.len;
        }
    }

    #[test]
    fn weights_are_triangular_and_unit_bounded() {
        let bank = Filterbank::build(8_000, 1024, 20, WEIGHT_POOL_CAPACITY).unwrap();
        for spec in bank.specs() {
            let w = &bank.weights()[spec.weight_offset..spec.weight_offset + spec.len];
            assert!(w.iter().all(|&x| (0.0..=1.0).contains(&x)));

            // Unimodal: non-decreasing up to the peak, non-increasing after.
            let peak = w
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1))
                .map(|(i, _)| i)
                .unwrap();
            for j in 1..=peak {
                assert!(w[j] >= w[j - 1] - 1e-6, "rising edge dips at {j}");
            }
            for j in peak + 1..w.len() {
                assert!(w[j] <= w[j - 1] + 1e-6, "falling edge rises at {j}");
            }
        }
    }

    #[test]
    fn overflow_is_detected_before_any_write() {
        let err = Filterbank::build(8_000, 1024, 20, 10).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::WeightPoolOverflow { required, capacity: 10 } if required > 10
        ));
    }

    #[test]
    fn accumulate_weights_magnitude_not_power() {
        let bank = Filterbank::build(8_000, 256, 8, WEIGHT_POOL_CAPACITY).unwrap();
        // Power of 4.0 everywhere → magnitude 2.0, so each band energy is
        // exactly twice its weight sum.
        let power = vec![4.0f32; 256 / 2 + 1];
        let mut energies = vec![0.0f32; 8];
        bank.accumulate(&power, &mut energies);
        for (spec, &energy) in bank.specs().iter().zip(&energies) {
            let weight_sum: f32 = bank.weights()
                [spec.weight_offset..spec.weight_offset + spec.len]
                .iter()
                .sum();
            assert!((energy - 2.0 * weight_sum).abs() < 1e-4);
        }
    }
}
