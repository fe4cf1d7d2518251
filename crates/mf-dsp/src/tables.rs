//! Precomputed transform tables: Hamming analysis window and DCT-II basis.
//!
//! Both are pure functions of the configuration and are built exactly once
//! per engine.

use std::f32::consts::PI;

/// Hamming window coefficients, `w[n] = 0.54 − 0.46·cos(2πn/(N−1))`.
///
/// A window shorter than two samples is unity gain.
///
/// # Example
/// ```
/// use mf_dsp::tables::hamming_window;
/// let w = hamming_window(512);
/// assert!((w[0] - 0.08).abs() < 1e-6);
/// assert!((w[256] - 1.0).abs() < 1e-4);
/// ```
#[must_use]
pub fn hamming_window(len: usize) -> Vec<f32> {
    if len < 2 {
        return vec![1.0; len];
    }
    (0..len)
        .map(|n| 0.54 - 0.46 * (2.0 * PI * n as f32 / (len - 1) as f32).cos())
        .collect()
}

/// Orthogonal DCT-II basis used for cepstral decorrelation:
/// `M[k][n] = cos(k·π·(n + 0.5)/N) · sqrt(2/N)`, row-major.
pub struct DctMatrix {
    coeffs: Vec<f32>,
    num_inputs: usize,
}

impl DctMatrix {
    /// Build `num_outputs` basis rows over `num_inputs` points.
    #[must_use]
    pub fn new(num_outputs: usize, num_inputs: usize) -> Self {
        let norm = (2.0 / num_inputs as f32).sqrt();
        let mut coeffs = Vec::with_capacity(num_outputs * num_inputs);
        for k in 0..num_outputs {
            for n in 0..num_inputs {
                let s = (n as f32 + 0.5) / num_inputs as f32;
                coeffs.push((k as f32 * PI * s).cos() * norm);
            }
        }
        Self { coeffs, num_inputs }
    }

    /// Basis row `k`.
    #[must_use]
    pub fn row(&self, k: usize) -> &[f32] {
        &self.coeffs[k * self.num_inputs..(k + 1) * self.num_inputs]
    }

    #[must_use]
    pub fn num_outputs(&self) -> usize {
        self.coeffs.len() / self.num_inputs
    }

    #[must_use]
    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    /// Project `input` onto every basis row, one coefficient per row.
    pub fn apply(&self, input: &[f32], out: &mut [f32]) {
        for (k, c) in out.iter_mut().enumerate() {
            *c = self.row(k).iter().zip(input).map(|(&b, &x)| b * x).sum();
        }
    }
}
