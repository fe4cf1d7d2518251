//! Construction-time error type.

use thiserror::Error;

/// Raised once, at engine construction. A rejected configuration never
/// yields a partially built engine; `compute` has no error channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// FFT length must be a power of two.
    #[error("fft length {0} is not a power of two")]
    FftLenNotPowerOfTwo(usize),
    /// FFT length outside the supported range.
    #[error("fft length {got} outside supported range [{min}, {max}]")]
    FftLenOutOfRange { got: usize, min: usize, max: usize },
    /// Mel filter count outside `[1, MAX_MEL_FILTERS]`.
    #[error("mel filter count {got} outside supported range [1, {max}]")]
    MelFiltersOutOfRange { got: usize, max: usize },
    /// Cepstral output count outside `[1, MAX_DCT_OUTPUTS]`.
    #[error("cepstral output count {got} outside supported range [1, {max}]")]
    CepstralOutputsOutOfRange { got: usize, max: usize },
    /// Packed triangular weights would not fit the shared pool.
    #[error("packed filter weights need {required} slots, pool holds {capacity}")]
    WeightPoolOverflow { required: usize, capacity: usize },
}
