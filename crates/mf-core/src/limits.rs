//! Compile-time capacity bounds.
//!
//! Every buffer in the engine is sized against these at construction and
//! never grows afterwards.

/// Largest supported FFT length (power of two).
pub const MAX_FFT_LEN: usize = 1024;

/// Smallest supported FFT length. Matches the 32-point floor of the
/// embedded real-FFT kernels this engine is calibrated against.
pub const MIN_FFT_LEN: usize = 32;

/// Maximum number of triangular mel filters.
pub const MAX_MEL_FILTERS: usize = 32;

/// Maximum number of cepstral outputs (DCT rows).
pub const MAX_DCT_OUTPUTS: usize = 13;

/// Worst-case packed weight count: every filter spanning the full
/// one-sided spectrum.
pub const WEIGHT_POOL_CAPACITY: usize = MAX_MEL_FILTERS * (MAX_FFT_LEN / 2 + 1);

/// Lower edge of the mel filterbank in Hz. The DC bin is excluded
/// separately during construction.
pub const MEL_LOW_HZ: f32 = 20.0;
