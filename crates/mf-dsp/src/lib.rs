//! Bounded-memory MFCC feature extraction.
//!
//! Pipeline per frame: Hamming window → real FFT → one-sided power
//! spectrum → triangular mel filterbank (magnitude-weighted) → log
//! compression → DCT-II.
//!
//! All tables and scratch buffers are built once in [`MfccEngine::new`];
//! [`MfccEngine::compute`] never allocates and keeps no state between
//! frames.

pub mod extractor;
pub mod filterbank;
pub mod spectrum;
pub mod tables;

pub use extractor::MfccEngine;
pub use filterbank::{Filterbank, FilterSpec};
