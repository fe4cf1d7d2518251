//! Byte framing for raw PCM frames:
//! `'W' | u16 LE sample count | i16 LE payload`.
//!
//! The reader never desynchronizes: bytes are skipped until a header, a
//! frame with an unexpected sample count is drained in full before the
//! next scan, and partial reads are retried until the payload is
//! complete.

use std::io::{self, Read, Write};

/// Frame header byte.
pub const FRAME_HEADER: u8 = b'W';

/// Transport failures surfaced by [`FrameReader`] and [`write_frame`].
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Underlying stream error, including EOF in the middle of a frame.
    #[error("frame transport: {0}")]
    Io(#[from] io::Error),
}

/// Write one frame: header, little-endian sample count, then samples.
///
/// # Errors
/// Any underlying write failure.
///
/// # Panics
/// If `samples` holds more than `u16::MAX` samples (the count field is
/// 16 bits on the wire).
pub fn write_frame<W: Write>(writer: &mut W, samples: &[i16]) -> Result<(), FrameError> {
    assert!(
        samples.len() <= usize::from(u16::MAX),
        "frame exceeds wire length field"
    );
    let mut packet = Vec::with_capacity(3 + samples.len() * 2);
    packet.push(FRAME_HEADER);
    packet.extend_from_slice(&(samples.len() as u16).to_le_bytes());
    for &s in samples {
        packet.extend_from_slice(&s.to_le_bytes());
    }
    writer.write_all(&packet)?;
    Ok(())
}

/// Reads fixed-length frames off a byte stream, resynchronizing on
/// anything malformed.
pub struct FrameReader<R: Read> {
    inner: R,
    expected_len: usize,
}

impl<R: Read> FrameReader<R> {
    /// Wrap `inner`, accepting only frames of exactly `expected_len`
    /// samples.
    #[must_use]
    pub fn new(inner: R, expected_len: usize) -> Self {
        Self {
            inner,
            expected_len,
        }
    }

    /// Read the next well-formed frame into `out`.
    ///
    /// Returns `Ok(true)` once `out` holds a complete frame and
    /// `Ok(false)` on a clean end of stream at a frame boundary. Frames
    /// whose sample count differs from the expected one are drained,
    /// logged, and skipped, so the stream stays aligned. EOF inside a
    /// header or payload is an error.
    ///
    /// # Errors
    /// [`FrameError::Io`] for any underlying stream failure.
    ///
    /// # Panics
    /// If `out.len()` differs from the expected frame length.
    pub fn read_frame(&mut self, out: &mut [i16]) -> Result<bool, FrameError> {
        assert_eq!(out.len(), self.expected_len, "output buffer mismatch");
        loop {
            // Resync: scan byte by byte until a header.
            let mut byte = [0u8; 1];
            match self.inner.read_exact(&mut byte) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(false),
                Err(e) => return Err(e.into()),
            }
            if byte[0] != FRAME_HEADER {
                continue;
            }

            let mut len_bytes = [0u8; 2];
            self.inner.read_exact(&mut len_bytes)?;
            let count = usize::from(u16::from_le_bytes(len_bytes));
            if count != self.expected_len {
                log::warn!(
                    "dropping frame of {count} samples (expected {})",
                    self.expected_len
                );
                self.drain(count * 2)?;
                continue;
            }

            let mut sample = [0u8; 2];
            for slot in out.iter_mut() {
                self.inner.read_exact(&mut sample)?;
                *slot = i16::from_le_bytes(sample);
            }
            return Ok(true);
        }
    }

    fn drain(&mut self, mut bytes: usize) -> Result<(), FrameError> {
        let mut dump = [0u8; 64];
        while bytes > 0 {
            let chunk = bytes.min(dump.len());
            self.inner.read_exact(&mut dump[..chunk])?;
            bytes -= chunk;
        }
        Ok(())
    }

    /// Consume the reader, returning the wrapped stream.
    pub fn into_inner(self) -> R {
        self.inner
    }
}
