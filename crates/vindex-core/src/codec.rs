//! Vector wire encoding.
//!
//! Application vectors are `f64`, backends store `f32`. Encoding narrows each
//! element to single precision and writes its IEEE-754 bits as four
//! little-endian bytes, with no padding and no length prefix. Decoding widens
//! back to `f64`. The narrowing is lossy on purpose: it is exactly what the
//! backend sees when it ranks vectors.

use crate::error::CodecError;

/// Width of one encoded element in bytes.
pub const ELEMENT_SIZE: usize = std::mem::size_of::<f32>();

/// Narrow a vector to single precision.
#[must_use]
pub fn narrow(values: &[f64]) -> Vec<f32> {
    values.iter().map(|&v| v as f32).collect()
}

/// Widen a single precision vector.
#[must_use]
pub fn widen(values: &[f32]) -> Vec<f64> {
    values.iter().map(|&v| f64::from(v)).collect()
}

/// Encode a vector as packed little-endian `f32` bytes.
#[must_use]
pub fn encode(values: &[f64]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(values.len() * ELEMENT_SIZE);
    for value in values {
        bytes.extend_from_slice(&(*value as f32).to_le_bytes());
    }
    bytes
}

/// Decode packed little-endian `f32` bytes.
///
/// # Errors
///
/// Returns [`CodecError::TrailingBytes`] if the input length is not a
/// multiple of four.
pub fn decode(bytes: &[u8]) -> Result<Vec<f64>, CodecError> {
    if bytes.len() % ELEMENT_SIZE != 0 {
        return Err(CodecError::TrailingBytes { len: bytes.len() });
    }

    Ok(bytes
        .chunks_exact(ELEMENT_SIZE)
        .map(|chunk| {
            let bits = [chunk[0], chunk[1], chunk[2], chunk[3]];
            f64::from(f32::from_le_bytes(bits))
        })
        .collect())
}
