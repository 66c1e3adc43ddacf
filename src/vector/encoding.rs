//! Float/byte packing for embedding blobs.
//!
//! Two variants with distinct contracts:
//!
//! - The borrow-style view (`try_as_bytes` / `try_as_f32`) reinterprets a
//!   slice in place without copying. The result aliases the source and
//!   must not outlive it. Byte inputs whose length is not a multiple of 4,
//!   or that are not 4-byte aligned, yield `None`.
//! - The copying pair (`pack` / `unpack`) produces an independent buffer
//!   in explicit little-endian IEEE-754 layout, regardless of host
//!   endianness. This is the form used for anything persisted, cached, or
//!   crossing a thread boundary.
//!
//! The on-disk blob is `dimensions x 4` bytes, little-endian, contiguous,
//! no header.

use zerocopy::{AsBytes, FromBytes};

/// Views a float slice as raw bytes without copying.
///
/// Only valid on little-endian hosts for data that will be persisted;
/// use [`pack`] for durable encoding.
pub fn try_as_bytes(v: &[f32]) -> &[u8] {
    v.as_bytes()
}

/// Views a byte slice as floats without copying.
///
/// Returns `None` when the length is not a multiple of 4 or the slice is
/// not aligned for `f32`; callers fall back to [`unpack`].
pub fn try_as_f32(b: &[u8]) -> Option<&[f32]> {
    f32::slice_from(b)
}

/// Encodes floats as little-endian bytes into an independent buffer.
pub fn pack(v: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(v.len() * 4);
    for x in v {
        out.extend_from_slice(&x.to_le_bytes());
    }
    out
}

/// Decodes little-endian bytes into an owned float vector.
///
/// Lengths not divisible by 4 decode to an empty vector.
pub fn unpack(b: &[u8]) -> Vec<f32> {
    if b.len() % 4 != 0 {
        return Vec::new();
    }
    b.chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Decodes little-endian bytes into a pre-sized buffer, returning false
/// (and leaving the buffer zeroed) when the length does not match.
pub fn unpack_into(b: &[u8], out: &mut [f32]) -> bool {
    if b.len() != out.len() * 4 {
        return false;
    }
    for (slot, c) in out.iter_mut().zip(b.chunks_exact(4)) {
        *slot = f32::from_le_bytes([c[0], c[1], c[2], c[3]]);
    }
    true
}
