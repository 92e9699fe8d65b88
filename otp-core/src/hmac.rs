// File:    hmac.rs
// Author:  apezoo
// Date:    2025-08-03
//
// Description: HMAC-SHA256 (RFC 2104) built on the in-crate SHA-256 engine and byte buffers.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! HMAC-SHA256.
//!
//! Key and message are fully materialized; there is no streaming variant.

use crate::buffer::Buffer;
use crate::error::Result;
use crate::sha256::{self, Digest};

/// HMAC block size for SHA-256, in bytes.
pub const BLOCK_SIZE: usize = sha256::BLOCK_LEN;

const OUTER_PAD_BYTE: u8 = 0x5c;
const INNER_PAD_BYTE: u8 = 0x36;

/// Normalizes `key` to exactly [`BLOCK_SIZE`] bytes.
///
/// Keys longer than a block are replaced by their digest first; shorter keys
/// are zero-padded.
///
/// # Errors
///
/// Returns [`crate::Error::OutOfMemory`] if the padded key cannot be allocated.
pub fn pad_key(key: &[u8]) -> Result<Buffer> {
    let mut padded = Buffer::allocate(BLOCK_SIZE)?;
    if key.len() > BLOCK_SIZE {
        let hashed = sha256::digest(key).to_bytes();
        padded[..hashed.len()].copy_from_slice(&hashed);
    } else {
        padded[..key.len()].copy_from_slice(key);
    }
    Ok(padded)
}

fn filled_block(byte: u8) -> Result<Buffer> {
    Buffer::copy_from(&[byte; BLOCK_SIZE])
}

/// Computes HMAC-SHA256 of `message` under `key`.
///
/// # Errors
///
/// Returns [`crate::Error::OutOfMemory`] if an intermediate buffer cannot be
/// allocated.
pub fn hmac_sha256(key: &[u8], message: &[u8]) -> Result<Digest> {
    let padded_key = pad_key(key)?;
    let outer_pad = Buffer::xor(&padded_key, &filled_block(OUTER_PAD_BYTE)?)?;
    let inner_pad = Buffer::xor(&padded_key, &filled_block(INNER_PAD_BYTE)?)?;

    let inner = sha256::digest(&Buffer::concatenate(&inner_pad, message)?);
    let outer = Buffer::concatenate(&outer_pad, &inner.to_bytes())?;
    Ok(sha256::digest(&outer))
}
