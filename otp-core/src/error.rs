// File:    error.rs
// Author:  apezoo
// Date:    2025-08-02
//
// Description: Error type shared by the buffer, hashing and key-consumption layers.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! Errors returned by `otp-core`.

use thiserror::Error;

/// Result alias used throughout `otp-core`.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong in the core library.
#[derive(Debug, Error)]
pub enum Error {
    /// A buffer allocation of `requested` bytes could not be reserved.
    #[error("out of memory: could not allocate {requested} bytes")]
    OutOfMemory {
        /// Number of bytes that were requested.
        requested: usize,
    },

    /// Two buffers that must have equal length did not.
    #[error("length mismatch: left has {left} bytes, right has {right} bytes")]
    LengthMismatch {
        /// Length of the left-hand operand.
        left: usize,
        /// Length of the right-hand operand.
        right: usize,
    },

    /// The key file holds fewer bytes than the message needs.
    #[error("key too short: need {needed} bytes, key file has {available}")]
    KeyTooShort {
        /// Bytes of key material the message requires.
        needed: u64,
        /// Bytes left in the key file.
        available: u64,
    },

    /// Reading, writing, locking or truncating a stream or file failed.
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// A receipt could not be encoded or decoded.
    #[error("receipt encoding failed: {0}")]
    Receipt(#[from] serde_json::Error),
}
