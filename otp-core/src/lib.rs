// File:    lib.rs
// Author:  apezoo
// Date:    2025-07-17
//
// Description: The main library crate for otp-core: buffers, SHA-256, HMAC and one-time-pad key consumption.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! # OTP Core Library
//!
//! This library provides file-backed one-time pad (OTP) encryption: key bytes
//! are taken from the end of a key file and cut off once used, so no key byte
//! is ever applied twice. It also carries the SHA-256 and HMAC-SHA256 used to
//! fingerprint messages and outputs, implemented without external crypto
//! dependencies.

/// Owned, length-tagged byte buffers.
pub mod buffer;
/// The crate's error type.
pub mod error;
/// HMAC-SHA256.
pub mod hmac;
/// Utilities for generating new key files.
pub mod pad_generator;
/// The key-consumption state machine.
pub mod protocol;
/// JSON receipts describing a run.
pub mod receipt;
/// SHA-256 digest engine.
pub mod sha256;
/// Reading streams and key files into buffers; truncating key files.
pub mod stream;

pub use buffer::Buffer;
pub use error::{Error, Result};
pub use protocol::Truncation;
pub use sha256::Digest;
