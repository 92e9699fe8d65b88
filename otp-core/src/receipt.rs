// File:    receipt.rs
// Author:  apezoo
// Date:    2025-08-06
//
// Description: JSON receipts recording how much key material a run used and a fingerprint of its output.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! Run receipts.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::protocol::Consumed;
use crate::sha256;

/// Record of a single key-consumption run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// The key file the bytes were taken from.
    pub key_file: PathBuf,
    /// Number of key bytes used.
    pub bytes_consumed: u64,
    /// Bytes left in the key file afterwards.
    pub key_bytes_remaining: u64,
    /// Whether the used bytes were removed from the key file.
    pub truncated: bool,
    /// SHA-256 of the produced output, lowercase hex.
    pub output_sha256: String,
}

impl Receipt {
    /// Builds the receipt for a finished run.
    #[must_use]
    pub fn from_consumed(consumed: &Consumed) -> Self {
        Self {
            key_file: consumed.key_path().to_path_buf(),
            bytes_consumed: consumed.bytes_consumed(),
            key_bytes_remaining: consumed.key_bytes_remaining(),
            truncated: consumed.truncated(),
            output_sha256: sha256::digest_hex(consumed.output()),
        }
    }

    /// Writes the receipt as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let receipt_str = serde_json::to_string_pretty(self)?;
        fs::write(path, receipt_str)?;
        Ok(())
    }

    /// Reads a receipt written by [`Receipt::save`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let receipt_str = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&receipt_str)?)
    }
}
