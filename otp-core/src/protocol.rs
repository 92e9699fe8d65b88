// File:    protocol.rs
// Author:  apezoo
// Date:    2025-08-05
//
// Description: One-time-pad key consumption: take key bytes from the end of a key file, XOR, and cut them off.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! The key-consumption protocol.
//!
//! A run moves through three states, each its own type so the steps cannot
//! be reordered:
//!
//! 1. [`Reading`]: the message is in memory and the key file is open and locked.
//! 2. [`Validated`]: as many bytes as the message has were read from the end
//!    of the key file.
//! 3. [`Consumed`]: key and message were XORed and, under
//!    [`Truncation::Destroy`], the key bytes were cut off the key file.
//!
//! The key file handle and its lock are held from the tail read until the
//! truncation, so a second process on the same key file waits rather than
//! reading the same key bytes. Running several processes on one key file is
//! still not supported.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use log::{Level, debug, info, log_enabled, warn};

use crate::buffer::Buffer;
use crate::error::Result;
use crate::sha256;
use crate::stream;

/// What to do with the key file once its bytes have been used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truncation {
    /// Remove the used bytes from the key file so they can never be reused.
    Destroy,
    /// Leave the key file untouched. Only for testing: the same key bytes
    /// will be handed out again on the next run.
    Keep,
}

impl Truncation {
    /// Maps the CLI's truncate flag onto a policy.
    #[must_use]
    pub const fn from_flag(truncate: bool) -> Self {
        if truncate { Self::Destroy } else { Self::Keep }
    }
}

/// Message loaded, key file open and locked.
#[derive(Debug)]
pub struct Reading {
    key_path: PathBuf,
    key_file: File,
    message: Buffer,
    truncation: Truncation,
}

impl Reading {
    /// Opens and locks the key file for a run over `message`.
    ///
    /// The key file is opened for writing and locked exclusively only under
    /// [`Truncation::Destroy`]; a dry run takes a shared lock on a read-only
    /// handle.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if the key file cannot be opened or locked.
    pub fn open(key_path: impl AsRef<Path>, message: Buffer, truncation: Truncation) -> Result<Self> {
        let key_path = key_path.as_ref().to_path_buf();
        let destroy = truncation == Truncation::Destroy;
        let key_file = OpenOptions::new()
            .read(true)
            .write(destroy)
            .open(&key_path)?;
        if destroy {
            key_file.lock()?;
        } else {
            key_file.lock_shared()?;
        }

        debug!(
            "Loaded {} byte message for key file '{}'.",
            message.len(),
            key_path.display()
        );
        if log_enabled!(Level::Debug) {
            debug!("Message sha256: {}", sha256::digest(&message));
        }

        Ok(Self {
            key_path,
            key_file,
            message,
            truncation,
        })
    }

    /// Length of the loaded message, which is also the key length required.
    #[must_use]
    pub const fn required_key_len(&self) -> usize {
        self.message.len()
    }

    /// Reads the key from the end of the key file.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::KeyTooShort`] if the key file is shorter than
    /// the message; the key file is not modified in that case.
    pub fn validate(mut self) -> Result<Validated> {
        let key_file_len = stream::file_len(&self.key_file)?;
        let needed = self.required_key_len();
        let key = stream::read_file_end(&mut self.key_file, needed)?;
        debug!(
            "Read {} key bytes from the end of '{}' ({key_file_len} bytes).",
            key.len(),
            self.key_path.display()
        );
        Ok(Validated {
            key_path: self.key_path,
            key_file: self.key_file,
            key_file_len,
            message: self.message,
            key,
            truncation: self.truncation,
        })
    }
}

/// Key material of the right length has been read.
#[derive(Debug)]
pub struct Validated {
    key_path: PathBuf,
    key_file: File,
    key_file_len: u64,
    message: Buffer,
    key: Buffer,
    truncation: Truncation,
}

impl Validated {
    /// Size of the key file before this run.
    #[must_use]
    pub const fn key_file_len(&self) -> u64 {
        self.key_file_len
    }

    /// XORs key and message and applies the truncation policy.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if the key file cannot be truncated. No
    /// output is returned in that case.
    pub fn consume(self) -> Result<Consumed> {
        self.consume_with(|_| Ok(())).map(|(consumed, ())| consumed)
    }

    /// Like [`Validated::consume`], but hands the output to `stage` before
    /// the key file is touched.
    ///
    /// `stage` is where callers put the output somewhere durable. If it
    /// fails, the key file is left exactly as it was and the error is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns the error from `stage`, or [`crate::Error::Io`] if the key
    /// file cannot be truncated.
    pub fn consume_with<T, F>(self, stage: F) -> Result<(Consumed, T)>
    where
        F: FnOnce(&Buffer) -> Result<T>,
    {
        let output = Buffer::xor(&self.key, &self.message)?;
        let staged = stage(&output)?;
        let key_bytes_used = self.key.len() as u64;

        let key_bytes_remaining = match self.truncation {
            Truncation::Destroy => {
                let remaining = self.key_file_len - key_bytes_used;
                stream::truncate(&self.key_file, remaining)?;
                info!(
                    "Removed {key_bytes_used} used key bytes from '{}'; {remaining} bytes remain.",
                    self.key_path.display()
                );
                remaining
            }
            Truncation::Keep => {
                warn!(
                    "Key file '{}' was not truncated; its last {key_bytes_used} bytes will be reused.",
                    self.key_path.display()
                );
                self.key_file_len
            }
        };

        let consumed = Consumed {
            output,
            key_path: self.key_path,
            key_bytes_used,
            key_bytes_remaining,
            truncated: self.truncation == Truncation::Destroy,
        };
        Ok((consumed, staged))
    }
}

/// Result of a finished run.
#[derive(Debug)]
pub struct Consumed {
    output: Buffer,
    key_path: PathBuf,
    key_bytes_used: u64,
    key_bytes_remaining: u64,
    truncated: bool,
}

impl Consumed {
    /// The ciphertext or plaintext produced.
    #[must_use]
    pub const fn output(&self) -> &Buffer {
        &self.output
    }

    /// Takes ownership of the produced bytes.
    #[must_use]
    pub fn into_output(self) -> Buffer {
        self.output
    }

    /// Key file the bytes came from.
    #[must_use]
    pub fn key_path(&self) -> &Path {
        &self.key_path
    }

    /// Number of key bytes used.
    #[must_use]
    pub const fn bytes_consumed(&self) -> u64 {
        self.key_bytes_used
    }

    /// Bytes left in the key file after this run.
    #[must_use]
    pub const fn key_bytes_remaining(&self) -> u64 {
        self.key_bytes_remaining
    }

    /// Whether the used bytes were cut off the key file.
    #[must_use]
    pub const fn truncated(&self) -> bool {
        self.truncated
    }
}

/// Runs the whole protocol: open, validate, consume.
///
/// # Errors
///
/// See [`Reading::open`], [`Reading::validate`] and [`Validated::consume`].
pub fn apply(key_path: impl AsRef<Path>, message: Buffer, truncation: Truncation) -> Result<Consumed> {
    Reading::open(key_path, message, truncation)?
        .validate()?
        .consume()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::fs;
    use tempfile::tempdir;

    fn key_file(dir: &Path, bytes: &[u8]) -> PathBuf {
        let path = dir.join("key.pad");
        fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn states_advance_in_order() {
        let dir = tempdir().unwrap();
        let key: Vec<u8> = (0..32).collect();
        let path = key_file(dir.path(), &key);

        let message = Buffer::copy_from(b"sixteen byte msg").unwrap();
        let reading = Reading::open(&path, message, Truncation::Destroy).unwrap();
        assert_eq!(reading.required_key_len(), 16);

        let validated = reading.validate().unwrap();
        assert_eq!(validated.key_file_len(), 32);

        let consumed = validated.consume().unwrap();
        assert_eq!(consumed.bytes_consumed(), 16);
        assert_eq!(consumed.key_bytes_remaining(), 16);
        assert!(consumed.truncated());
        assert_eq!(consumed.key_path(), path.as_path());

        let expected: Vec<u8> = b"sixteen byte msg"
            .iter()
            .zip(&key[16..])
            .map(|(m, k)| m ^ k)
            .collect();
        assert_eq!(consumed.output().as_bytes(), &expected[..]);
        assert_eq!(fs::read(&path).unwrap(), &key[..16]);
    }

    #[test]
    fn keep_leaves_key_file_alone() {
        let dir = tempdir().unwrap();
        let path = key_file(dir.path(), b"abcdefgh");
        let consumed = apply(&path, Buffer::copy_from(b"xyz").unwrap(), Truncation::Keep).unwrap();
        assert!(!consumed.truncated());
        assert_eq!(consumed.key_bytes_remaining(), 8);
        assert_eq!(fs::read(&path).unwrap(), b"abcdefgh");
    }

    #[test]
    fn short_key_is_rejected_without_touching_file() {
        let dir = tempdir().unwrap();
        let path = key_file(dir.path(), b"short");
        let result = apply(
            &path,
            Buffer::copy_from(b"much longer message").unwrap(),
            Truncation::Destroy,
        );
        assert!(matches!(
            result,
            Err(Error::KeyTooShort {
                needed: 19,
                available: 5
            })
        ));
        assert_eq!(fs::read(&path).unwrap(), b"short");
    }

    #[test]
    fn missing_key_file_is_io_error() {
        let dir = tempdir().unwrap();
        let result = apply(
            dir.path().join("absent.pad"),
            Buffer::copy_from(b"m").unwrap(),
            Truncation::Destroy,
        );
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn empty_message_consumes_nothing() {
        let dir = tempdir().unwrap();
        let path = key_file(dir.path(), b"1234");
        let consumed = apply(&path, Buffer::allocate(0).unwrap(), Truncation::Destroy).unwrap();
        assert!(consumed.output().is_empty());
        assert_eq!(consumed.key_bytes_remaining(), 4);
        assert_eq!(fs::read(&path).unwrap(), b"1234");
    }

    #[test]
    fn failed_stage_keeps_key_file_intact() {
        let dir = tempdir().unwrap();
        let path = key_file(dir.path(), b"0123456789abcdef");
        let validated = Reading::open(&path, Buffer::copy_from(b"payload").unwrap(), Truncation::Destroy)
            .unwrap()
            .validate()
            .unwrap();

        let result = validated.consume_with(|_| -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no output dir").into())
        });
        assert!(matches!(result, Err(Error::Io(_))));
        assert_eq!(fs::read(&path).unwrap(), b"0123456789abcdef");
    }

    #[test]
    fn stage_sees_output_before_truncation() {
        let dir = tempdir().unwrap();
        let path = key_file(dir.path(), &[0xFF; 8]);
        let validated = Reading::open(&path, Buffer::copy_from(&[0x0F; 4]).unwrap(), Truncation::Destroy)
            .unwrap()
            .validate()
            .unwrap();

        let (consumed, seen) = validated
            .consume_with(|output| {
                let len = fs::metadata(&path).unwrap().len();
                Ok((output.as_bytes().to_vec(), len))
            })
            .unwrap();
        assert_eq!(seen.0, vec![0xF0; 4]);
        assert_eq!(seen.1, 8, "key file must still be whole while staging");
        assert_eq!(consumed.key_bytes_remaining(), 4);
        assert_eq!(fs::metadata(&path).unwrap().len(), 4);
    }

    #[test]
    fn flag_maps_to_policy() {
        assert_eq!(Truncation::from_flag(true), Truncation::Destroy);
        assert_eq!(Truncation::from_flag(false), Truncation::Keep);
    }
}
