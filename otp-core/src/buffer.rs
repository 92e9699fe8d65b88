// File:    buffer.rs
// Author:  apezoo
// Date:    2025-08-02
//
// Description: Length-tagged, heap-owned byte buffer used by every other module, including word-wise XOR.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! Owned byte buffers with an explicit length.
//!
//! A [`Buffer`] keeps its declared length separate from its storage. Storage is
//! always a whole number of 64-bit words and everything past the declared
//! length is zero, which lets [`Buffer::xor`] work a word at a time without
//! ever touching bytes the buffer does not own. The contents are wiped when a
//! buffer is dropped or shrunk, since buffers routinely carry key material.

use std::fmt;
use std::ops::{Deref, DerefMut};

use zeroize::Zeroize;

use crate::error::{Error, Result};

const WORD: usize = std::mem::size_of::<u64>();

/// An owned, contiguous byte sequence with an explicit length.
pub struct Buffer {
    len: usize,
    storage: Vec<u8>,
}

/// Rounds `len` up to a whole number of words.
fn storage_len(len: usize) -> Result<usize> {
    len.checked_next_multiple_of(WORD)
        .ok_or(Error::OutOfMemory { requested: len })
}

/// Extends `storage` to `target` bytes, zero-filling the new part.
fn grow_zeroed(storage: &mut Vec<u8>, target: usize) -> Result<()> {
    let additional = target.saturating_sub(storage.len());
    storage
        .try_reserve_exact(additional)
        .map_err(|_| Error::OutOfMemory { requested: target })?;
    storage.resize(target, 0);
    Ok(())
}

impl Buffer {
    /// Allocates a zero-filled buffer of `len` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the storage cannot be reserved.
    pub fn allocate(len: usize) -> Result<Self> {
        let mut storage = Vec::new();
        grow_zeroed(&mut storage, storage_len(len)?)?;
        Ok(Self { len, storage })
    }

    /// Copies `bytes` into a new owned buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the storage cannot be reserved.
    pub fn copy_from(bytes: &[u8]) -> Result<Self> {
        let mut buffer = Self::allocate(bytes.len())?;
        buffer.copy_from_slice(bytes);
        Ok(buffer)
    }

    /// Changes the declared length to `new_len`.
    ///
    /// Growing keeps the existing bytes and zero-fills the new tail. Shrinking
    /// wipes everything past `new_len`; that data cannot be recovered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if growing the storage fails.
    pub fn resize(mut self, new_len: usize) -> Result<Self> {
        let target = storage_len(new_len)?;
        if new_len < self.len {
            self.storage[new_len..].zeroize();
            self.storage.truncate(target);
        } else {
            grow_zeroed(&mut self.storage, target)?;
        }
        self.len = new_len;
        Ok(self)
    }

    /// Returns a new buffer holding `a`'s bytes followed by `b`'s.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the combined buffer cannot be reserved.
    pub fn concatenate(a: &[u8], b: &[u8]) -> Result<Self> {
        let total = a
            .len()
            .checked_add(b.len())
            .ok_or(Error::OutOfMemory { requested: usize::MAX })?;
        let mut buffer = Self::allocate(total)?;
        buffer[..a.len()].copy_from_slice(a);
        buffer[a.len()..].copy_from_slice(b);
        Ok(buffer)
    }

    /// XORs two buffers of equal length into a new buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] if the lengths differ, or
    /// [`Error::OutOfMemory`] if the result cannot be allocated.
    pub fn xor(a: &Self, b: &Self) -> Result<Self> {
        if a.len != b.len {
            return Err(Error::LengthMismatch {
                left: a.len,
                right: b.len,
            });
        }
        let mut out = Self::allocate(a.len)?;
        // Equal lengths imply equal, word-aligned storage with zeroed tails.
        for ((dst, x), y) in out
            .storage
            .chunks_exact_mut(WORD)
            .zip(a.storage.chunks_exact(WORD))
            .zip(b.storage.chunks_exact(WORD))
        {
            let word = load_word(x) ^ load_word(y);
            dst.copy_from_slice(&word.to_ne_bytes());
        }
        Ok(out)
    }

    /// Number of bytes in the buffer.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer holds no bytes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The buffer's contents.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.storage[..self.len]
    }

    /// The buffer's contents, mutably.
    #[must_use]
    pub fn as_mut_bytes(&mut self) -> &mut [u8] {
        &mut self.storage[..self.len]
    }
}

const fn load_word(chunk: &[u8]) -> u64 {
    u64::from_ne_bytes([
        chunk[0], chunk[1], chunk[2], chunk[3], chunk[4], chunk[5], chunk[6], chunk[7],
    ])
}

impl Drop for Buffer {
    fn drop(&mut self) {
        self.storage.zeroize();
    }
}

impl Deref for Buffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl DerefMut for Buffer {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.as_mut_bytes()
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl PartialEq for Buffer {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for Buffer {}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Contents are frequently secret; only the length is printed.
        f.debug_struct("Buffer")
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}
