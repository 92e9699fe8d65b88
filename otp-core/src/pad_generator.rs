// File:    pad_generator.rs
// Author:  apezoo
// Date:    2025-07-17
//
// Description: Provides functionality for generating high-quality key files for one-time-pad use.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

use log::info;
use rand::{TryRngCore, rngs::OsRng};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::buffer::Buffer;
use crate::error::Result;

/// Creates a new key file of `size` random bytes drawn from the OS RNG.
///
/// An existing file is never overwritten.
///
/// # Errors
///
/// Returns an error if the file already exists, cannot be written, or the
/// RNG fails.
pub fn generate_pad(path: &Path, size: usize) -> Result<()> {
    let mut rng = OsRng;
    let mut buffer = Buffer::allocate(size)?;
    // Use the failable `try_fill_bytes` and map the error to an `io::Error`.
    rng.try_fill_bytes(&mut buffer)
        .map_err(std::io::Error::other)?;

    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    file.write_all(&buffer)?;
    file.sync_all()?;
    info!("Wrote {size} bytes of key material to '{}'.", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::tempdir;

    #[test]
    fn creates_file_of_requested_size() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fresh.pad");
        generate_pad(&path, 4096).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 4096);
        // 4 KiB of OS randomness being all zero would mean the fill never happened.
        assert!(bytes.iter().any(|&b| b != 0));
    }

    #[test]
    fn refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("existing.pad");
        std::fs::write(&path, b"old key").unwrap();
        let result = generate_pad(&path, 16);
        assert!(matches!(result, Err(Error::Io(_))));
        assert_eq!(std::fs::read(&path).unwrap(), b"old key");
    }
}
