// File:    stream.rs
// Author:  apezoo
// Date:    2025-08-04
//
// Description: Reading messages and key tails into buffers, and shrinking key files.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! I/O collaborators used by the key-consumption protocol and the CLI.

use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

use log::debug;

use crate::buffer::Buffer;
use crate::error::{Error, Result};

/// First allocation when reading a stream of unknown length.
const INITIAL_CHUNK: usize = 4096;

/// Reads `reader` to end of input, growing the buffer as data arrives.
///
/// # Errors
///
/// Returns [`Error::Io`] if a read fails or [`Error::OutOfMemory`] if the
/// buffer cannot grow.
pub fn read_all<R: Read>(mut reader: R) -> Result<Buffer> {
    let mut buffer = Buffer::allocate(INITIAL_CHUNK)?;
    let mut filled = 0;
    loop {
        if filled == buffer.len() {
            let grown = buffer.len().saturating_mul(2);
            buffer = buffer.resize(grown)?;
        }
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    debug!("Read {filled} bytes from stream.");
    buffer.resize(filled)
}

/// Reads a whole file in one pass, sized from its metadata.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be opened or read, or
/// [`Error::OutOfMemory`] if it does not fit in memory.
pub fn read_file(path: &Path) -> Result<Buffer> {
    let mut file = File::open(path)?;
    let size = file_len(&file)?;
    let len = usize::try_from(size).map_err(|_| Error::OutOfMemory { requested: usize::MAX })?;
    let mut buffer = Buffer::allocate(len)?;
    file.read_exact(&mut buffer)?;
    debug!("Read {len} bytes from '{}'.", path.display());
    Ok(buffer)
}

/// Current size of `file` in bytes.
///
/// # Errors
///
/// Returns [`Error::Io`] if the metadata cannot be read.
pub fn file_len(file: &File) -> Result<u64> {
    Ok(file.metadata()?.len())
}

/// Reads the last `n` bytes of `file`.
///
/// # Errors
///
/// Returns [`Error::KeyTooShort`] if the file holds fewer than `n` bytes,
/// [`Error::Io`] on read failure, or [`Error::OutOfMemory`].
pub fn read_file_end(file: &mut File, n: usize) -> Result<Buffer> {
    let available = file_len(file)?;
    let needed = n as u64;
    if available < needed {
        return Err(Error::KeyTooShort { needed, available });
    }
    let mut buffer = Buffer::allocate(n)?;
    file.seek(SeekFrom::Start(available - needed))?;
    file.read_exact(&mut buffer)?;
    Ok(buffer)
}

/// Shrinks `file` to `new_size` bytes and flushes the change to disk.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be truncated or synced.
pub fn truncate(file: &File, new_size: u64) -> Result<()> {
    file.set_len(new_size)?;
    file.sync_all()?;
    Ok(())
}
