//! Chunked reads for sources that cannot be memory-mapped.

use jpeghash_core::{CoreError, FingerprintBuilder, IoStage, Result};
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

pub const CHUNK_SIZE: usize = 64 * 1024;

/// Sequential reader for pipes, character devices and other unmappable files.
pub struct StreamReader {
    inner: BufReader<File>,
}

impl StreamReader {
    pub fn new(file: File) -> Self {
        Self {
            inner: BufReader::with_capacity(CHUNK_SIZE, file),
        }
    }

    /// Feeds everything left in the source into `builder`, returning the
    /// number of bytes read.
    pub fn feed(&mut self, builder: &mut FingerprintBuilder<'_>, path: &Path) -> Result<u64> {
        let mut buffer = vec![0u8; CHUNK_SIZE];
        let mut total = 0u64;

        loop {
            let n = match self.inner.read(&mut buffer) {
                Ok(0) => return Ok(total),
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(CoreError::io(IoStage::Read, path, e)),
            };
            builder.update(&buffer[..n]);
            total += n as u64;
        }
    }
}
