mod mapped_file;
mod stream;

pub use mapped_file::MappedFile;
pub use stream::{CHUNK_SIZE, StreamReader};

use jpeghash_core::{
    CoreError, DigestAlgorithm, Fingerprint, FingerprintBuilder, IoStage, Result, ScanStats,
    TypeFilter,
};
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// An opened input: mapped when it is a regular file, streamed otherwise.
pub enum FileSource {
    Mapped(MappedFile),
    Stream(StreamReader),
}

impl FileSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| CoreError::io(IoStage::Open, path, e))?;
        let metadata = file
            .metadata()
            .map_err(|e| CoreError::io(IoStage::Stat, path, e))?;

        if metadata.is_file() {
            Ok(Self::Mapped(MappedFile::map(&file, metadata.len(), path)?))
        } else {
            Ok(Self::Stream(StreamReader::new(file)))
        }
    }

    #[inline]
    pub fn is_mmap(&self) -> bool {
        matches!(self, Self::Mapped(_))
    }

    /// Runs the segment scanner over the whole source.
    pub fn fingerprint(
        self,
        filter: &TypeFilter,
        algorithm: DigestAlgorithm,
        path: &Path,
    ) -> Result<(Fingerprint, ScanStats)> {
        let mut builder = FingerprintBuilder::new(algorithm, filter);
        match self {
            Self::Mapped(mapped) => builder.update(mapped.as_slice()),
            Self::Stream(mut reader) => {
                reader.feed(&mut builder, path)?;
            }
        }
        Ok(builder.finish())
    }
}

/// Opens `path`, scans it against `filter` and returns its fingerprint.
pub fn fingerprint_file(
    path: impl AsRef<Path>,
    filter: &TypeFilter,
    algorithm: DigestAlgorithm,
) -> Result<Fingerprint> {
    let path = path.as_ref();
    let source = FileSource::open(path)?;
    let mapped = source.is_mmap();
    let (fingerprint, stats) = source.fingerprint(filter, algorithm, path)?;

    debug!(
        path = %path.display(),
        mapped,
        scanned = stats.bytes_scanned,
        hashed = stats.bytes_hashed,
        "fingerprinted file"
    );

    Ok(fingerprint)
}
