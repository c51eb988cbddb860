use jpeghash_core::{CoreError, IoStage, Result};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

/// Read-only memory view of a regular file.
///
/// Zero-length files are represented without a mapping. The mapping is
/// released when the value is dropped.
pub struct MappedFile {
    mmap: Option<Mmap>,
}

impl MappedFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| CoreError::io(IoStage::Open, path, e))?;
        let len = file
            .metadata()
            .map_err(|e| CoreError::io(IoStage::Stat, path, e))?
            .len();

        Self::map(&file, len, path)
    }

    pub(crate) fn map(file: &File, len: u64, path: &Path) -> Result<Self> {
        if len == 0 {
            return Ok(Self { mmap: None });
        }

        // SAFETY: the mapping is read-only and lives no longer than `self`.
        let mmap =
            unsafe { Mmap::map(file) }.map_err(|e| CoreError::io(IoStage::Map, path, e))?;

        #[cfg(target_os = "linux")]
        {
            use memmap2::Advice;
            let _ = mmap.advise(Advice::Sequential);
        }

        Ok(Self { mmap: Some(mmap) })
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
