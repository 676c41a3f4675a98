//! Temporary on-disk staging of downloaded audio

use crate::error::ResourceError;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Where staging files are created
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self {
            dir: dir.unwrap_or_else(std::env::temp_dir),
        }
    }

    /// Create an empty staging file
    ///
    /// `extension` becomes the file suffix so the decoder can use it as a hint.
    pub fn acquire(&self, extension: Option<&str>) -> Result<StagedFile, ResourceError> {
        let suffix = extension.map(|ext| format!(".{}", ext)).unwrap_or_default();

        let file = tempfile::Builder::new()
            .prefix("rhythm-")
            .suffix(&suffix)
            .tempfile_in(&self.dir)
            .map_err(|source| ResourceError::Acquire {
                dir: self.dir.display().to_string(),
                source,
            })?;

        log::debug!("Staging file created: {:?}", file.path());
        Ok(StagedFile { file, written: 0 })
    }
}

/// A staging file owned by exactly one request
///
/// Call [`release`](StagedFile::release) to delete it and observe failures.
/// If it is dropped instead (e.g. while unwinding) the file is still removed.
pub struct StagedFile {
    file: NamedTempFile,
    written: u64,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Bytes written so far
    pub fn len(&self) -> u64 {
        self.written
    }

    pub fn is_empty(&self) -> bool {
        self.written == 0
    }

    pub fn write_chunk(&mut self, bytes: &[u8]) -> Result<(), ResourceError> {
        self.file.write_all(bytes).map_err(ResourceError::Write)?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), ResourceError> {
        self.file.flush().map_err(ResourceError::Write)
    }

    /// Delete the staging file
    pub fn release(self) -> Result<(), ResourceError> {
        let path = self.file.path().display().to_string();
        match self.file.close() {
            Ok(()) => {
                log::debug!("Staging file released: {}", path);
                Ok(())
            }
            Err(source) => Err(ResourceError::Release { path, source }),
        }
    }
}
