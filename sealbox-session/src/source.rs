//! The single active input file.
//!
//! `InputSource` is the open handle; `SourceSlot` is the arena-of-one that
//! guarantees at most one live source per process and closes the previous
//! one on every replacement. Ownership transfer is explicit at the
//! `acquire`/`release` call sites instead of riding on a global kept alive
//! across dialog callbacks.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::SelectionError;
use sealbox_crypto::CIPHERTEXT_EXTENSION;

/// An open, readable input file.
#[derive(Debug)]
pub struct InputSource {
    file: File,
    path: PathBuf,
}

impl InputSource {
    /// Opens `path` for reading. Directories are rejected up front.
    pub fn open(path: &Path) -> Result<Self, SelectionError> {
        let file = File::open(path).map_err(SelectionError::OpenFailed)?;
        match file.metadata() {
            Ok(meta) if meta.is_dir() => Err(SelectionError::IsDirectory),
            _ => Ok(Self {
                file,
                path: path.to_owned(),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name shown in forms and dialogs.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Byte length when the source is a statable regular file, 0 when the
    /// size cannot be determined. A zero hint selects the indeterminate
    /// progress display.
    pub fn size_hint(&self) -> u64 {
        match self.file.metadata() {
            Ok(meta) if meta.is_file() => meta.len(),
            _ => 0,
        }
    }

    /// Seeks back to the start so a retained source can be retried.
    pub fn rewind(&mut self) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(0)).map(|_| ())
    }

    /// Whether the file name carries the standard ciphertext extension.
    pub fn has_ciphertext_extension(&self) -> bool {
        has_ciphertext_extension(&self.path)
    }
}

impl Read for InputSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

/// Case-insensitive check for the `.age` suffix.
pub fn has_ciphertext_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(CIPHERTEXT_EXTENSION))
}

/// Arena-of-one for the live input source.
#[derive(Debug, Default)]
pub struct SourceSlot {
    active: Option<InputSource>,
}

impl SourceSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens `path` as the new active source. A previously held source is
    /// closed first, even when the new open fails.
    pub fn acquire(&mut self, path: &Path) -> Result<&InputSource, SelectionError> {
        self.release();
        let source = InputSource::open(path)?;
        debug!(path = %source.path().display(), "input source acquired");
        Ok(self.active.insert(source))
    }

    /// Closes the active source. Idempotent: releasing an empty slot is a
    /// no-op.
    pub fn release(&mut self) {
        if let Some(source) = self.active.take() {
            debug!(path = %source.path().display(), "input source released");
        }
    }

    pub fn active(&self) -> Option<&InputSource> {
        self.active.as_ref()
    }

    pub fn active_mut(&mut self) -> Option<&mut InputSource> {
        self.active.as_mut()
    }
}
