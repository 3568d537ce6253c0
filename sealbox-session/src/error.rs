//! Error types for file selection and form validation.
//!
//! Both kinds are recoverable: they surface as a dialog on the current
//! screen and never discard an already-selected input file.

use std::io;

use thiserror::Error;

/// Errors raised while choosing the input file.
#[derive(Debug, Error)]
pub enum SelectionError {
    /// A form was submitted with no file selected.
    #[error("no input file selected")]
    NothingSelected,

    /// A directory was chosen; only single files can be processed.
    #[error("directories cannot be encrypted, only single files")]
    IsDirectory,

    /// More than one file was dropped at once.
    #[error("drop a single file to encrypt or decrypt it")]
    MultipleFiles,

    /// The underlying open failed (permissions, not found, device error).
    #[error("could not open file: {0}")]
    OpenFailed(io::Error),
}

/// Errors raised by local form validation, before any file I/O happens.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("password is empty")]
    EmptyPassword,

    #[error("passwords do not match")]
    PasswordMismatch,
}
