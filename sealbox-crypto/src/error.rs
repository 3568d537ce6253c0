//! Error types for pipeline runs.

use std::io;

use thiserror::Error;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Terminal failure of a single encrypt or decrypt run.
///
/// The read/write split matters to the caller: a destination-write failure
/// means the source stream was consumed past the point of safe reuse, while
/// every other failure leaves the source retryable after a rewind.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The supplied password does not correspond to any identity of the
    /// ciphertext. Kept apart from generic I/O failures because it is the
    /// most common and most actionable failure mode.
    #[error("wrong password")]
    WrongPassword,

    /// Reading or decrypting the source stream failed.
    #[error("{0}")]
    SourceRead(io::Error),

    /// Writing or finalizing the destination stream failed.
    #[error("{0}")]
    DestinationWrite(io::Error),

    /// Key setup or container-format failure in the crypto layer.
    #[error("{0}")]
    Crypto(String),
}

impl PipelineError {
    /// True when the failure happened on the destination-write side, after
    /// the source had already been partially consumed.
    pub fn is_destination_write(&self) -> bool {
        matches!(self, PipelineError::DestinationWrite(_))
    }
}
