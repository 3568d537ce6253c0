//! Streaming passphrase encryption for Sealbox.
//!
//! This crate performs one encrypt or decrypt transfer at a time: it derives
//! an age scrypt recipient or identity from the password, pumps bytes from a
//! source stream to a destination stream through the age transform, and
//! reports throttled progress fractions while doing so. Screens, dialogs and
//! file ownership live elsewhere; nothing here knows about the UI.

mod error;
mod pipeline;
mod progress;

pub use error::{PipelineError, PipelineResult};
pub use pipeline::{CIPHERTEXT_EXTENSION, Mode, decrypt_stream, encrypt_stream, run};
pub use progress::{MeteredReader, MeteredWriter, ProgressMeter, ProgressSink};
