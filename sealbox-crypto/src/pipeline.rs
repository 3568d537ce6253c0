//! One-shot streaming encrypt and decrypt runs.
//!
//! A run goes through key setup (deriving the age scrypt recipient or
//! identity from the password) and then streams the payload with a chunked
//! copy, so memory stays flat regardless of file size. For decryption, key
//! setup alone does not prove the password right or wrong; that is only
//! discovered when the container header is processed.

use std::io::{ErrorKind, Read, Write};
use std::iter;

use age::secrecy::SecretString;
use tracing::{debug, info};

use crate::error::{PipelineError, PipelineResult};
use crate::progress::{MeteredReader, MeteredWriter, ProgressMeter, ProgressSink};

/// File-name extension of the ciphertext container format.
pub const CIPHERTEXT_EXTENSION: &str = "age";

/// Chunk size of the streaming copy loop.
const COPY_CHUNK_SIZE: usize = 64 * 1024;

/// Direction of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Encrypt,
    Decrypt,
}

/// Runs one complete transfer in the given direction.
///
/// `total_hint` is the source size in bytes, or 0 when unknown; it only
/// affects progress reporting, never correctness.
pub fn run<R: Read, W: Write>(
    mode: Mode,
    source: &mut R,
    dest: &mut W,
    password: &str,
    total_hint: u64,
    sink: &mut dyn ProgressSink,
) -> PipelineResult<()> {
    info!(?mode, total_hint, "starting transfer");
    let outcome = match mode {
        Mode::Encrypt => encrypt_stream(source, dest, password, total_hint, sink),
        Mode::Decrypt => decrypt_stream(source, dest, password, total_hint, sink),
    };
    match &outcome {
        Ok(()) => info!(?mode, "transfer complete"),
        Err(err) => debug!(?mode, %err, "transfer failed"),
    }
    outcome
}

/// Encrypts `source` into `dest` with a password-derived recipient.
///
/// The destination side is metered: progress reflects plaintext accepted by
/// the age transform, measured against the plaintext size hint. The stream
/// is finalized with its trailing authentication chunk before the run
/// reports success.
pub fn encrypt_stream<R: Read, W: Write>(
    source: &mut R,
    dest: &mut W,
    password: &str,
    total_hint: u64,
    sink: &mut dyn ProgressSink,
) -> PipelineResult<()> {
    let recipient = age::scrypt::Recipient::new(SecretString::from(password.to_owned()));
    let encryptor = age::Encryptor::with_recipients(iter::once(&recipient as &dyn age::Recipient))
        .map_err(map_encrypt_error)?;
    let writer = encryptor
        .wrap_output(&mut *dest)
        .map_err(PipelineError::DestinationWrite)?;

    let mut metered = MeteredWriter::new(writer, ProgressMeter::new(total_hint, sink));
    copy_chunked(source, &mut metered)?;
    metered
        .into_inner()
        .finish()
        .map_err(PipelineError::DestinationWrite)?;
    dest.flush().map_err(PipelineError::DestinationWrite)?;
    Ok(())
}

/// Decrypts `source` into `dest` with a password-derived identity.
///
/// The source side is metered: progress reflects ciphertext consumed,
/// measured against the ciphertext size hint. A password that unlocks no
/// identity of the container surfaces as [`PipelineError::WrongPassword`]
/// before any plaintext is produced.
pub fn decrypt_stream<R: Read, W: Write>(
    source: &mut R,
    dest: &mut W,
    password: &str,
    total_hint: u64,
    sink: &mut dyn ProgressSink,
) -> PipelineResult<()> {
    let metered = MeteredReader::new(&mut *source, ProgressMeter::new(total_hint, sink));
    let decryptor = age::Decryptor::new(metered).map_err(map_decrypt_error)?;

    let identity = age::scrypt::Identity::new(SecretString::from(password.to_owned()));
    let mut reader = decryptor
        .decrypt(iter::once(&identity as &dyn age::Identity))
        .map_err(map_decrypt_error)?;

    copy_chunked(&mut reader, &mut *dest)?;
    dest.flush().map_err(PipelineError::DestinationWrite)?;
    Ok(())
}

/// Pumps `source` into `dest` in fixed-size chunks, telling read failures
/// apart from write failures.
fn copy_chunked<R: Read + ?Sized, W: Write + ?Sized>(
    source: &mut R,
    dest: &mut W,
) -> PipelineResult<u64> {
    let mut buf = vec![0u8; COPY_CHUNK_SIZE];
    let mut moved = 0u64;
    loop {
        let n = match source.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(PipelineError::SourceRead(err)),
        };
        dest.write_all(&buf[..n])
            .map_err(PipelineError::DestinationWrite)?;
        moved += n as u64;
    }
    Ok(moved)
}

fn map_encrypt_error(err: age::EncryptError) -> PipelineError {
    match err {
        age::EncryptError::Io(err) => PipelineError::DestinationWrite(err),
        other => PipelineError::Crypto(other.to_string()),
    }
}

fn map_decrypt_error(err: age::DecryptError) -> PipelineError {
    match err {
        // "No matching identity": the distinguished wrong-password signal.
        age::DecryptError::NoMatchingKeys | age::DecryptError::DecryptionFailed => {
            PipelineError::WrongPassword
        }
        age::DecryptError::Io(err) => PipelineError::SourceRead(err),
        other => PipelineError::Crypto(other.to_string()),
    }
}
