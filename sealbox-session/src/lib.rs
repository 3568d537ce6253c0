//! Session state for Sealbox.
//!
//! Two concerns live here: the exclusively owned input file (at most one
//! live handle per process, released on every exit path) and the modal
//! navigation state machine that routes keyboard input and dialog outcomes
//! to screen transitions.

mod error;
mod nav;
mod source;

pub use error::{SelectionError, ValidationError};
pub use nav::{Effect, Key, Navigator, Overlay, RunReport, Screen};
pub use source::{InputSource, SourceSlot, has_ciphertext_extension};
