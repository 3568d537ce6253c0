//! Modal navigation state machine.
//!
//! Every keyboard event and every dialog-completion callback goes through a
//! single dispatch that consults the current `(screen, overlay)` pair, so
//! key routing always matches the topmost modal overlay. The navigator also
//! owns the input slot: every path that leaves a screen where the source was
//! in use releases it here, and nowhere else.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{SelectionError, ValidationError};
use crate::source::{InputSource, SourceSlot};
use sealbox_crypto::{CIPHERTEXT_EXTENSION, Mode, PipelineError};

/// The screen currently underneath any overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    EncryptForm,
    DecryptForm,
}

/// The modal overlay currently owning keyboard input, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    None,
    FilePicker,
    SaveDialog,
    Progress,
    Error(String),
    Success(RunReport),
    About,
}

/// Paths of a completed run, shown in the success dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub mode: Mode,
    pub input: PathBuf,
    pub output: PathBuf,
}

/// The keyboard surface. Nothing else is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    E,
    D,
    H,
    F1,
    Q,
    Escape,
}

/// Instruction for the shell after a state transition.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    Quit,
    OpenFilePicker,
    OpenSaveDialog { suggested_name: String },
    StartRun { mode: Mode, dest: PathBuf },
}

#[derive(Debug)]
struct PendingRun {
    mode: Mode,
    dest: PathBuf,
}

/// Screen/overlay state plus the exclusively owned input source.
#[derive(Debug)]
pub struct Navigator {
    screen: Screen,
    overlay: Overlay,
    slot: SourceSlot,
    pending: Option<PendingRun>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            screen: Screen::Menu,
            overlay: Overlay::None,
            slot: SourceSlot::new(),
            pending: None,
        }
    }

    /// Starts the session with a file supplied on the command line. The
    /// screen fast-forwards to the form matching the file's suffix; an
    /// unopenable path falls back to the plain menu.
    pub fn with_startup_file(path: &Path) -> Self {
        let mut nav = Self::new();
        match nav.slot.acquire(path) {
            Ok(source) => {
                nav.screen = if source.has_ciphertext_extension() {
                    Screen::DecryptForm
                } else {
                    Screen::EncryptForm
                };
            }
            Err(err) => {
                debug!(path = %path.display(), %err, "startup file not usable");
            }
        }
        nav
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn source(&self) -> Option<&InputSource> {
        self.slot.active()
    }

    pub fn source_mut(&mut self) -> Option<&mut InputSource> {
        self.slot.active_mut()
    }

    /// Direction of the run currently in flight, if any.
    pub fn pending_mode(&self) -> Option<Mode> {
        self.pending.as_ref().map(|run| run.mode)
    }

    // ── keyboard ─────────────────────────────────────────────────────

    /// Routes one keypress according to the current screen and overlay.
    pub fn handle_key(&mut self, key: Key) -> Effect {
        // Quit is honored from every state, dialogs included.
        if key == Key::Q {
            info!("quit requested");
            return Effect::Quit;
        }
        if matches!(self.overlay, Overlay::None) {
            return self.handle_screen_key(key);
        }
        // An in-flight transfer cannot be cancelled; every other overlay
        // dismisses on Escape.
        if key == Key::Escape && !matches!(self.overlay, Overlay::Progress) {
            self.dismiss_overlay();
        }
        Effect::None
    }

    fn handle_screen_key(&mut self, key: Key) -> Effect {
        match (self.screen, key) {
            (Screen::Menu, Key::E) => self.screen = Screen::EncryptForm,
            (Screen::Menu, Key::D) => self.screen = Screen::DecryptForm,
            (Screen::Menu, Key::H | Key::F1) => self.overlay = Overlay::About,
            (Screen::EncryptForm | Screen::DecryptForm, Key::Escape) => self.back_to_menu(),
            _ => {}
        }
        Effect::None
    }

    /// Closes the topmost overlay; key routing falls back to the underlying
    /// screen. Dismissing the success dialog also resets to the menu. The
    /// progress overlay is not dismissible.
    pub fn dismiss_overlay(&mut self) {
        match std::mem::replace(&mut self.overlay, Overlay::None) {
            Overlay::Success(_) => self.back_to_menu(),
            Overlay::Progress => self.overlay = Overlay::Progress,
            _ => {}
        }
    }

    fn back_to_menu(&mut self) {
        self.slot.release();
        self.screen = Screen::Menu;
        self.overlay = Overlay::None;
    }

    // ── file selection ───────────────────────────────────────────────

    /// Requests the native open dialog for the current form.
    pub fn open_file_picker(&mut self) -> Effect {
        if self.screen == Screen::Menu || !matches!(self.overlay, Overlay::None) {
            return Effect::None;
        }
        self.overlay = Overlay::FilePicker;
        Effect::OpenFilePicker
    }

    /// Outcome of the native open dialog. `None` means the user aborted;
    /// the current selection stays as it is.
    pub fn file_picked(&mut self, picked: Option<PathBuf>) {
        if matches!(self.overlay, Overlay::FilePicker) {
            self.overlay = Overlay::None;
        }
        let Some(path) = picked else { return };
        if let Err(err) = self.slot.acquire(&path) {
            self.overlay = Overlay::Error(err.to_string());
        }
    }

    /// Handles a drag-and-drop of file paths. Exactly one regular file is
    /// accepted and routed to the matching form by its suffix; anything
    /// else surfaces a selection error over the menu without touching the
    /// stored source.
    pub fn files_dropped(&mut self, paths: &[PathBuf]) {
        if matches!(self.overlay, Overlay::Progress) {
            return;
        }
        if paths.len() != 1 {
            self.screen = Screen::Menu;
            self.overlay = Overlay::Error(SelectionError::MultipleFiles.to_string());
            return;
        }
        let path = &paths[0];
        if path.is_dir() {
            self.screen = Screen::Menu;
            self.overlay = Overlay::Error(SelectionError::IsDirectory.to_string());
            return;
        }
        match self.slot.acquire(path) {
            Ok(source) => {
                self.screen = if source.has_ciphertext_extension() {
                    Screen::DecryptForm
                } else {
                    Screen::EncryptForm
                };
                self.overlay = Overlay::None;
            }
            Err(err) => {
                self.screen = Screen::Menu;
                self.overlay = Overlay::Error(err.to_string());
            }
        }
    }

    // ── form submission ──────────────────────────────────────────────

    /// Validates the encrypt form and, when it passes, requests the save
    /// dialog. Validation failures surface on the current screen and keep
    /// the selected file; the destination is never touched before they
    /// pass.
    pub fn submit_encrypt(&mut self, password: &str, confirm: &str) -> Effect {
        if !matches!(self.overlay, Overlay::None) {
            return Effect::None;
        }
        if self.slot.active().is_none() {
            return self.reject(SelectionError::NothingSelected.to_string());
        }
        if password.is_empty() {
            return self.reject(ValidationError::EmptyPassword.to_string());
        }
        if password != confirm {
            return self.reject(ValidationError::PasswordMismatch.to_string());
        }
        self.request_save_dialog(Mode::Encrypt)
    }

    /// Validates the decrypt form; same checks as encrypt minus the
    /// confirmation password.
    pub fn submit_decrypt(&mut self, password: &str) -> Effect {
        if !matches!(self.overlay, Overlay::None) {
            return Effect::None;
        }
        if self.slot.active().is_none() {
            return self.reject(SelectionError::NothingSelected.to_string());
        }
        if password.is_empty() {
            return self.reject(ValidationError::EmptyPassword.to_string());
        }
        self.request_save_dialog(Mode::Decrypt)
    }

    fn reject(&mut self, message: String) -> Effect {
        self.overlay = Overlay::Error(message);
        Effect::None
    }

    fn request_save_dialog(&mut self, mode: Mode) -> Effect {
        let Some(source) = self.slot.active() else {
            return Effect::None;
        };
        let name = source.display_name();
        let suggested_name = match mode {
            Mode::Encrypt => format!("{name}.{CIPHERTEXT_EXTENSION}"),
            Mode::Decrypt => strip_ciphertext_extension(&name),
        };
        self.overlay = Overlay::SaveDialog;
        Effect::OpenSaveDialog { suggested_name }
    }

    // ── run lifecycle ────────────────────────────────────────────────

    /// Outcome of the native save dialog. `None` is a silent abort back to
    /// the form; a chosen path starts the transfer under the progress
    /// overlay.
    pub fn save_dialog_closed(&mut self, dest: Option<PathBuf>) -> Effect {
        if matches!(self.overlay, Overlay::SaveDialog) {
            self.overlay = Overlay::None;
        }
        let Some(dest) = dest else {
            return Effect::None;
        };
        let mode = match self.screen {
            Screen::EncryptForm => Mode::Encrypt,
            Screen::DecryptForm => Mode::Decrypt,
            Screen::Menu => return Effect::None,
        };
        self.pending = Some(PendingRun {
            mode,
            dest: dest.clone(),
        });
        self.overlay = Overlay::Progress;
        Effect::StartRun { mode, dest }
    }

    /// The destination file could not be created. Nothing has been consumed
    /// from the source yet, so it stays selected for a retry.
    pub fn destination_open_failed(&mut self, err: &io::Error) {
        self.pending = None;
        self.overlay = Overlay::Error(format!("could not write new file: {err}"));
    }

    /// Terminal outcome callback from the pipeline.
    ///
    /// Success releases the source and shows the report. A failure keeps
    /// the source selected for a retry with a corrected password, rewound
    /// to the start. The exception is a destination-write failure: the
    /// stream is past safe reuse and must be released too.
    pub fn run_finished(&mut self, outcome: Result<(), PipelineError>) {
        let Some(run) = self.pending.take() else {
            self.overlay = Overlay::None;
            return;
        };
        match outcome {
            Ok(()) => {
                let input = self
                    .slot
                    .active()
                    .map(|source| source.path().to_owned())
                    .unwrap_or_default();
                self.slot.release();
                self.overlay = Overlay::Success(RunReport {
                    mode: run.mode,
                    input,
                    output: run.dest,
                });
            }
            Err(err) => {
                let message = match run.mode {
                    Mode::Encrypt => format!("could not encrypt file: {err}"),
                    Mode::Decrypt => format!("could not decrypt file: {err}"),
                };
                if err.is_destination_write() {
                    self.slot.release();
                } else if let Some(source) = self.slot.active_mut() {
                    if let Err(seek_err) = source.rewind() {
                        warn!(error = %seek_err, "input not rewindable after failed run, releasing");
                        self.slot.release();
                    }
                }
                self.overlay = Overlay::Error(message);
            }
        }
    }
}

/// Strips a trailing `.age` (case-insensitive) from a suggested file name.
fn strip_ciphertext_extension(name: &str) -> String {
    let suffix = format!(".{CIPHERTEXT_EXTENSION}");
    if name.len() > suffix.len() && name.to_ascii_lowercase().ends_with(&suffix) {
        name[..name.len() - suffix.len()].to_owned()
    } else {
        name.to_owned()
    }
}
