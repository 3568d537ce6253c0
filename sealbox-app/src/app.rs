//! The egui shell.
//!
//! Rendering is driven entirely by the navigator's `(screen, overlay)`
//! state: the shell forwards keys, drops, clicks and native-dialog outcomes
//! to `sealbox-session` and executes the effects it returns. The streaming
//! transfer runs synchronously inside the frame that triggered it; there is
//! no background thread and no operation queue.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use eframe::egui;
use sealbox_crypto::Mode;
use sealbox_session::{Effect, Key, Navigator, Overlay, Screen};
use zeroize::Zeroize;

const ENCRYPT_EXPLANATION: &str = "Use encryption to protect files\n\
                                   from unauthorized access by\n\
                                   locking them with a password.";

const DECRYPT_EXPLANATION: &str = "Use decryption to regain access\n\
                                   to previously encrypted files by\n\
                                   providing the password.";

const ABOUT_TEXT: &str = "Sealbox allows you to en- and decrypt files with passwords.\n\n\
                          It uses the age file format and is compatible with other \
                          software using this format.";

const SELECT_FILE_LABEL: &str = "Select input file";

/// What a widget interaction asks the shell to do after the frame's
/// panels have been laid out. Collected first, dispatched once, so the
/// navigator is never borrowed from inside a closure that also draws.
enum Click {
    None,
    MenuEncrypt,
    MenuDecrypt,
    MenuAbout,
    BackToMenu,
    PickFile,
    Submit,
    DismissOverlay,
}

pub struct SealboxApp {
    nav: Navigator,
    password: String,
    confirm: String,
    progress: f32,
}

impl SealboxApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, startup_file: Option<PathBuf>) -> Self {
        let nav = match startup_file {
            Some(path) => Navigator::with_startup_file(&path),
            None => Navigator::new(),
        };
        Self {
            nav,
            password: String::new(),
            confirm: String::new(),
            progress: 0.0,
        }
    }

    // ── input plumbing ───────────────────────────────────────────────

    fn collect_keys(ctx: &egui::Context) -> Vec<Key> {
        // Letter shortcuts stay quiet while a text field is being edited.
        let typing = ctx.memory(|m| m.focused().is_some());
        ctx.input(|i| {
            let mut keys = Vec::new();
            if !typing {
                for (egui_key, key) in [
                    (egui::Key::E, Key::E),
                    (egui::Key::D, Key::D),
                    (egui::Key::H, Key::H),
                    (egui::Key::Q, Key::Q),
                    (egui::Key::Escape, Key::Escape),
                ] {
                    if i.key_pressed(egui_key) {
                        keys.push(key);
                    }
                }
            }
            if i.key_pressed(egui::Key::F1) {
                keys.push(Key::F1);
            }
            keys
        })
    }

    fn collect_drops(ctx: &egui::Context) -> Vec<PathBuf> {
        ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|file| file.path.clone())
                .collect()
        })
    }

    fn apply_effect(&mut self, effect: Effect, ctx: &egui::Context) {
        match effect {
            Effect::None => {}
            Effect::Quit => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
            Effect::OpenFilePicker => {
                let picked = rfd::FileDialog::new().pick_file();
                self.nav.file_picked(picked);
            }
            Effect::OpenSaveDialog { suggested_name } => {
                let mut dialog = rfd::FileDialog::new().set_file_name(&suggested_name);
                if let Some(dir) = self.nav.source().and_then(|s| s.path().parent()) {
                    dialog = dialog.set_directory(dir);
                }
                let dest = dialog.save_file();
                let next = self.nav.save_dialog_closed(dest);
                self.apply_effect(next, ctx);
            }
            Effect::StartRun { mode, dest } => self.run_pipeline(mode, dest),
        }
    }

    /// Executes one transfer, blocking the event loop until it finishes.
    fn run_pipeline(&mut self, mode: Mode, dest: PathBuf) {
        self.progress = 0.0;
        let file = match File::create(&dest) {
            Ok(file) => file,
            Err(err) => {
                self.nav.destination_open_failed(&err);
                return;
            }
        };
        let mut out = BufWriter::new(file);

        let outcome = {
            let Self {
                nav,
                password,
                progress,
                ..
            } = self;
            let Some(source) = nav.source_mut() else {
                return;
            };
            let total = source.size_hint();
            let mut sink = |fraction: f64| *progress = fraction as f32;
            sealbox_crypto::run(mode, source, &mut out, password.as_str(), total, &mut sink)
        };
        self.nav.run_finished(outcome);
        if matches!(self.nav.overlay(), Overlay::Success(_)) {
            self.clear_passwords();
        }
    }

    fn clear_passwords(&mut self) {
        self.password.zeroize();
        self.confirm.zeroize();
    }

    fn dispatch(&mut self, click: Click, ctx: &egui::Context) {
        let effect = match click {
            Click::None => Effect::None,
            Click::MenuEncrypt => self.nav.handle_key(Key::E),
            Click::MenuDecrypt => self.nav.handle_key(Key::D),
            Click::MenuAbout => self.nav.handle_key(Key::H),
            Click::BackToMenu => self.nav.handle_key(Key::Escape),
            Click::PickFile => self.nav.open_file_picker(),
            Click::Submit => match self.nav.screen() {
                Screen::EncryptForm => self.nav.submit_encrypt(&self.password, &self.confirm),
                Screen::DecryptForm => self.nav.submit_decrypt(&self.password),
                Screen::Menu => Effect::None,
            },
            Click::DismissOverlay => {
                self.nav.dismiss_overlay();
                Effect::None
            }
        };
        self.apply_effect(effect, ctx);
    }

    // ── screens ──────────────────────────────────────────────────────

    fn draw_menu(&mut self, ui_enabled: bool, ctx: &egui::Context) -> Click {
        let mut click = Click::None;
        egui::TopBottomPanel::top("menu_toolbar").show(ctx, |ui| {
            ui.add_enabled_ui(ui_enabled, |ui| {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("About").clicked() {
                        click = Click::MenuAbout;
                    }
                });
            });
        });
        egui::TopBottomPanel::bottom("menu_hint").show(ctx, |ui| {
            ui.label("Tip: You can drag and drop files into Sealbox.");
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(ui_enabled, |ui| {
                ui.add_space(80.0);
                ui.columns(2, |columns| {
                    columns[0].vertical_centered(|ui| {
                        if ui.button("Encrypt").clicked() {
                            click = Click::MenuEncrypt;
                        }
                        ui.add_space(8.0);
                        ui.label(ENCRYPT_EXPLANATION);
                    });
                    columns[1].vertical_centered(|ui| {
                        if ui.button("Decrypt").clicked() {
                            click = Click::MenuDecrypt;
                        }
                        ui.add_space(8.0);
                        ui.label(DECRYPT_EXPLANATION);
                    });
                });
            });
        });
        click
    }

    fn draw_form(&mut self, mode: Mode, ui_enabled: bool, ctx: &egui::Context) -> Click {
        let mut click = Click::None;
        egui::TopBottomPanel::top("form_toolbar").show(ctx, |ui| {
            ui.add_enabled_ui(ui_enabled, |ui| {
                if ui.button("⬅ Back to menu").clicked() {
                    click = Click::BackToMenu;
                }
            });
        });

        let file_label = self
            .nav
            .source()
            .map(|source| source.display_name())
            .unwrap_or_else(|| SELECT_FILE_LABEL.to_owned());
        let (file_prompt, submit_label) = match mode {
            Mode::Encrypt => ("File to encrypt", "Encrypt"),
            Mode::Decrypt => ("File to decrypt", "Decrypt"),
        };

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(ui_enabled, |ui| {
                ui.add_space(60.0);
                ui.vertical_centered(|ui| {
                    egui::Grid::new("form_grid")
                        .num_columns(2)
                        .spacing([16.0, 10.0])
                        .show(ui, |ui| {
                            ui.label(file_prompt);
                            if ui.button(file_label.as_str()).clicked() {
                                click = Click::PickFile;
                            }
                            ui.end_row();

                            ui.label("Password");
                            ui.add(
                                egui::TextEdit::singleline(&mut self.password)
                                    .password(true)
                                    .desired_width(260.0),
                            );
                            ui.end_row();

                            if mode == Mode::Encrypt {
                                ui.label("Repeat password");
                                ui.add(
                                    egui::TextEdit::singleline(&mut self.confirm)
                                        .password(true)
                                        .desired_width(260.0),
                                );
                                ui.end_row();
                            }
                        });
                    ui.add_space(16.0);
                    if ui.button(submit_label).clicked() {
                        click = Click::Submit;
                    }
                });
            });
        });
        click
    }

    // ── overlays ─────────────────────────────────────────────────────

    fn draw_overlay(&mut self, ctx: &egui::Context) -> Click {
        let mut click = Click::None;
        match self.nav.overlay() {
            // Native dialogs render themselves; nothing to draw here.
            Overlay::None | Overlay::FilePicker | Overlay::SaveDialog => {}
            Overlay::Progress => {
                let verb = match self.nav.pending_mode() {
                    Some(Mode::Decrypt) => "Decrypting",
                    _ => "Encrypting",
                };
                let subject = self
                    .nav
                    .source()
                    .map(|source| source.path().display().to_string())
                    .unwrap_or_default();
                let indeterminate = self
                    .nav
                    .source()
                    .map(|source| source.size_hint() == 0)
                    .unwrap_or(true);
                let progress = self.progress;
                modal_window(verb).show(ctx, |ui| {
                    ui.label(format!("{verb} {subject}..."));
                    ui.add_space(8.0);
                    if indeterminate {
                        ui.add(egui::Spinner::new());
                    } else {
                        ui.add(egui::ProgressBar::new(progress).show_percentage());
                    }
                });
            }
            Overlay::Error(message) => {
                let message = message.clone();
                modal_window("Error").show(ctx, |ui| {
                    ui.label(message);
                    ui.add_space(8.0);
                    ui.vertical_centered(|ui| {
                        if ui.button("OK").clicked() {
                            click = Click::DismissOverlay;
                        }
                    });
                });
            }
            Overlay::Success(report) => {
                let title = match report.mode {
                    Mode::Encrypt => "Encryption successful",
                    Mode::Decrypt => "Decryption successful",
                };
                let input = report.input.display().to_string();
                let output = report.output.display().to_string();
                modal_window(title).show(ctx, |ui| {
                    egui::Grid::new("success_grid").num_columns(2).show(ui, |ui| {
                        ui.label("Input was:");
                        ui.label(input);
                        ui.end_row();
                        ui.label("New file:");
                        ui.label(output);
                        ui.end_row();
                    });
                    ui.add_space(8.0);
                    ui.vertical_centered(|ui| {
                        if ui.button("OK").clicked() {
                            click = Click::DismissOverlay;
                        }
                    });
                });
            }
            Overlay::About => {
                modal_window("About Sealbox").show(ctx, |ui| {
                    ui.label(ABOUT_TEXT);
                    ui.add_space(8.0);
                    ui.vertical_centered(|ui| {
                        if ui.button("OK").clicked() {
                            click = Click::DismissOverlay;
                        }
                    });
                });
            }
        }
        click
    }
}

impl eframe::App for SealboxApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        for key in Self::collect_keys(ctx) {
            let effect = self.nav.handle_key(key);
            self.apply_effect(effect, ctx);
        }

        let drops = Self::collect_drops(ctx);
        if !drops.is_empty() {
            self.nav.files_dropped(&drops);
        }

        // Form buffers do not outlive the screen they belong to.
        if self.nav.screen() == Screen::Menu
            && (!self.password.is_empty() || !self.confirm.is_empty())
        {
            self.clear_passwords();
        }

        let ui_enabled = matches!(self.nav.overlay(), Overlay::None);
        let click = match self.nav.screen() {
            Screen::Menu => self.draw_menu(ui_enabled, ctx),
            Screen::EncryptForm => self.draw_form(Mode::Encrypt, ui_enabled, ctx),
            Screen::DecryptForm => self.draw_form(Mode::Decrypt, ui_enabled, ctx),
        };
        self.dispatch(click, ctx);

        let overlay_click = self.draw_overlay(ctx);
        self.dispatch(overlay_click, ctx);
    }
}

fn modal_window(title: &str) -> egui::Window<'_> {
    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
}
