//! Sealbox: password-based file encryption with a graphical front end.
//!
//! The binary is a thin shell: it initializes logging, reads the optional
//! startup file argument, and hands control to the egui event loop in
//! [`app`]. All navigation and resource decisions live in
//! `sealbox-session`; the streaming crypto lives in `sealbox-crypto`.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;

use std::path::PathBuf;

use clap::Parser;
use eframe::egui;

#[derive(Parser, Debug)]
#[command(name = "sealbox")]
#[command(about = "Encrypt and decrypt files with a password")]
struct Args {
    /// File to open at launch
    file: Option<PathBuf>,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sealbox=info".into()),
        )
        .init();

    let args = Args::parse();
    if let Some(path) = &args.file {
        tracing::info!(path = %path.display(), "opening startup file");
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([800.0, 480.0])
            .with_title("Sealbox"),
        ..Default::default()
    };
    eframe::run_native(
        "Sealbox",
        options,
        Box::new(move |cc| Ok(Box::new(app::SealboxApp::new(cc, args.file)))),
    )
}
