//! Full encrypt-then-decrypt scenario, driven the way the shell drives it:
//! drop a file, submit the form, pick a destination, run the pipeline, and
//! feed the outcome back into the navigator.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use sealbox_crypto::run;
use sealbox_session::{Effect, Navigator, Overlay, Screen};
use tempfile::TempDir;

/// Drives one submitted run to completion, like the GUI shell does.
fn execute_run(nav: &mut Navigator, dest: &Path, password: &str, fractions: &mut Vec<f64>) {
    let effect = nav.save_dialog_closed(Some(dest.to_owned()));
    let Effect::StartRun { mode, dest } = effect else {
        panic!("expected a run to start, got {effect:?}");
    };

    let mut out = BufWriter::new(File::create(&dest).unwrap());
    let source = nav.source_mut().unwrap();
    let total = source.size_hint();
    let outcome = {
        let mut sink = |fraction: f64| fractions.push(fraction);
        run(mode, source, &mut out, password, total, &mut sink)
    };
    nav.run_finished(outcome);
}

#[test]
fn encrypt_then_decrypt_reproduces_the_original_file() {
    let dir = TempDir::new().unwrap();
    let plain_path = dir.path().join("archive.bin");
    let ct_path = dir.path().join("archive.bin.age");
    let out_path = dir.path().join("archive.out");

    let payload: Vec<u8> = (0..10 * 1024 * 1024).map(|i| (i % 251) as u8).collect();
    fs::write(&plain_path, &payload).unwrap();

    let mut fractions = Vec::new();
    let mut nav = Navigator::new();

    // Encrypt phase.
    nav.files_dropped(std::slice::from_ref(&plain_path));
    assert_eq!(nav.screen(), Screen::EncryptForm);
    let effect = nav.submit_encrypt("correct-horse", "correct-horse");
    assert!(matches!(effect, Effect::OpenSaveDialog { .. }));
    execute_run(&mut nav, &ct_path, "correct-horse", &mut fractions);

    assert!(matches!(nav.overlay(), Overlay::Success(_)));
    assert!(nav.source().is_none());
    nav.dismiss_overlay();
    assert_eq!(nav.screen(), Screen::Menu);

    // Decrypt phase.
    nav.files_dropped(std::slice::from_ref(&ct_path));
    assert_eq!(nav.screen(), Screen::DecryptForm);
    let effect = nav.submit_decrypt("correct-horse");
    assert!(matches!(effect, Effect::OpenSaveDialog { .. }));
    execute_run(&mut nav, &out_path, "correct-horse", &mut fractions);

    assert!(matches!(nav.overlay(), Overlay::Success(_)));
    nav.dismiss_overlay();

    assert_eq!(fs::read(&out_path).unwrap(), payload);
    for fraction in &fractions {
        assert!((0.0..=1.0).contains(fraction));
    }
}

#[test]
fn wrong_password_keeps_the_selection_usable_for_a_retry() {
    let dir = TempDir::new().unwrap();
    let plain_path = dir.path().join("letter.txt");
    let ct_path = dir.path().join("letter.txt.age");
    let out_path = dir.path().join("letter.out");

    fs::write(&plain_path, b"dear reader").unwrap();

    let mut fractions = Vec::new();
    let mut nav = Navigator::new();

    nav.files_dropped(std::slice::from_ref(&plain_path));
    let _ = nav.submit_encrypt("right", "right");
    execute_run(&mut nav, &ct_path, "right", &mut fractions);
    nav.dismiss_overlay();

    // First decrypt attempt with the wrong password fails but keeps the
    // selection; the second attempt with the right one succeeds.
    nav.files_dropped(std::slice::from_ref(&ct_path));
    let _ = nav.submit_decrypt("wrong");
    execute_run(&mut nav, &out_path, "wrong", &mut fractions);

    match nav.overlay() {
        Overlay::Error(message) => {
            assert!(message.contains("wrong password"), "got: {message}");
        }
        other => panic!("expected error overlay, got {other:?}"),
    }
    assert!(nav.source().is_some());
    nav.dismiss_overlay();

    // The failed attempt wrote no usable plaintext; replace it.
    let retry_path: PathBuf = dir.path().join("letter.retry");
    let _ = nav.submit_decrypt("right");
    execute_run(&mut nav, &retry_path, "right", &mut fractions);

    assert!(matches!(nav.overlay(), Overlay::Success(_)));
    assert_eq!(fs::read(&retry_path).unwrap(), b"dear reader");
}
