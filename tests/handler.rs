//! Request handler contract tests.

mod common;

use std::sync::Arc;

use songsmith::generation::CancelFlag;
use songsmith::handler::{handle_generate, ATTACHMENT_NAME};
use songsmith::GenerationConfig;

use common::{context, Mode, RecordingScorer};

fn config(num_notes: usize, sequence_length: usize) -> GenerationConfig {
    GenerationConfig {
        num_notes,
        sequence_length,
        seed: Some(11),
        ..Default::default()
    }
}

#[test]
fn success_returns_midi_attachment_and_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("output.mid");
    let ctx = context(Arc::new(RecordingScorer::new(Mode::Successor)), 200);

    let response = handle_generate(&ctx, &config(10, 128), &path, &CancelFlag::new());

    assert_eq!(response.status, 200);
    assert_eq!(response.content_type, "audio/midi");
    assert_eq!(response.attachment_name, Some(ATTACHMENT_NAME));
    assert_eq!(&response.body[0..4], b"MThd");
    assert_eq!(std::fs::read(&path).unwrap(), response.body);
}

#[test]
fn generation_error_becomes_500() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("output.mid");
    let ctx = context(Arc::new(RecordingScorer::new(Mode::Flat)), 50);

    let response = handle_generate(&ctx, &config(10, 128), &path, &CancelFlag::new());

    assert_eq!(response.status, 500);
    assert_eq!(response.attachment_name, None);
    let body = String::from_utf8(response.body).unwrap();
    assert!(body.starts_with("[INSUFFICIENT_HISTORY]"));
    assert!(!path.exists());
}

#[test]
fn scorer_error_becomes_500() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("output.mid");
    let ctx = context(Arc::new(RecordingScorer::new(Mode::Flat).failing_on(0)), 50);

    let response = handle_generate(&ctx, &config(4, 8), &path, &CancelFlag::new());

    assert_eq!(response.status, 500);
    let body = String::from_utf8(response.body).unwrap();
    assert!(body.contains("SCORER_INVOCATION_FAILED"));
    assert!(body.contains("device lost"));
}

#[test]
fn unwritable_output_becomes_500() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("output.mid");
    let ctx = context(Arc::new(RecordingScorer::new(Mode::Successor)), 50);

    let response = handle_generate(&ctx, &config(4, 8), &path, &CancelFlag::new());

    assert_eq!(response.status, 500);
    let body = String::from_utf8(response.body).unwrap();
    assert!(body.starts_with("[RENDER_WRITE_FAILED]"));
    assert!(body.contains("output.mid"));
}

#[test]
fn invalid_parameters_become_500() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(Arc::new(RecordingScorer::new(Mode::Flat)), 50);
    let mut bad = config(4, 8);
    bad.temperature_pitch = 0.0;

    let response = handle_generate(&ctx, &bad, &dir.path().join("x.mid"), &CancelFlag::new());

    assert_eq!(response.status, 500);
    let body = String::from_utf8(response.body).unwrap();
    assert!(body.contains("INVALID_PARAMETER"));
}
