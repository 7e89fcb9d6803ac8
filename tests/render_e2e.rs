use sori::audio::io::WavIo;
use sori::audio::transform::ToneShaper;
use sori::audio::AudioBuffer;
use sori::profile::{ProfileBook, ToneProfile};
use sori::render::{render_script, RenderOptions};
use sori::script::{DialogueLine, Script};
use std::collections::BTreeMap;
use std::process::Command;

fn line(index: u32, speaker: &str, text: &str) -> DialogueLine {
    DialogueLine {
        index,
        speaker: speaker.to_string(),
        text: text.to_string(),
        emotion: "neutral".to_string(),
    }
}

/// A 3-second reference tone at 16 kHz whose samples stay well inside the
/// clip bound.
fn reference_buffer() -> AudioBuffer {
    let samples = (0..48000)
        .map(|i| 0.5 * (i as f32 * 0.01).sin())
        .collect();
    AudioBuffer::new(samples, 16000)
}

#[test]
fn two_line_script_renders_expected_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let reference_path = dir.path().join("reference.wav");
    WavIo::write_mono(&reference_path, &reference_buffer()).expect("write reference");

    let mut speakers = BTreeMap::new();
    speakers.insert("A".to_string(), ToneProfile::new(1.0, 1.0, 1.0));
    speakers.insert("B".to_string(), ToneProfile::new(0.9, 1.1, 0.8));
    let book = ProfileBook::new(speakers, Vec::new());

    let script =
        Script::from_lines(vec![line(1, "A", "hi"), line(2, "B", "bye")]).expect("script");
    let out_dir = dir.path().join("out");
    let mut options = RenderOptions::local(&reference_path, &out_dir);
    options.max_duration_seconds = None;

    let report = render_script(&script, &book, &options).expect("render");
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 0);

    // Identity profile: same length, same rate.
    let a = WavIo::read_mono(out_dir.join("01_A_neutral.wav"), None).expect("read A");
    assert_eq!(a.sample_rate, 16000);
    assert_eq!(a.len(), 48000);

    // B: speed 1.1 then pitch 0.9, volume 0.8.
    let b = WavIo::read_mono(out_dir.join("02_B_neutral.wav"), None).expect("read B");
    let after_speed = (48000_f64 / 1.1).floor() as usize;
    let after_pitch = (after_speed as f64 * 0.9).floor() as usize;
    assert_eq!(b.len(), after_pitch);
    // Input peaks at 0.5, so scaled peaks stay at or below 0.4 (plus 16-bit
    // quantization slack).
    assert!(b.samples.iter().all(|v| v.abs() <= 0.401));
}

#[test]
fn identity_transform_is_bitwise_before_file_io() {
    let reference = reference_buffer();
    let shaped = ToneShaper::shape(&reference, &ToneProfile::new(1.0, 1.0, 1.0)).expect("shape");
    assert_eq!(shaped, reference);
}

#[test]
fn cli_renders_a_script_with_builtin_cast() {
    let dir = tempfile::tempdir().expect("tempdir");
    let reference_path = dir.path().join("reference.wav");
    WavIo::write_mono(&reference_path, &reference_buffer()).expect("write reference");

    let script_path = dir.path().join("script.yaml");
    std::fs::write(
        &script_path,
        "- speaker: hyunjung\n  text: first\n  emotion: excited\n- speaker: chiho\n  text: second\n  emotion: polite\n",
    )
    .expect("write script");
    let out_dir = dir.path().join("out");

    let output = Command::new(env!("CARGO_BIN_EXE_sori"))
        .args([
            "render",
            "--script",
            script_path.to_str().unwrap(),
            "--reference",
            reference_path.to_str().unwrap(),
            "--output-dir",
            out_dir.to_str().unwrap(),
        ])
        .output()
        .expect("run sori render");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(out_dir.join("01_hyunjung_excited.wav").exists());
    assert!(out_dir.join("02_chiho_polite.wav").exists());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2 of 2 lines rendered"), "stdout: {stdout}");
}

#[test]
fn cli_rejects_duplicate_indices_before_rendering() {
    let dir = tempfile::tempdir().expect("tempdir");
    let reference_path = dir.path().join("reference.wav");
    WavIo::write_mono(&reference_path, &reference_buffer()).expect("write reference");

    let script_path = dir.path().join("script.yaml");
    std::fs::write(
        &script_path,
        "- {speaker: chiho, text: a, index: 2}\n- {speaker: chiho, text: b, index: 2}\n",
    )
    .expect("write script");
    let out_dir = dir.path().join("out");

    let output = Command::new(env!("CARGO_BIN_EXE_sori"))
        .args([
            "render",
            "--script",
            script_path.to_str().unwrap(),
            "--reference",
            reference_path.to_str().unwrap(),
            "--output-dir",
            out_dir.to_str().unwrap(),
        ])
        .output()
        .expect("run sori render");

    assert!(!output.status.success());
    assert!(!out_dir.exists());
}

#[test]
fn cli_lists_builtin_speakers() {
    let output = Command::new(env!("CARGO_BIN_EXE_sori"))
        .arg("speakers")
        .output()
        .expect("run sori speakers");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in ["chiho", "hwanseok", "hyunjung"] {
        assert!(stdout.contains(name), "missing {name}: {stdout}");
    }
}

#[test]
fn cli_lists_pretrained_models() {
    let output = Command::new(env!("CARGO_BIN_EXE_sori"))
        .arg("models")
        .output()
        .expect("run sori models");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("s2G488k.pth"));
    assert!(stdout.contains("s1v3.ckpt"));
}
