use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use cliptrim::adapters::raw_video::{stamped_index, RawVideo};
use cliptrim::domain::model::MediaBlob;

fn cliptrim() -> Command {
    let mut cmd = Command::cargo_bin("cliptrim").unwrap();
    cmd.env_remove("CLIPTRIM_LOG")
        .env_remove("CLIPTRIM_LOG_LEVEL")
        .env_remove("RUST_LOG")
        .arg("--log-level")
        .arg("warn");
    cmd
}

/// Generate a 10 fps test clip inside `dir`
fn generate_clip(dir: &TempDir, seconds: &str) -> PathBuf {
    let path = dir.path().join("clip.ctrv");
    cliptrim()
        .current_dir(dir.path())
        .args(["generate", "-o", path.to_str().unwrap(), "--width", "8", "--height", "6"])
        .args(["--fps", "10", "--duration", seconds])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));
    path
}

fn read_video(path: &Path) -> RawVideo {
    let data = std::fs::read(path).unwrap();
    RawVideo::parse(MediaBlob::new(data, "video/x-ctrv")).unwrap()
}

#[test]
fn test_inspect_json() {
    let dir = TempDir::new().unwrap();
    let clip = generate_clip(&dir, "4");

    let output = cliptrim()
        .current_dir(dir.path())
        .args(["inspect", "-i", clip.to_str().unwrap(), "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["width"], 8);
    assert_eq!(report["height"], 6);
    assert_eq!(report["frames"], 40);
    assert_eq!(report["duration"], 4.0);
}

#[test]
fn test_inspect_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    cliptrim()
        .current_dir(dir.path())
        .args(["inspect", "-i", "nope.ctrv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_trim_exports_range() {
    let dir = TempDir::new().unwrap();
    let clip = generate_clip(&dir, "6");
    let out = dir.path().join("out.ctrv");

    cliptrim()
        .current_dir(dir.path())
        .args(["trim", "-i", clip.to_str().unwrap(), "-o", out.to_str().unwrap()])
        .args(["--start", "1.5", "--end", "00:03.5", "--fps", "20", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"passthrough\": false"));

    let video = read_video(&out);
    assert_eq!(video.header().fps, 20);
    assert!(video.duration() >= 2.0 - 1e-9 && video.duration() < 2.05);
    assert_eq!(stamped_index(video.frame_pixels(0).unwrap()), Some(15));
}

#[test]
fn test_trim_without_range_copies_source() {
    let dir = TempDir::new().unwrap();
    let clip = generate_clip(&dir, "2");
    let out = dir.path().join("copy.ctrv");

    cliptrim()
        .current_dir(dir.path())
        .args(["trim", "-i", clip.to_str().unwrap(), "-o", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("unchanged source"));

    assert_eq!(std::fs::read(&clip).unwrap(), std::fs::read(&out).unwrap());
}

#[test]
fn test_trim_quick_trim_flags() {
    let dir = TempDir::new().unwrap();
    let clip = generate_clip(&dir, "5");
    let out = dir.path().join("quick.ctrv");

    cliptrim()
        .current_dir(dir.path())
        .args(["trim", "-i", clip.to_str().unwrap(), "-o", out.to_str().unwrap()])
        .args(["--trim-start", "--trim-end", "--quick-trim-seconds", "1", "--fps", "10"])
        .assert()
        .success();

    let video = read_video(&out);
    assert!((video.duration() - 3.0).abs() < 0.1 + 1e-9);
    assert_eq!(stamped_index(video.frame_pixels(0).unwrap()), Some(10));
}

#[test]
fn test_trim_rejects_bad_times() {
    let dir = TempDir::new().unwrap();
    let clip = generate_clip(&dir, "2");

    cliptrim()
        .current_dir(dir.path())
        .args(["trim", "-i", clip.to_str().unwrap(), "-o", "x.ctrv", "--start", "soon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid time format"));

    cliptrim()
        .current_dir(dir.path())
        .args(["trim", "-i", clip.to_str().unwrap(), "-o", "x.ctrv", "--start", "1.5", "--end", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Start time must be before end time"));
}

#[test]
fn test_edit_script_replay_and_export() {
    let dir = TempDir::new().unwrap();
    let clip = generate_clip(&dir, "10");
    let script = dir.path().join("steps.yaml");
    std::fs::write(
        &script,
        r#"
track: { left: 0, width: 1000 }
steps:
  - pointer: { type: down, x: 1000 }
  - pointer: { type: move, x: 400 }
  - pointer: { type: up }
  - remove_from_start: 1
  - undo
"#,
    )
    .unwrap();
    let out = dir.path().join("edited.ctrv");

    let output = cliptrim()
        .current_dir(dir.path())
        .args(["edit", "-i", clip.to_str().unwrap(), "--script", script.to_str().unwrap()])
        .args(["-o", out.to_str().unwrap(), "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["range"]["start"], 0.0);
    assert_eq!(report["range"]["end"], 4.0);
    assert_eq!(report["steps"].as_array().unwrap().len(), 5);

    let video = read_video(&out);
    assert!(video.duration() >= 4.0 - 1e-9 && video.duration() < 4.0 + 1.0 / 30.0);
}

#[test]
fn test_config_file_sets_export_fps() {
    let dir = TempDir::new().unwrap();
    let clip = generate_clip(&dir, "3");
    std::fs::write(dir.path().join("cliptrim.toml"), "[cliptrim]\nexport_fps = 5\n").unwrap();
    let out = dir.path().join("out.ctrv");

    cliptrim()
        .current_dir(dir.path())
        .args(["trim", "-i", clip.to_str().unwrap(), "-o", out.to_str().unwrap(), "--end", "2"])
        .assert()
        .success();

    assert_eq!(read_video(&out).header().fps, 5);
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("bad.toml");
    std::fs::write(&config, "[cliptrim]\nminimum_span = -1.0\n").unwrap();

    cliptrim()
        .current_dir(dir.path())
        .args(["--config", config.to_str().unwrap(), "inspect", "-i", "whatever.ctrv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn test_trim_progress_events_as_json() {
    let dir = TempDir::new().unwrap();
    let clip = generate_clip(&dir, "3");
    let out = dir.path().join("out.ctrv");

    let output = cliptrim()
        .current_dir(dir.path())
        .args(["trim", "-i", clip.to_str().unwrap(), "-o", out.to_str().unwrap()])
        .args(["--start", "1", "--end", "2", "--progress", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let lines: Vec<serde_json::Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.first().unwrap()["event"], "start");
    assert!(lines.iter().any(|line| line["event"] == "complete"));
    let report = lines.last().unwrap();
    assert_eq!(report["passthrough"], false);
    assert_eq!(report["start"], 1.0);
}
