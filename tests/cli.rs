//! Binary end-to-end tests.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn write_png(path: &Path, width: u32, height: u32) {
    let image = image::DynamicImage::ImageRgb8(image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([x as u8, y as u8, 10])
    }));
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    image.save(path).unwrap();
}

#[test]
fn compresses_a_tree_and_writes_the_report() {
    let dir = tempfile::tempdir().unwrap();
    write_png(&dir.path().join("photo.png"), 24, 24);
    write_png(&dir.path().join("deep/shot.png"), 16, 16);

    Command::cargo_bin("shrinkwrap")
        .unwrap()
        .arg(dir.path())
        .args(["--yes", "-t", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total files to be compressed: 2"))
        .stdout(predicate::str::contains("Compression completed successfully"));

    let output_root = dir.path().join("compressed_files");
    assert!(output_root.join("photo.png").is_file());
    assert!(output_root.join("deep/shot.png").is_file());

    let report = std::fs::read_to_string(output_root.join("report.txt")).unwrap();
    assert!(report.contains("Total Files: 2"));
    assert!(report.contains("Failed Files Count: 0"));
}

#[test]
fn json_report_flag_writes_both_renderings() {
    let dir = tempfile::tempdir().unwrap();
    write_png(&dir.path().join("only.png"), 8, 8);

    Command::cargo_bin("shrinkwrap")
        .unwrap()
        .arg(dir.path())
        .args(["--yes", "--json-report"])
        .assert()
        .success();

    let output_root = dir.path().join("compressed_files");
    assert!(output_root.join("report.txt").is_file());

    let json: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(output_root.join("report.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(json["total_files"], 1);
}

#[test]
fn missing_input_path_fails() {
    Command::cargo_bin("shrinkwrap")
        .unwrap()
        .arg("/no/such/path")
        .arg("--yes")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn invalid_worker_count_fails_before_any_work() {
    let dir = tempfile::tempdir().unwrap();
    write_png(&dir.path().join("a.png"), 8, 8);

    Command::cargo_bin("shrinkwrap")
        .unwrap()
        .arg(dir.path())
        .args(["--yes", "-t", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("worker count"));

    assert!(!dir.path().join("compressed_files").exists());
}
