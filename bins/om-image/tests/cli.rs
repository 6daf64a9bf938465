use assert_cmd::Command;
use image::{Rgb, RgbImage};
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn om_image(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("om-image").unwrap();
    cmd.current_dir(dir).env_remove("RUST_LOG");
    cmd
}

fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 120]))
        .save(&path)
        .unwrap();
    path
}

fn write_noise_png(dir: &Path, name: &str, side: u32) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_fn(side, side, |x, y| {
        let mut h = x.wrapping_mul(0x9E37_79B1) ^ y.wrapping_mul(0x85EB_CA77);
        h ^= h >> 15;
        h = h.wrapping_mul(0xC2B2_AE3D);
        Rgb([h as u8, (h >> 8) as u8, (h >> 16) as u8])
    })
    .save(&path)
    .unwrap();
    path
}

fn write_draft(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join("draft.json");
    let draft = serde_json::json!({
        "name": name,
        "price": "15000",
        "discounted_price": "1000",
        "stock": "3",
        "description": "Hand-thrown stoneware mug, dishwasher safe",
    });
    std::fs::write(&path, draft.to_string()).unwrap();
    path
}

#[test]
fn test_detect_png() {
    let dir = TempDir::new().unwrap();
    let photo = write_png(dir.path(), "photo.png", 8, 8);

    om_image(dir.path())
        .arg("detect")
        .arg(&photo)
        .assert()
        .success()
        .stdout(predicate::str::contains("Format: png"))
        .stdout(predicate::str::contains("image/png"));
}

#[test]
fn test_prepare_writes_square_jpeg() {
    let dir = TempDir::new().unwrap();
    let photo = write_png(dir.path(), "shoes.png", 300, 200);

    om_image(dir.path()).arg("prepare").arg(&photo).assert().success();

    let output = dir.path().join("shoes-upload.jpg");
    let bytes = std::fs::read(&output).unwrap();
    assert!(bytes.starts_with(&[0xFF, 0xD8, 0xFF]));

    let prepared = image::load_from_memory(&bytes).unwrap();
    assert_eq!(prepared.width(), prepared.height());
    assert!(bytes.len() <= 60_000);
}

#[test]
fn test_prepare_text_report() {
    let dir = TempDir::new().unwrap();
    let photo = write_png(dir.path(), "mug.png", 90, 60);

    om_image(dir.path())
        .arg("prepare")
        .arg(&photo)
        .assert()
        .success()
        .stdout(predicate::str::contains("mug.png"))
        .stdout(predicate::str::contains("mug-upload.jpg"));
}

#[test]
fn test_prepare_json_report() {
    let dir = TempDir::new().unwrap();
    let photo = write_png(dir.path(), "bag.png", 120, 160);
    let output = dir.path().join("out.jpg");

    let assert = om_image(dir.path())
        .args(["--format", "json", "prepare"])
        .arg(&photo)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let doc: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(doc["mime_type"], "image/jpeg");
    assert_eq!(doc["report"]["source_width"], 120);
    assert_eq!(doc["report"]["square_side"], 120);
    assert_eq!(doc["report"]["cropped"], true);
    assert_eq!(doc["report"]["within_budget"], true);
    assert!(output.is_file());
}

#[test]
fn test_prepare_missing_file() {
    let dir = TempDir::new().unwrap();

    om_image(dir.path())
        .args(["prepare", "nope.png"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_prepare_rejects_non_image() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("notes.png"), "just some text").unwrap();

    om_image(dir.path())
        .args(["prepare", "notes.png"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("E4001"));
}

#[test]
fn test_prepare_strict_over_budget_fails() {
    let dir = TempDir::new().unwrap();
    let photo = write_noise_png(dir.path(), "noise.png", 64);

    om_image(dir.path())
        .arg("prepare")
        .arg(&photo)
        .args(["--budget", "100", "--strict"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("E4004"));
}

#[test]
fn test_prepare_over_budget_accepted_by_default() {
    let dir = TempDir::new().unwrap();
    let photo = write_noise_png(dir.path(), "noise.png", 64);

    let assert = om_image(dir.path())
        .args(["--format", "json", "prepare"])
        .arg(&photo)
        .args(["--budget", "100"])
        .assert()
        .success();

    let doc: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(doc["report"]["within_budget"], false);
    assert_eq!(doc["report"]["attempts"].as_array().unwrap().len(), 10);
}

#[test]
fn test_missing_config_file() {
    let dir = TempDir::new().unwrap();
    let photo = write_png(dir.path(), "photo.png", 8, 8);

    om_image(dir.path())
        .args(["--config", "missing.toml", "detect"])
        .arg(&photo)
        .assert()
        .code(3);
}

#[test]
fn test_config_file_sets_budget() {
    let dir = TempDir::new().unwrap();
    let photo = write_png(dir.path(), "photo.png", 40, 40);
    std::fs::write(
        dir.path().join(".openmarket.toml"),
        "[prepare]\nbudget_bytes = 123456\n",
    )
    .unwrap();

    let assert = om_image(dir.path())
        .args(["--format", "json", "prepare"])
        .arg(&photo)
        .assert()
        .success();

    let doc: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(doc["report"]["budget_bytes"], 123456);
}

#[test]
fn test_batch_prepares_photos() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in");
    std::fs::create_dir_all(input.join("nested")).unwrap();
    write_png(&input, "a.png", 30, 20);
    write_png(&input.join("nested"), "b.png", 20, 30);
    std::fs::write(input.join("notes.txt"), "skip me").unwrap();
    let out = dir.path().join("out");

    let assert = om_image(dir.path())
        .args(["--format", "json", "batch"])
        .arg(&input)
        .arg("--out-dir")
        .arg(&out)
        .assert()
        .success();

    let doc: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(doc["total"], 2);
    assert_eq!(doc["failed"], 0);
    assert!(out.join("a.jpg").is_file());
    assert!(out.join("nested").join("b.jpg").is_file());
}

#[test]
fn test_register_writes_multipart_body() {
    let dir = TempDir::new().unwrap();
    let first = write_png(dir.path(), "front.png", 60, 40);
    let second = write_png(dir.path(), "back.png", 40, 60);
    let draft = write_draft(dir.path(), "Stoneware mug");
    let out = dir.path().join("request.body");

    om_image(dir.path())
        .arg("register")
        .arg("--draft")
        .arg(&draft)
        .arg(&first)
        .arg(&second)
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Slot 2"));

    let body = String::from_utf8_lossy(&std::fs::read(&out).unwrap()).into_owned();
    assert!(body.contains("name=\"params\""));
    assert!(body.contains("\"currency\":\"KRW\""));
    assert!(body.contains("\"stock\":3"));
    assert_eq!(body.matches("name=\"images\"").count(), 2);
}

#[test]
fn test_register_rejects_fractional_krw_price() {
    let dir = TempDir::new().unwrap();
    let photo = write_png(dir.path(), "front.png", 20, 20);
    let draft = dir.path().join("draft.json");
    std::fs::write(
        &draft,
        r#"{"name":"Stoneware mug","price":"12.50","description":"Hand-thrown stoneware mug"}"#,
    )
    .unwrap();

    om_image(dir.path())
        .arg("register")
        .arg("--draft")
        .arg(&draft)
        .arg(&photo)
        .args(["--out", "body"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Price"));

    // The same draft is valid in dollars.
    om_image(dir.path())
        .arg("register")
        .arg("--draft")
        .arg(&draft)
        .args(["--currency", "usd"])
        .arg(&photo)
        .args(["--out", "body"])
        .assert()
        .success();
}

#[test]
fn test_register_without_photos() {
    let dir = TempDir::new().unwrap();
    let draft = write_draft(dir.path(), "Stoneware mug");

    om_image(dir.path())
        .arg("register")
        .arg("--draft")
        .arg(&draft)
        .args(["--out", "body"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Add at least one photo"));

    assert!(!dir.path().join("body").exists());
}

#[test]
fn test_register_short_name() {
    let dir = TempDir::new().unwrap();
    let photo = write_png(dir.path(), "front.png", 20, 20);
    let draft = write_draft(dir.path(), "Mg");

    om_image(dir.path())
        .arg("register")
        .arg("--draft")
        .arg(&draft)
        .arg(&photo)
        .args(["--out", "body"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Product name"));
}
