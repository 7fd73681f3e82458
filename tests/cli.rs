use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

fn packager(project_dir: &Path, args: &[&str]) -> Output {
  Command::new(env!("CARGO_BIN_EXE_page_packager"))
    .args(args)
    .current_dir(project_dir)
    .env_remove("MEDIA_ENV")
    .env_remove("PAGE_PACKAGER_LOG")
    .output()
    .expect("failed to launch page_packager")
}

fn write_project(root: &Path) {
  fs::create_dir_all(root.join("src/assets")).unwrap();
  fs::write(
    root.join("src/index.html"),
    r#"<html><head><link rel="stylesheet" href="main.css"></head><body><img src="{{ KOALA_JPG }}"><script src="main.js"></script></body></html>"#,
  )
  .unwrap();
  fs::write(
    root.join("src/assets.json"),
    r#"{"KOALA_JPG": {"dev": "./medias/koala.jpg", "prod": "media://73"}}"#,
  )
  .unwrap();
  fs::write(root.join("src/assets/koala.jpg"), b"jpg").unwrap();
}

#[test]
fn render_then_inline_produces_single_file() {
  let dir = tempdir().unwrap();
  write_project(dir.path());

  let output = packager(dir.path(), &["render", "--production"]);
  assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

  let dist = dir.path().join("dist");
  fs::write(dist.join("main.css"), "body{color:red}").unwrap();
  fs::write(dist.join("main.js"), "console.log(1)").unwrap();

  let output = packager(dir.path(), &["inline"]);
  assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("index-inline.html"));

  let inlined = fs::read_to_string(dist.join("index-inline.html")).unwrap();
  assert!(inlined.contains("<style>body{color:red}</style>"));
  assert!(inlined.contains("<script>console.log(1)</script>"));
  assert!(inlined.contains(r#"<img src="media://73">"#));
  assert!(dist.join("assets/koala.jpg").exists());
}

#[test]
fn media_env_overrides_production_flag() {
  let dir = tempdir().unwrap();
  write_project(dir.path());

  let output = Command::new(env!("CARGO_BIN_EXE_page_packager"))
    .args(["render", "--production"])
    .current_dir(dir.path())
    .env("MEDIA_ENV", "dev")
    .output()
    .unwrap();
  assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

  let html = fs::read_to_string(dir.path().join("dist/index.html")).unwrap();
  assert!(html.contains(r#"<img src="./medias/koala.jpg">"#));
}

#[test]
fn inline_without_html_exits_with_error() {
  let dir = tempdir().unwrap();
  fs::create_dir_all(dir.path().join("dist")).unwrap();
  fs::write(dir.path().join("dist/main.css"), "a{}").unwrap();

  let output = packager(dir.path(), &["inline"]);

  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("HTML file not found"));
  assert!(!dir.path().join("dist/index-inline.html").exists());
}

#[test]
fn render_with_invalid_catalog_names_key_and_fails() {
  let dir = tempdir().unwrap();
  write_project(dir.path());
  fs::write(
    dir.path().join("src/assets.json"),
    r#"{"KOALA_JPG": {"dev": "./medias/koala.jpg", "prod": 73}}"#,
  )
  .unwrap();

  let output = packager(dir.path(), &["render"]);

  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("KOALA_JPG"));
  assert!(!dir.path().join("dist/index.html").exists());
}

#[test]
fn respects_project_config_output_names() {
  let dir = tempdir().unwrap();
  fs::create_dir_all(dir.path().join("build")).unwrap();
  fs::write(
    dir.path().join("packager.config.json"),
    r#"{"dist_dir": "build", "inline_html_file": "upload.html"}"#,
  )
  .unwrap();
  fs::write(dir.path().join("build/index.html"), r#"<script src="app.js"></script>"#).unwrap();
  fs::write(dir.path().join("build/app.js"), "run()").unwrap();

  let output = packager(dir.path(), &["inline"]);
  assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

  assert_eq!(
    fs::read_to_string(dir.path().join("build/upload.html")).unwrap(),
    "<script>run()</script>"
  );
}
