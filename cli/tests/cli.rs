use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn wahy(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_wahy"))
        .arg("--no-color")
        .args(args)
        .output()
        .expect("failed to spawn wahy")
}

fn write(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

#[test]
fn run_prints_composite_document() {
    let dir = TempDir::new().unwrap();
    let file = write(
        dir.path(),
        "page.wahy",
        "افتح صفحة \"t\"\nأضف فقرة مرحبا\nابدأ_CSS\nلون red\nأنهِ_CSS\n",
    );

    let output = wahy(&["run", &file]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.starts_with("<!DOCTYPE html>"));
    assert!(out.contains("<p>مرحبا</p>"));
    assert!(out.contains("color: red;"));
}

#[test]
fn bare_file_argument_means_run() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "page.wahy", "أضف فقرة أ\n");

    let output = wahy(&[&file]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("<p>أ</p>"));
}

#[test]
fn structural_error_exits_nonzero_with_diagnostic() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "bad.wahy", "أضف فقرة أ\nأنهِ قائمة\n");

    let output = wahy(&["run", &file]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("cannot close list: nothing is open"));
    assert!(stdout(&output).contains("<p>أ</p>"));
}

#[test]
fn json_output_shape() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "page.wahy", "أضف فقرة أ\nطير\n");

    let output = wahy(&["run", "--json", &file]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("\"success\": true"));
    assert!(out.contains("\"combinedOutput\""));
    assert!(out.contains("unknown HTML command: طير"));
}

#[test]
fn html_only_skips_injection() {
    let dir = TempDir::new().unwrap();
    let file = write(
        dir.path(),
        "page.wahy",
        "أضف فقرة أ\nابدأ_JS\nاطبع 1\nأنهِ_JS\n",
    );

    let output = wahy(&["run", "--html-only", &file]);
    let out = stdout(&output);
    assert!(out.contains("<p>أ</p>"));
    assert!(!out.contains("<script>"));
}

#[test]
fn output_file_and_sibling_config() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "wahy.toml",
        "stylesheet = \"external\"\nstylesheet_href = \"theme.css\"\n",
    );
    let file = write(dir.path(), "page.wahy", "أضف فقرة أ\n");
    let out_path = dir.path().join("page.html");

    let output = wahy(&["run", &file, "-o", &out_path.to_string_lossy()]);
    assert!(output.status.success());
    let written = fs::read_to_string(&out_path).unwrap();
    assert!(written.contains("<link rel=\"stylesheet\" href=\"theme.css\">"));
}

#[test]
fn invalid_config_is_reported() {
    let dir = TempDir::new().unwrap();
    let config = write(dir.path(), "custom.toml", "colour = 1\n");
    let file = write(dir.path(), "page.wahy", "أضف فقرة أ\n");

    let output = wahy(&["run", "--config", &config, &file]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("invalid config"));
}

// ---------------------------------------------------------------------------
// detect
// ---------------------------------------------------------------------------

#[test]
fn detect_prints_target() {
    let dir = TempDir::new().unwrap();
    let css = write(dir.path(), "style.wahy", "اختر p\nلون red\n");
    let mixed = write(dir.path(), "mixed.wahy", "أضف فقرة أ\nاطبع 1\n");

    assert_eq!(stdout(&wahy(&["detect", &css])).trim(), "css");
    assert_eq!(stdout(&wahy(&["detect", &mixed])).trim(), "mixed");
}

// ---------------------------------------------------------------------------
// test runner
// ---------------------------------------------------------------------------

const PASSING: &str = r#"---
description = "paragraph renders"
expect_contains = ["<p>أ</p>"]
expect_not_contains = ["<ul>"]
expect_warnings = []
---
أضف فقرة أ
"#;

const EXPECTED_FAILURE: &str = r#"---
expect_success = false
expect_error = "nothing is open"
expect_error_line = 2
---
أضف فقرة أ
أنهِ قسم
"#;

const WARNINGS: &str = r#"---
expect_warnings = [
  { contains = "unknown CSS command", line = 3 },
  { contains = "[HTML]", line = 5 },
]
---
ابدأ_CSS
لون red
غريب
أنهِ_CSS
طير
"#;

const WRONG: &str = r#"---
description = "wrong expectation"
expect_contains = ["<h1>"]
---
أضف فقرة أ
"#;

#[test]
fn runner_passes_matching_expectations() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "html/para.test.wahy", PASSING);
    write(dir.path(), "html/close.test.wahy", EXPECTED_FAILURE);
    write(dir.path(), "css/warn.test.wahy", WARNINGS);

    let output = wahy(&["test", &dir.path().to_string_lossy()]);
    let err = stderr(&output);
    assert!(output.status.success(), "{}", err);
    assert!(err.contains("PASS  paragraph renders"));
    assert!(err.contains("3 passed, 0 failed"));
}

#[test]
fn runner_reports_failures() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "html/para.test.wahy", PASSING);
    write(dir.path(), "html/wrong.test.wahy", WRONG);

    let output = wahy(&["test", &dir.path().to_string_lossy()]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("FAIL  wrong expectation"));
    assert!(err.contains("output does not contain \"<h1>\""));
    assert!(err.contains("1 passed, 1 failed (of 2)"));
}

#[test]
fn runner_filters_categories() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "html/para.test.wahy", PASSING);
    write(dir.path(), "broken/wrong.test.wahy", WRONG);

    let output = wahy(&["test", &dir.path().to_string_lossy(), "--category", "html"]);
    assert!(output.status.success());
    assert!(stderr(&output).contains("1 passed, 0 failed"));
}

#[test]
fn runner_single_file_and_bad_frontmatter() {
    let dir = TempDir::new().unwrap();
    let good = write(dir.path(), "para.test.wahy", PASSING);
    let bad = write(dir.path(), "bad.test.wahy", "أضف فقرة أ\n");

    assert!(wahy(&["test", &good]).status.success());

    let output = wahy(&["test", &bad]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("missing opening --- frontmatter delimiter"));
}

#[test]
fn runner_rejects_misspelled_warning_keys() {
    let dir = TempDir::new().unwrap();
    let file = write(
        dir.path(),
        "typo.test.wahy",
        "---\nexpect_warnings = [{ contains = \"[HTML]\", lines = 1 }]\n---\nطير\n",
    );

    let output = wahy(&["test", &file]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("frontmatter error"), "{}", err);
    assert!(err.contains("lines"), "{}", err);
}

#[test]
fn runner_lists_categories() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "html/para.test.wahy", PASSING);
    write(dir.path(), "css/warn.test.wahy", WARNINGS);

    let output = wahy(&["test", &dir.path().to_string_lossy(), "--list-categories"]);
    let err = stderr(&output);
    assert!(err.contains("css (1 tests)"));
    assert!(err.contains("html (1 tests)"));
}
