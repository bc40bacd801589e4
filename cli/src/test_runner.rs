use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use emitter::{CompositeResult, InterpreterConfig, Interpreter};
use wahy::{LineDiagnostic, Target};

const TEST_SUFFIX: &str = ".test.wahy";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpectedWarning {
    /// Substring that must appear in the rendered warning.
    pub contains: String,

    /// If set, the warning must be attached to this 1-based source line.
    #[serde(default)]
    pub line: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestConfig {
    /// Human-readable test description.
    #[serde(default)]
    pub description: Option<String>,

    /// Expected overall success. Defaults to true.
    #[serde(default = "default_success")]
    pub expect_success: bool,

    /// Substrings that must all appear in the composite document.
    #[serde(default)]
    pub expect_contains: Vec<String>,

    /// Substrings that must not appear in the composite document.
    #[serde(default)]
    pub expect_not_contains: Vec<String>,

    /// The first fatal error must contain this substring.
    #[serde(default)]
    pub expect_error: Option<String>,

    /// The first fatal error must be reported on this 1-based line.
    #[serde(default)]
    pub expect_error_line: Option<usize>,

    /// Expected warnings. If present (even empty), warning count and content are checked.
    #[serde(default)]
    pub expect_warnings: Option<Vec<ExpectedWarning>>,

    /// Interpreter settings for this test.
    #[serde(default)]
    pub config: InterpreterConfig,
}

fn default_success() -> bool {
    true
}

/// Split a `.test.wahy` file into its TOML config and Wahy source.
fn parse_test_file(content: &str) -> Result<(TestConfig, &str), String> {
    let content = content.trim_start_matches('\u{feff}');

    if !content.starts_with("---") {
        return Err("missing opening --- frontmatter delimiter".into());
    }

    let after_open = &content[3..];
    let after_open = after_open
        .strip_prefix('\n')
        .or_else(|| after_open.strip_prefix("\r\n"))
        .unwrap_or(after_open);

    let close_pos = after_open
        .find("\n---")
        .ok_or("missing closing --- frontmatter delimiter")?;

    let toml_str = after_open[..close_pos].trim_end_matches('\r');
    let rest = &after_open[close_pos + 4..];
    let source = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);

    let config: TestConfig =
        toml::from_str(toml_str).map_err(|e| format!("TOML parse error: {}", e))?;

    Ok((config, source))
}

pub enum TestOutcome {
    Pass,
    Fail(String),
}

pub struct TestResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: TestOutcome,
}

fn run_single_test(path: &Path) -> TestResult {
    let fail = |description: Option<String>, reason: String| TestResult {
        path: path.to_path_buf(),
        description,
        outcome: TestOutcome::Fail(reason),
    };

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => return fail(None, format!("cannot read file: {}", e)),
    };

    let (config, source) = match parse_test_file(&content) {
        Ok(pair) => pair,
        Err(e) => return fail(None, format!("frontmatter error: {}", e)),
    };

    let description = config.description.clone();
    let result = Interpreter::new(config.config.clone()).interpret(source);

    let checks = [
        check_outcome(&config, &result),
        check_document(&config, &result),
        config
            .expect_warnings
            .as_deref()
            .and_then(|expected| check_warnings(&result.warning_diagnostics(), expected)),
    ];

    match checks.into_iter().flatten().next() {
        Some(reason) => fail(description, reason),
        None => TestResult {
            path: path.to_path_buf(),
            description,
            outcome: TestOutcome::Pass,
        },
    }
}

/// Success flag, first error text and first error line.
fn check_outcome(config: &TestConfig, result: &CompositeResult) -> Option<String> {
    if result.success != config.expect_success {
        return Some(match &result.error {
            Some(error) if config.expect_success => format!(
                "expected success, got error on line {}: {}",
                result.line_number.unwrap_or(0),
                error
            ),
            _ if config.expect_success => "expected success, got failure".to_string(),
            _ => "expected failure, but interpretation succeeded".to_string(),
        });
    }

    if let Some(expected) = &config.expect_error {
        match &result.error {
            Some(error) if error.contains(expected.as_str()) => {}
            Some(error) => {
                return Some(format!(
                    "expected error containing \"{}\", got: {}",
                    expected, error
                ));
            }
            None => {
                return Some(format!(
                    "expected error containing \"{}\", but there was none",
                    expected
                ));
            }
        }
    }

    if let Some(expected_line) = config.expect_error_line {
        if result.line_number != Some(expected_line) {
            return Some(format!(
                "expected error on line {}, got {:?}",
                expected_line, result.line_number
            ));
        }
    }

    None
}

fn check_document(config: &TestConfig, result: &CompositeResult) -> Option<String> {
    let document = result.combined_output.as_deref().unwrap_or("");

    for needle in &config.expect_contains {
        if !document.contains(needle.as_str()) {
            return Some(format!(
                "output does not contain \"{}\"\n  output:\n{}",
                needle,
                indent(document)
            ));
        }
    }

    for needle in &config.expect_not_contains {
        if document.contains(needle.as_str()) {
            return Some(format!("output unexpectedly contains \"{}\"", needle));
        }
    }

    None
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("    {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check that actual warnings match expectations. Returns `Some(reason)` on mismatch.
fn check_warnings(
    actual: &[(Target, LineDiagnostic)],
    expected: &[ExpectedWarning],
) -> Option<String> {
    let rendered: Vec<String> = actual
        .iter()
        .map(|(target, d)| format!("[{}] {}", target, d))
        .collect();

    if actual.len() != expected.len() {
        let listed: Vec<String> = rendered.iter().map(|w| format!("  - {}", w)).collect();
        return Some(format!(
            "expected {} warning(s), got {}\n  actual warnings:\n{}",
            expected.len(),
            actual.len(),
            if listed.is_empty() {
                "    (none)".to_string()
            } else {
                listed.join("\n")
            }
        ));
    }

    for (i, ((_, diagnostic), expected)) in actual.iter().zip(expected).enumerate() {
        if !rendered[i].contains(&expected.contains) {
            return Some(format!(
                "warning[{}]: expected message containing \"{}\", got: {}",
                i, expected.contains, rendered[i]
            ));
        }

        if let Some(expected_line) = expected.line {
            if diagnostic.line != expected_line {
                return Some(format!(
                    "warning[{}]: expected on line {}, but it is on line {}",
                    i, expected_line, diagnostic.line
                ));
            }
        }
    }

    None
}

/// Discover `.test.wahy` files grouped by category (subfolder relative to root).
/// Files directly in `root` get category "" (uncategorized).
fn discover_categorized(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    collect_tests(root, root, &mut categories);
    for files in categories.values_mut() {
        files.sort();
    }
    categories
}

fn collect_tests(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_tests(&path, root, out);
        } else if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name.ends_with(TEST_SUFFIX))
        {
            let category = path
                .parent()
                .and_then(|p| p.strip_prefix(root).ok())
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();
            out.entry(category).or_default().push(path);
        }
    }
}

/// List available categories for the given test path.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }

    let categories = discover_categorized(path);
    if categories.is_empty() {
        eprintln!("no {} files found in {}", TEST_SUFFIX, path.display());
        return;
    }

    eprintln!("available categories:");
    for (cat, files) in &categories {
        let label = if cat.is_empty() { "(root)" } else { cat.as_str() };
        eprintln!("  {} ({} tests)", label, files.len());
    }
}

fn pass_label(no_color: bool) -> &'static str {
    if no_color { "PASS" } else { "\x1b[32mPASS\x1b[0m" }
}

fn fail_label(no_color: bool) -> &'static str {
    if no_color { "FAIL" } else { "\x1b[31mFAIL\x1b[0m" }
}

fn ok_label(no_color: bool) -> &'static str {
    if no_color { "ok" } else { "\x1b[32mok\x1b[0m" }
}

fn failed_label(no_color: bool) -> &'static str {
    if no_color { "FAILED" } else { "\x1b[31mFAILED\x1b[0m" }
}

fn bold(s: &str, no_color: bool) -> String {
    if no_color {
        s.to_string()
    } else {
        format!("\x1b[1m{}\x1b[0m", s)
    }
}

fn label_for(result: &TestResult) -> &str {
    result.description.as_deref().unwrap_or_else(|| {
        result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .and_then(|s| s.strip_suffix(TEST_SUFFIX))
            .unwrap_or("?")
    })
}

fn print_failures(failures: &[TestResult]) {
    eprintln!();
    eprintln!("failures:");
    for f in failures {
        eprintln!();
        eprintln!("  --- {} ---", f.path.display());
        if let TestOutcome::Fail(reason) = &f.outcome {
            for line in reason.lines() {
                eprintln!("  {}", line);
            }
        }
    }
}

/// Run all `.test.wahy` files under `path` (or a single file).
/// If `categories` is non-empty, only run tests in those categories.
/// Returns exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let run_categories: BTreeMap<String, Vec<PathBuf>> = if path.is_file() {
        BTreeMap::from([(String::new(), vec![path.to_path_buf()])])
    } else {
        let all_categories = discover_categorized(path);
        if all_categories.is_empty() {
            eprintln!("no {} files found in {}", TEST_SUFFIX, path.display());
            return 1;
        }
        select_categories(all_categories, categories)
    };

    if run_categories.is_empty() {
        eprintln!("no matching categories found");
        return 1;
    }

    let mut passed = 0usize;
    let mut failures: Vec<TestResult> = Vec::new();

    for (cat, files) in &run_categories {
        if !path.is_file() {
            let header = if cat.is_empty() { "(root)" } else { cat.as_str() };
            eprintln!();
            eprintln!("{}", bold(header, no_color));
        }

        for file in files {
            let result = run_single_test(file);
            match &result.outcome {
                TestOutcome::Pass => {
                    passed += 1;
                    eprintln!("  {}  {}", pass_label(no_color), label_for(&result));
                }
                TestOutcome::Fail(_) => {
                    eprintln!("  {}  {}", fail_label(no_color), label_for(&result));
                    failures.push(result);
                }
            }
        }
    }

    if !failures.is_empty() {
        print_failures(&failures);
    }

    eprintln!();
    if failures.is_empty() {
        eprintln!("test result: {}. {} passed, 0 failed", ok_label(no_color), passed);
        0
    } else {
        let failed = failures.len();
        eprintln!(
            "test result: {}. {} passed, {} failed (of {})",
            failed_label(no_color),
            passed,
            failed,
            passed + failed
        );
        1
    }
}

/// Keep the requested categories, including their sub-categories.
fn select_categories(
    all: BTreeMap<String, Vec<PathBuf>>,
    requested: &[String],
) -> BTreeMap<String, Vec<PathBuf>> {
    if requested.is_empty() {
        return all;
    }

    let mut selected = BTreeMap::new();
    for request in requested {
        let req = request.trim_matches('/');
        let matching: Vec<&String> = all
            .keys()
            .filter(|cat| cat.as_str() == req || cat.starts_with(&format!("{}/", req)))
            .collect();
        if matching.is_empty() {
            eprintln!(
                "warning: category '{}' not found (available: {})",
                req,
                all.keys()
                    .map(|k| if k.is_empty() { "(root)" } else { k.as_str() })
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        for cat in matching {
            selected.insert(cat.clone(), all[cat].clone());
        }
    }
    selected
}
