//! Integration tests for the command-line interface.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const TARGET: &str = "src/webparts/library/LibraryWebPart.ts";

fn fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|err| panic!("failed to load fixture {name}: {err}"))
}

/// Helper to create a workspace holding the unpatched web part
fn setup_workspace() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join(TARGET);
    fs::create_dir_all(target.parent().unwrap()).unwrap();
    fs::write(&target, fixture("LibraryWebPart.ts.input")).unwrap();
    (dir, target)
}

fn run_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lint-patcher"))
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("LINT_PATCHER_LOG")
        .output()
        .unwrap()
}

#[test]
fn test_no_arguments_patches_default_target() {
    let (workspace, target) = setup_workspace();

    let output = run_in(workspace.path(), &[]);

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "Lint fixes applied!\n");
    assert_eq!(
        fs::read_to_string(&target).unwrap(),
        fixture("LibraryWebPart.ts.expected")
    );
}

#[test]
fn test_missing_target_fails_without_creating_it() {
    let workspace = TempDir::new().unwrap();

    let output = run_in(workspace.path(), &[]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read"));
    assert!(stderr.contains("LibraryWebPart.ts"));
    assert!(output.stdout.is_empty());
    assert!(!workspace.path().join(TARGET).exists());
    assert_eq!(fs::read_dir(workspace.path()).unwrap().count(), 0);
}

#[test]
fn test_apply_dry_run_leaves_file() {
    let (workspace, target) = setup_workspace();

    let output = run_in(workspace.path(), &["apply", "--dry-run"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("DRY RUN"));
    assert!(stdout.contains("1 of 1 file(s) would change"));
    assert!(!stdout.contains("Lint fixes applied!"));
    assert_eq!(
        fs::read_to_string(&target).unwrap(),
        fixture("LibraryWebPart.ts.input")
    );
}

#[test]
fn test_apply_with_diff_and_report() {
    let (workspace, _target) = setup_workspace();

    let output = run_in(workspace.path(), &["apply", "--diff", "--report"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("+    const closeModal = (): void => {"));
    assert!(stdout.contains("-    const closeModal = () => {"));
    assert!(stdout.contains("@@ -"));
    assert!(stdout.contains("replacement(s))"));
    assert!(stdout.contains("bracket-to-dot-notation: matched 2 times"));
    assert!(stdout.contains("catch-parameter-name: matched once"));
    assert!(stdout.ends_with("Lint fixes applied!\n"));
}

#[test]
fn test_report_shows_rules_that_matched_nothing() {
    let (workspace, _target) = setup_workspace();

    run_in(workspace.path(), &[]);
    let output = run_in(workspace.path(), &["apply", "--report"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("catch-parameter-name: no match"));
    assert!(stdout.contains("7 of 12 rule(s) matched nothing"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("rule matched nothing"));
}

#[test]
fn test_status_json_is_read_only() {
    let (workspace, target) = setup_workspace();

    let output = run_in(workspace.path(), &["status", "--format", "json"]);

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let file = &report["files"][0];
    assert_eq!(file["changed"], true);
    assert_eq!(file["written"], false);
    assert_eq!(file["rules"].as_array().unwrap().len(), 12);
    assert_eq!(file["rules"][0]["id"], "unnecessary-escape-star");
    assert_eq!(
        fs::read_to_string(&target).unwrap(),
        fixture("LibraryWebPart.ts.input")
    );
}

#[test]
fn test_verify_before_and_after_apply() {
    let (workspace, _target) = setup_workspace();

    let before = run_in(workspace.path(), &["verify"]);
    assert_eq!(before.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&before.stderr);
    assert!(stderr.contains("MISMATCH"));
    assert!(stderr.contains("Pending: close-modal-return-type: matched once"));

    let apply = run_in(workspace.path(), &["apply"]);
    assert!(apply.status.success());

    let after = run_in(workspace.path(), &["verify"]);
    assert!(after.status.success());
    let stdout = String::from_utf8_lossy(&after.stdout);
    assert!(stdout.contains("Verified"));
    assert!(stdout.contains("1 verified"));
}

#[test]
fn test_list_prints_rules_in_order() {
    let workspace = TempDir::new().unwrap();

    let output = run_in(workspace.path(), &["list"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let first = stdout.find("unnecessary-escape-star").unwrap();
    let middle = stdout.find("bracket-to-dot-notation").unwrap();
    let last = stdout.find("disable-any-original-click-call").unwrap();
    assert!(first < middle && middle < last);
    assert!(stdout.contains("(re-applies on every run)"));
    assert!(stdout.contains("Target: src/webparts/library/LibraryWebPart.ts"));
    assert!(stdout.contains(r"pattern:     this\.sectionData\['main'\]"));
}

#[test]
fn test_list_rejects_invalid_pattern() {
    let workspace = TempDir::new().unwrap();
    fs::write(
        workspace.path().join("broken.toml"),
        "[[rules]]\nid = \"broken\"\npattern = '(unclosed'\nreplacement = ''\n",
    )
    .unwrap();

    let output = run_in(workspace.path(), &["list", "--rules", "broken.toml"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("rule 'broken'"));
}

#[test]
fn test_custom_rules_and_glob_target() {
    let workspace = TempDir::new().unwrap();
    fs::write(
        workspace.path().join("rules.toml"),
        r#"
[[rules]]
id = "var-to-let"
pattern = '\bvar\b'
replacement = 'let'
"#,
    )
    .unwrap();
    fs::create_dir(workspace.path().join("src")).unwrap();
    fs::write(workspace.path().join("src/a.js"), "var a = 1;\n").unwrap();
    fs::write(workspace.path().join("src/b.js"), "var b = 2; var c;\n").unwrap();

    let output = run_in(
        workspace.path(),
        &["apply", "--rules", "rules.toml", "--target", "src/*.js"],
    );

    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(workspace.path().join("src/a.js")).unwrap(),
        "let a = 1;\n"
    );
    assert_eq!(
        fs::read_to_string(workspace.path().join("src/b.js")).unwrap(),
        "let b = 2; let c;\n"
    );
}

#[test]
fn test_invalid_rule_pattern_fails_before_touching_target() {
    let (workspace, target) = setup_workspace();
    fs::write(
        workspace.path().join("broken.toml"),
        "[[rules]]\nid = \"broken\"\npattern = '(unclosed'\nreplacement = ''\n",
    )
    .unwrap();

    let output = run_in(workspace.path(), &["apply", "--rules", "broken.toml"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("rule 'broken'"));
    assert_eq!(
        fs::read_to_string(&target).unwrap(),
        fixture("LibraryWebPart.ts.input")
    );
}

#[test]
fn test_workspace_flag_resolves_relative_target() {
    let (workspace, target) = setup_workspace();
    let elsewhere = TempDir::new().unwrap();

    let output = run_in(
        elsewhere.path(),
        &["apply", "--workspace", workspace.path().to_str().unwrap()],
    );

    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(&target).unwrap(),
        fixture("LibraryWebPart.ts.expected")
    );
}
