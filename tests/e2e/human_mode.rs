//! Human-mode end-to-end tests.

use tempfile::TempDir;

use crate::common::cli::CliRunner;
use crate::common::init_test_logging;

fn plain(dir: &TempDir) -> CliRunner {
    CliRunner::isolated(dir.path()).with_env("NO_COLOR", "true")
}

#[test]
fn human_quick_start_without_command() {
    init_test_logging();
    let result = CliRunner::new().with_env("NO_COLOR", "true").run(&[]);
    result
        .assert_success()
        .assert_stdout_contains("QUICK START")
        .assert_stdout_contains("rtheme list");
}

#[test]
fn human_list_marks_active_theme() {
    init_test_logging();
    let dir = TempDir::new().unwrap();
    plain(&dir)
        .run(&["list"])
        .assert_success()
        .assert_stdout_matches(r"(?m)^\* default\s+Default \(built-in\)$");
}

#[test]
fn human_no_color_has_no_escape_codes() {
    init_test_logging();
    let dir = TempDir::new().unwrap();
    let result = plain(&dir).run(&["show", "default"]);
    result
        .assert_success()
        .assert_stdout_contains("light palette")
        .assert_stdout_contains("dark palette")
        .assert_stdout_contains("#121212");
    assert!(!result.stdout.contains('\u{1b}'), "unexpected ANSI escape");
}

#[test]
fn human_css_prints_stylesheet() {
    init_test_logging();
    let dir = TempDir::new().unwrap();
    plain(&dir)
        .run(&["css"])
        .assert_success()
        .assert_stdout_contains("/* root class: light-theme */")
        .assert_stdout_contains(":root {")
        .assert_stdout_contains("  --background: #ffffff;");
}

#[test]
fn human_anonymous_toggle_is_remembered_locally() {
    init_test_logging();
    let dir = TempDir::new().unwrap();
    let cli = plain(&dir);

    cli.run(&["toggle-dark"])
        .assert_success()
        .assert_stdout_contains("(dark mode)")
        .assert_stdout_contains("not signed in");
    cli.run(&["active"])
        .assert_success()
        .assert_stdout_contains("Default")
        .assert_stdout_contains("(dark mode)");
}

#[test]
fn human_create_and_delete() {
    init_test_logging();
    let dir = TempDir::new().unwrap();
    let cli = plain(&dir).as_user("alice");

    let created = cli.run(&["new", "Quiet Morning"]);
    created
        .assert_success()
        .assert_stdout_matches(r"\[OK\] Created 'Quiet Morning' \([0-9a-f-]{36}\)");
    let id = created
        .stdout
        .rsplit('(')
        .next()
        .and_then(|rest| rest.split(')').next())
        .unwrap()
        .to_string();

    cli.run(&["delete", &id])
        .assert_success()
        .assert_stdout_contains(&format!("Deleted {id}"));
    cli.run(&["delete", &id])
        .assert_success()
        .assert_stderr_contains("nothing deleted");
}

#[test]
fn human_default_theme_cannot_be_deleted() {
    init_test_logging();
    let dir = TempDir::new().unwrap();
    let result = plain(&dir).as_user("alice").run(&["rm", "default"]);
    result
        .assert_failure()
        .assert_stderr_contains("Error: The built-in default theme cannot be deleted");
}

#[test]
fn human_invalid_color_shows_hint() {
    init_test_logging();
    let dir = TempDir::new().unwrap();
    let cli = plain(&dir).as_user("alice");
    let created = cli.run(&["--robot", "new", "Palette"]);
    created.assert_success();
    let id = created.json()["theme"]["id"].as_str().unwrap().to_string();

    cli.run(&["set-color", &id, "primary", "very blue"])
        .assert_failure()
        .assert_stderr_contains("Invalid color")
        .assert_stderr_contains("Hint: Use #rgb");
}

#[test]
fn human_categories_and_preview() {
    init_test_logging();
    let dir = TempDir::new().unwrap();
    let cli = plain(&dir);

    cli.run(&["categories"])
        .assert_success()
        .assert_stdout_contains("Primary Colors")
        .assert_stdout_contains("buttonSecondaryText");
    cli.run(&["preview", "--dark"])
        .assert_success()
        .assert_stdout_contains("Phone preview");
}
