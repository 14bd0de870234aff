//! Argument parsing, help, and completion tests.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn rtheme(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("rtheme").unwrap();
    cmd.env("RUST_LOG", "off")
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env("RTHEME_DB", home.path().join("themes.db"))
        .env_remove("RTHEME_USER")
        .env_remove("RTHEME_FORMAT");
    cmd
}

#[test]
fn help_lists_theme_commands() {
    let home = TempDir::new().unwrap();
    rtheme(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("set-color")
                .and(predicate::str::contains("toggle-dark"))
                .and(predicate::str::contains("apply-org")),
        );
}

#[test]
fn version_reports_package_version() {
    let home = TempDir::new().unwrap();
    rtheme(&home)
        .args(["--robot", "version"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "\"version\": \"{}\"",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn completions_for_bash() {
    let home = TempDir::new().unwrap();
    rtheme(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rtheme"));
}

#[test]
fn unknown_role_is_rejected_by_parser() {
    let home = TempDir::new().unwrap();
    rtheme(&home)
        .args(["member", "add", "org-1", "u1", "janitor"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown role"));
}

#[test]
fn unknown_color_key_is_not_found() {
    let home = TempDir::new().unwrap();
    rtheme(&home)
        .args(["--robot", "--user", "alice", "set-color", "default", "sparkle", "#fff"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("color key 'sparkle'"));
}

#[test]
fn explicit_missing_config_fails() {
    let home = TempDir::new().unwrap();
    let missing = home.path().join("nope.toml");
    rtheme(&home)
        .arg("--config")
        .arg(&missing)
        .arg("list")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("config file"));
}

#[test]
fn config_file_supplies_user_and_dark_default() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("rtheme.toml");
    std::fs::write(&config, "user_id = \"from-config\"\n").unwrap();

    rtheme(&home)
        .arg("--robot")
        .arg("--config")
        .arg(&config)
        .arg("active")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"signedIn\": true"));
}

#[test]
fn anonymous_default_dark_mode_from_config() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("rtheme.toml");
    std::fs::write(&config, "default_dark_mode = true\n").unwrap();

    rtheme(&home)
        .arg("--robot")
        .arg("--config")
        .arg(&config)
        .arg("active")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"mode\": \"dark\"")
                .and(predicate::str::contains("\"signedIn\": false")),
        );
}
