//! Robot-mode end-to-end tests.

use serde_json::{Value, json};
use tempfile::TempDir;

use crate::common::cli::CliRunner;
use crate::common::init_test_logging;

/// Creates a theme as `cli`'s user and returns its id.
fn create_theme(cli: &CliRunner, name: &str) -> String {
    let result = cli.run_robot(&["new", name]);
    result.assert_success();
    result.json()["theme"]["id"]
        .as_str()
        .expect("created theme has an id")
        .to_string()
}

#[test]
fn robot_quick_start_outputs_json() {
    init_test_logging();
    let result = CliRunner::new().run(&["--robot"]);
    result.assert_success();

    let json = result.json();
    assert_eq!(json["tool"], "rtheme");
    assert!(json.get("themes").is_some());
    assert!(json.get("output_modes").is_some());
}

#[test]
fn robot_list_starts_with_builtin_theme() {
    init_test_logging();
    let dir = TempDir::new().unwrap();
    let result = CliRunner::isolated(dir.path()).run_robot(&["list"]);
    result
        .assert_success()
        .assert_json_array_len("", 1)
        .assert_json_field("/0/name", &json!("Default"))
        .assert_json_field("/0/isDefault", &json!(true))
        .assert_json_field("/0/active", &json!(true));
}

#[test]
fn robot_new_then_show_round_trips() {
    init_test_logging();
    let dir = TempDir::new().unwrap();
    let cli = CliRunner::isolated(dir.path()).as_user("alice");

    let id = create_theme(&cli, "Ocean Breeze");
    let shown = cli.run_robot(&["show", &id]);
    shown
        .assert_success()
        .assert_json_field("/name", &json!("Ocean Breeze"))
        .assert_json_field("/createdBy", &json!("alice"))
        .assert_json_field("/light/colors/primary", &json!("#3498db"));

    cli.run_robot(&["list"]).assert_success().assert_json_array_len("", 2);
}

#[test]
fn robot_set_color_updates_only_requested_variant() {
    init_test_logging();
    let dir = TempDir::new().unwrap();
    let cli = CliRunner::isolated(dir.path()).as_user("alice");
    let id = create_theme(&cli, "Harbor");

    cli.run_robot(&["set-color", &id, "accent", "#ff5722", "--dark"])
        .assert_success()
        .assert_json_field("/created", &json!(false));

    let shown = cli.run_robot(&["show", &id]).json();
    assert_eq!(shown["dark"]["colors"]["accent"], "#ff5722");
    assert_eq!(shown["light"]["colors"]["accent"], "#9b59b6");
}

#[test]
fn robot_use_and_toggle_persist_preference() {
    init_test_logging();
    let dir = TempDir::new().unwrap();
    let cli = CliRunner::isolated(dir.path()).as_user("alice");
    let id = create_theme(&cli, "Evening");

    cli.run_robot(&["use", &id, "--dark"])
        .assert_success()
        .assert_json_field("/themeId", &json!(id))
        .assert_json_field("/mode", &json!("dark"))
        .assert_json_field("/rootClass", &json!("dark-theme"))
        .assert_json_field("/signedIn", &json!(true));

    cli.run_robot(&["toggle-dark"])
        .assert_success()
        .assert_json_field("/mode", &json!("light"));

    cli.run_robot(&["active"])
        .assert_success()
        .assert_json_field("/themeId", &json!(id))
        .assert_json_field("/mode", &json!("light"));
}

#[test]
fn robot_css_lists_all_variables() {
    init_test_logging();
    let dir = TempDir::new().unwrap();
    let result = CliRunner::isolated(dir.path()).run_robot(&["css", "--dark"]);
    result.assert_success();

    let json = result.json();
    let vars = json["variables"].as_object().expect("variables object");
    assert_eq!(vars.len(), 18);
    assert_eq!(vars["--background"], "#121212");
}

#[test]
fn robot_export_import_preserves_palettes() {
    init_test_logging();
    let dir = TempDir::new().unwrap();
    let cli = CliRunner::isolated(dir.path()).as_user("alice");
    let id = create_theme(&cli, "Sunset Glow");
    cli.run_robot(&["set-color", &id, "primary", "#ff7043"]).assert_success();

    let out_dir = dir.path().join("exports");
    std::fs::create_dir_all(&out_dir).unwrap();
    let exported = cli.run_robot(&["export", &id, "--out", out_dir.to_str().unwrap()]);
    exported.assert_success();
    let path = exported.json()["path"].as_str().unwrap().to_string();
    assert!(path.ends_with("Sunset_Glow.json"), "unexpected export path {path}");

    let imported = cli.run_robot(&["import", &path, "--save"]);
    imported
        .assert_success()
        .assert_json_field("/created", &json!(true))
        .assert_json_field("/theme/name", &json!("Sunset Glow"))
        .assert_json_field("/theme/light/colors/primary", &json!("#ff7043"));
    assert_ne!(imported.json()["theme"]["id"], json!(id));
}

#[test]
fn robot_malformed_import_reports_fallback() {
    init_test_logging();
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("broken.json");
    std::fs::write(&file, "{ not json").unwrap();

    let result = CliRunner::isolated(dir.path()).run_robot(&["import", file.to_str().unwrap()]);
    result
        .assert_success()
        .assert_json_field("/name", &json!("Default"))
        .assert_stderr_contains("malformed_import");
}

#[test]
fn robot_apply_org_fans_out_to_members() {
    init_test_logging();
    let dir = TempDir::new().unwrap();
    let admin = CliRunner::isolated(dir.path());
    for (user, role) in [("owner", "owner"), ("m1", "member"), ("m2", "member")] {
        admin
            .run_robot(&["member", "add", "house-1", user, role])
            .assert_success()
            .assert_json_field("/role", &json!(role));
    }

    let owner = CliRunner::isolated(dir.path()).as_user("owner");
    let created = owner.run_robot(&["new", "House Colors", "--organization"]);
    created
        .assert_success()
        .assert_json_field("/theme/organizationId", &json!("house-1"));
    let id = created.json()["theme"]["id"].as_str().unwrap().to_string();

    owner
        .run_robot(&["apply-org", &id])
        .assert_success()
        .assert_json_field("/ok", &json!(true))
        .assert_json_field("/updated", &json!(["m1", "m2", "owner"]));

    CliRunner::isolated(dir.path())
        .as_user("m2")
        .run_robot(&["active"])
        .assert_success()
        .assert_json_field("/themeId", &json!(id))
        .assert_json_field("/name", &json!("House Colors"));
}

#[test]
fn robot_member_cannot_apply_org_theme() {
    init_test_logging();
    let dir = TempDir::new().unwrap();
    let admin = CliRunner::isolated(dir.path());
    admin.run_robot(&["member", "add", "house-1", "owner", "owner"]).assert_success();
    admin.run_robot(&["member", "add", "house-1", "m1", "member"]).assert_success();

    let owner = CliRunner::isolated(dir.path()).as_user("owner");
    let id = create_theme(&owner, "Owner Only");

    let result = CliRunner::isolated(dir.path())
        .as_user("m1")
        .run_robot(&["apply-org", &id]);
    result.assert_failure();
    assert_eq!(result.exit_code, 1);
    assert!(result.stdout.trim().is_empty());

    let err = result.stderr_json();
    assert_eq!(err["error"], true);
    assert!(err["message"].as_str().unwrap().contains("Permission denied"));
    assert_eq!(err["recoverable"], false);
    assert_eq!(err["suggestion"], "Ask an organization owner to make this change");
}

#[test]
fn robot_error_for_missing_theme() {
    init_test_logging();
    let dir = TempDir::new().unwrap();
    let result = CliRunner::isolated(dir.path())
        .as_user("alice")
        .run_robot(&["show", "no-such-theme"]);
    result.assert_failure();

    let err: Value = result.stderr_json();
    assert_eq!(err["error"], true);
    assert!(err["message"].as_str().unwrap().contains("no-such-theme"));
    assert!(err.get("suggestion").is_some());
}

#[test]
fn robot_writes_require_a_user() {
    init_test_logging();
    let dir = TempDir::new().unwrap();
    let result = CliRunner::isolated(dir.path()).run_robot(&["new", "Nobody's"]);
    result.assert_failure();
    assert_eq!(result.stderr_json()["error"], true);
}

#[test]
fn robot_compact_format_is_single_line() {
    init_test_logging();
    let dir = TempDir::new().unwrap();
    let result = CliRunner::isolated(dir.path()).run(&["--format=json-compact", "list"]);
    result.assert_success();
    assert_eq!(result.stdout.trim().lines().count(), 1);
    assert!(result.json().is_array());
}
