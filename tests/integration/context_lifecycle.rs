//! Integration tests for the theme context and editor lifecycle.

use std::sync::Arc;

use rtheme::context::{
    CssVariables, FileLocalPreferences, LocalPreference, LocalPreferences, MemoryLocalPreferences, ThemeContext,
};
use rtheme::editor::ThemeEditor;
use rtheme::error::ThemeError;
use rtheme::service::{Session, ThemeService};
use rtheme::store::{ActivePreference, MemoryThemeStore, Role};
use rtheme::theme::{ColorKey, Theme, ThemeMode, default_theme};

use crate::common::fixtures::{service_for, stored_theme};

fn context_for(store: &Arc<MemoryThemeStore>, user: &str) -> ThemeContext {
    let mut ctx = ThemeContext::new(
        service_for(store, user),
        Box::new(MemoryLocalPreferences::new()),
        CssVariables::new(),
    );
    ctx.init();
    ctx
}

#[test]
fn test_new_user_starts_on_default_light() {
    let store = Arc::new(MemoryThemeStore::new());
    let ctx = context_for(&store, "newcomer");

    assert_eq!(ctx.current_theme(), &default_theme());
    assert_eq!(ctx.mode(), ThemeMode::Light);
    assert_eq!(ctx.styles().get("--background"), Some("#ffffff"));
    assert_eq!(ctx.styles().root_class(), Some("light-theme"));
    assert!(store.peek_preference("newcomer").is_none());
}

#[test]
fn test_toggle_twice_restores_mode_and_persists_each_flip() {
    let store = Arc::new(MemoryThemeStore::new());
    store.insert_theme(stored_theme("t1", "Forest", "u1", None));
    store.insert_preference("u1", ActivePreference::new(Some("t1".into()), false));
    let mut ctx = context_for(&store, "u1");
    assert_eq!(ctx.current_theme().name, "Forest");

    assert_eq!(ctx.toggle_dark_mode().unwrap(), ThemeMode::Dark);
    assert!(store.peek_preference("u1").unwrap().is_dark_mode);
    assert_eq!(ctx.styles().get("--background"), Some("#121212"));

    assert_eq!(ctx.toggle_dark_mode().unwrap(), ThemeMode::Light);
    let pref = store.peek_preference("u1").unwrap();
    assert_eq!(pref.theme_id.as_deref(), Some("t1"));
    assert!(!pref.is_dark_mode);
}

#[test]
fn test_unsaved_edit_does_not_survive_reload() {
    let store = Arc::new(MemoryThemeStore::new());
    store.insert_theme(stored_theme("t1", "Forest", "u1", None));
    store.insert_preference("u1", ActivePreference::new(Some("t1".into()), false));

    let mut ctx = context_for(&store, "u1");
    ctx.update_color(ColorKey::Primary, "#ff0000").unwrap();
    assert_eq!(ctx.styles().get("--primary"), Some("#ff0000"));
    assert_eq!(store.peek_theme("t1").unwrap().light.colors.primary, "#3498db");

    let reloaded = context_for(&store, "u1");
    assert_eq!(reloaded.current_variant().colors.primary, "#3498db");
}

#[test]
fn test_unsaved_editor_draft_is_not_persisted() {
    let store = Arc::new(MemoryThemeStore::new());
    store.insert_theme(stored_theme("t1", "Forest", "u1", None));
    let service = service_for(&store, "u1");

    let mut editor = ThemeEditor::new(&service);
    editor.load();
    editor.select(Some("t1")).unwrap();
    editor.set_color(ColorKey::Accent, "#00ff00").unwrap();
    assert!(editor.has_unsaved_changes());
    assert_ne!(store.peek_theme("t1").unwrap().light.colors.accent, "#00ff00");

    editor.save().unwrap();
    assert!(!editor.has_unsaved_changes());
    assert_eq!(store.peek_theme("t1").unwrap().light.colors.accent, "#00ff00");
}

#[test]
fn test_editor_apply_requires_saved_theme() {
    let store = Arc::new(MemoryThemeStore::new());
    let service = service_for(&store, "u1");
    let mut editor = ThemeEditor::new(&service);
    editor.load();
    editor.new_theme();

    assert!(matches!(editor.apply(), Err(ThemeError::UnsavedTheme)));
    assert!(store.peek_preference("u1").is_none());

    editor.rename("Calm Waters");
    let saved = editor.save().unwrap();
    editor.set_tab(ThemeMode::Dark);
    editor.apply().unwrap();

    let pref = store.peek_preference("u1").unwrap();
    assert_eq!(pref.theme_id, saved.id);
    assert!(pref.is_dark_mode);
}

#[test]
fn test_anonymous_session_uses_local_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs").join("local.json");
    let store = Arc::new(MemoryThemeStore::new());

    let mut ctx = ThemeContext::new(
        ThemeService::new(store.clone(), Session::anonymous()),
        Box::new(FileLocalPreferences::new(&path)),
        CssVariables::new(),
    );
    ctx.init();
    ctx.toggle_dark_mode().unwrap();
    assert!(store.operations().is_empty());

    let stored = FileLocalPreferences::new(&path).load().unwrap();
    assert_eq!(
        stored,
        LocalPreference {
            theme_name: Some("Default".into()),
            dark_mode: true,
        }
    );

    let mut reopened = ThemeContext::new(
        ThemeService::new(store, Session::anonymous()),
        Box::new(FileLocalPreferences::new(&path)),
        CssVariables::new(),
    );
    reopened.init();
    assert!(reopened.is_dark_mode());
}

#[test]
fn test_set_theme_survives_store_failure_locally() {
    let store = Arc::new(MemoryThemeStore::new());
    store.insert_theme(stored_theme("t1", "Forest", "u1", None));
    let mut ctx = context_for(&store, "u1");

    store.set_unavailable(true);
    let err = ctx.set_theme("t1").unwrap_err();
    assert!(matches!(err, ThemeError::RemoteFailure(_)));
    assert_eq!(ctx.current_theme().id.as_deref(), Some("t1"));
}

#[test]
fn test_stored_light_record_overrides_local_dark_flag() {
    let store = Arc::new(MemoryThemeStore::new());
    store.insert_preference("u1", ActivePreference::new(None, false));

    let mut ctx = ThemeContext::new(
        service_for(&store, "u1"),
        Box::new(MemoryLocalPreferences::with(LocalPreference {
            theme_name: None,
            dark_mode: true,
        })),
        CssVariables::new(),
    );
    ctx.init();

    assert_eq!(ctx.current_theme(), &default_theme());
    assert_eq!(ctx.mode(), ThemeMode::Light);
    assert_eq!(ctx.styles().root_class(), Some("light-theme"));
}

#[tokio::test]
async fn test_member_sees_theme_applied_from_owner_personal_list() {
    let store = Arc::new(MemoryThemeStore::new());
    store.add_member("org-1", "owner", Role::Owner);
    store.add_member("org-1", "m1", Role::Member);
    let owner = service_for(&store, "owner");
    let personal = owner.save_theme(&Theme::new_from_default("Owner Private")).unwrap();

    let report = owner
        .apply_theme_to_organization(personal.id.as_deref().unwrap())
        .await
        .unwrap();
    assert_eq!(report.updated, vec!["m1", "owner"]);
    assert_ne!(Some(&report.theme_id), personal.id.as_ref());

    let ctx = context_for(&store, "m1");
    assert_eq!(ctx.current_theme().name, "Owner Private");
    assert_eq!(ctx.current_theme().id.as_deref(), Some(report.theme_id.as_str()));
}
