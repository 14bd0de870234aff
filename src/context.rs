//! Process-wide theme state.
//!
//! Holds the current theme, mode, and the list of themes the caller can
//! pick from. Every change of the rendered variant pushes the eighteen CSS
//! variables and the root mode class to a [`StyleSink`].

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::error::{Result, ThemeError};
use crate::service::ThemeService;
use crate::theme::{
    ColorKey, Theme, ThemeMode, ThemeVariant, default_theme, get_theme_variables,
    get_theme_variant,
};

/// Preference kept on the device for anonymous sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalPreference {
    #[serde(default)]
    pub theme_name: Option<String>,
    #[serde(default)]
    pub dark_mode: bool,
}

/// Non-networked preference storage.
pub trait LocalPreferences: Send {
    /// `None` when nothing has been stored yet.
    fn load(&self) -> Option<LocalPreference>;

    fn store(&self, preference: &LocalPreference) -> Result<()>;
}

/// Local preferences held in memory.
#[derive(Debug, Default)]
pub struct MemoryLocalPreferences {
    value: Mutex<Option<LocalPreference>>,
}

impl MemoryLocalPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(preference: LocalPreference) -> Self {
        Self {
            value: Mutex::new(Some(preference)),
        }
    }
}

impl LocalPreferences for MemoryLocalPreferences {
    fn load(&self) -> Option<LocalPreference> {
        self.value.lock().ok()?.clone()
    }

    fn store(&self, preference: &LocalPreference) -> Result<()> {
        let mut value = self
            .value
            .lock()
            .map_err(|_| ThemeError::Other("local preference lock poisoned".to_string()))?;
        *value = Some(preference.clone());
        Ok(())
    }
}

/// Local preferences stored as a small JSON file.
#[derive(Debug, Clone)]
pub struct FileLocalPreferences {
    path: PathBuf,
}

impl FileLocalPreferences {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LocalPreferences for FileLocalPreferences {
    fn load(&self) -> Option<LocalPreference> {
        let text = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&text) {
            Ok(pref) => Some(pref),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring unreadable local preference");
                None
            }
        }
    }

    fn store(&self, preference: &LocalPreference) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(preference)
            .map_err(|e| ThemeError::Other(format!("Failed to encode local preference: {e}")))?;
        std::fs::write(&self.path, json)?;
        trace!(path = %self.path.display(), "Local preference written");
        Ok(())
    }
}

/// Receiver of style custom properties.
pub trait StyleSink {
    fn set_property(&mut self, name: &str, value: &str);

    /// Toggles the coarse light/dark marker on the document root.
    fn set_root_class(&mut self, mode: ThemeMode);
}

/// Collects applied properties and renders them as a stylesheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CssVariables {
    properties: BTreeMap<String, String>,
    root_class: Option<&'static str>,
    applications: usize,
}

impl CssVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    pub const fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub const fn root_class(&self) -> Option<&'static str> {
        self.root_class
    }

    /// How many times the root class has been (re)applied.
    pub const fn applications(&self) -> usize {
        self.applications
    }

    /// Renders `:root { --key: value; ... }`.
    pub fn render(&self) -> String {
        let mut css = String::from(":root {\n");
        for (name, value) in &self.properties {
            let _ = writeln!(css, "  {name}: {value};");
        }
        css.push_str("}\n");
        css
    }
}

impl StyleSink for CssVariables {
    fn set_property(&mut self, name: &str, value: &str) {
        self.properties.insert(name.to_string(), value.to_string());
    }

    fn set_root_class(&mut self, mode: ThemeMode) {
        self.root_class = Some(mode.css_class());
        self.applications += 1;
    }
}

/// Pushes the variables of `theme` in `mode` and the root class to `sink`.
pub fn apply_theme<S: StyleSink + ?Sized>(sink: &mut S, theme: &Theme, mode: ThemeMode) {
    let variables = get_theme_variables(get_theme_variant(theme, mode));
    for (name, value) in &variables {
        sink.set_property(name, value);
    }
    sink.set_root_class(mode);
    trace!(count = variables.len(), %mode, "Applied theme variables");
}

/// Application-wide theme state.
pub struct ThemeContext<S: StyleSink = CssVariables> {
    service: ThemeService,
    local: Box<dyn LocalPreferences>,
    styles: S,
    current_theme: Theme,
    mode: ThemeMode,
    default_mode: ThemeMode,
    available_themes: Vec<Theme>,
}

impl<S: StyleSink> ThemeContext<S> {
    /// Starts on the built-in theme in light mode; call [`Self::init`] next.
    pub fn new(service: ThemeService, local: Box<dyn LocalPreferences>, styles: S) -> Self {
        Self {
            service,
            local,
            styles,
            current_theme: default_theme(),
            mode: ThemeMode::Light,
            default_mode: ThemeMode::Light,
            available_themes: vec![default_theme()],
        }
    }

    /// Mode for anonymous sessions with nothing stored locally.
    #[must_use]
    pub const fn with_default_mode(mut self, mode: ThemeMode) -> Self {
        self.default_mode = mode;
        self
    }

    pub const fn current_theme(&self) -> &Theme {
        &self.current_theme
    }

    pub fn current_variant(&self) -> &ThemeVariant {
        get_theme_variant(&self.current_theme, self.mode)
    }

    pub const fn mode(&self) -> ThemeMode {
        self.mode
    }

    pub const fn is_dark_mode(&self) -> bool {
        self.mode.is_dark()
    }

    pub fn available_themes(&self) -> &[Theme] {
        &self.available_themes
    }

    pub const fn styles(&self) -> &S {
        &self.styles
    }

    pub const fn service(&self) -> &ThemeService {
        &self.service
    }

    fn local_dark_mode(&self) -> bool {
        self.local.load().is_some_and(|p| p.dark_mode)
    }

    fn list_default(&self) -> Theme {
        self.available_themes
            .iter()
            .find(|t| t.is_default)
            .or_else(|| self.available_themes.first())
            .cloned()
            .unwrap_or_else(default_theme)
    }

    /// Resolves the starting theme and mode, then applies styles.
    ///
    /// Signed in: stored preference, else the list default. The mode comes
    /// from the stored record when one exists, else from the local flag.
    /// Anonymous: local preference by theme name. Otherwise the built-in
    /// theme in the default mode.
    pub fn init(&mut self) {
        self.available_themes = self.service.get_user_themes();

        if self.service.session().is_authenticated() {
            let stored = self.service.find_user_active_theme();
            let resolved = stored
                .as_ref()
                .and_then(|p| p.theme_id.as_deref())
                .and_then(|id| {
                    self.available_themes
                        .iter()
                        .find(|t| t.id.as_deref() == Some(id))
                        .cloned()
                });

            self.current_theme = match resolved {
                Some(theme) => {
                    debug!(theme = %theme.name, "Restored stored preference");
                    theme
                }
                None => self.list_default(),
            };
            // The local flag only stands in when no remote record exists.
            self.mode = match &stored {
                Some(preference) => preference.mode(),
                None => ThemeMode::from_dark(self.local_dark_mode()),
            };
        } else {
            let local = self.local.load();
            self.current_theme = local
                .as_ref()
                .and_then(|l| l.theme_name.as_deref())
                .and_then(|name| self.available_themes.iter().find(|t| t.name == name))
                .cloned()
                .unwrap_or_else(default_theme);
            self.mode = local.map_or(self.default_mode, |l| ThemeMode::from_dark(l.dark_mode));
        }

        info!(theme = %self.current_theme.name, mode = %self.mode, "Theme context initialized");
        self.apply_styles();
    }

    /// Reloads the theme list, picking up saved changes to the current theme.
    pub fn refresh_themes(&mut self) {
        self.available_themes = self.service.get_user_themes();
        let refreshed = self.current_theme.id.as_deref().and_then(|id| {
            self.available_themes
                .iter()
                .find(|t| t.id.as_deref() == Some(id))
                .cloned()
        });
        if let Some(theme) = refreshed {
            self.current_theme = theme;
            self.apply_styles();
        }
    }

    /// Switches theme, keeping the mode. Unknown ids select the built-in theme.
    ///
    /// The switch always takes effect locally; a persistence failure is
    /// returned afterwards.
    pub fn set_theme(&mut self, theme_id: &str) -> Result<()> {
        self.current_theme = self
            .available_themes
            .iter()
            .find(|t| t.id.as_deref() == Some(theme_id))
            .cloned()
            .unwrap_or_else(|| {
                debug!(theme_id, "Unknown theme id, using built-in theme");
                default_theme()
            });
        self.apply_styles();
        self.persist(true)
    }

    /// Flips light/dark and persists the new pairing.
    pub fn toggle_dark_mode(&mut self) -> Result<ThemeMode> {
        self.mode = self.mode.toggled();
        self.apply_styles();
        self.persist(false)?;
        Ok(self.mode)
    }

    /// Optimistic edit of the rendered variant. Not persisted.
    pub fn update_color(&mut self, key: ColorKey, value: &str) -> Result<()> {
        self.current_theme
            .variant_mut(self.mode)
            .colors
            .set(key, value)?;
        self.apply_styles();
        Ok(())
    }

    fn persist(&self, theme_changed: bool) -> Result<()> {
        let local = LocalPreference {
            theme_name: Some(self.current_theme.name.clone()),
            dark_mode: self.mode.is_dark(),
        };
        if let Err(e) = self.local.store(&local) {
            warn!(error = %e, "Failed to store local theme preference");
        }

        if !self.service.session().is_authenticated() {
            return Ok(());
        }
        // Mode flips on an unsaved theme stay local.
        if !theme_changed && self.current_theme.id.is_none() && !self.current_theme.is_default {
            return Ok(());
        }
        self.service
            .set_active_theme(self.current_theme.id.as_deref(), self.mode.is_dark())
    }

    fn apply_styles(&mut self) {
        apply_theme(&mut self.styles, &self.current_theme, self.mode);
    }
}
