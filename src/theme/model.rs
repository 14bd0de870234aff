//! Palette, variant, and theme value types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::color::parse_color;
use crate::error::{Result, ThemeError};

/// Name of the built-in fallback theme.
pub const DEFAULT_THEME_NAME: &str = "Default";

/// The eighteen named color slots of a palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeColors {
    // Primary colors
    pub primary: String,
    pub secondary: String,
    pub accent: String,

    // Background colors
    pub background: String,
    pub background_secondary: String,

    // Text colors
    pub text: String,
    pub text_secondary: String,
    pub text_muted: String,

    // Status colors
    pub success: String,
    pub error: String,
    pub warning: String,
    pub info: String,

    // Border colors
    pub border: String,
    pub border_light: String,

    // Button colors
    pub button_background: String,
    pub button_text: String,
    pub button_secondary_background: String,
    pub button_secondary_text: String,
}

/// Identifies one slot of [`ThemeColors`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColorKey {
    Primary,
    Secondary,
    Accent,
    Background,
    BackgroundSecondary,
    Text,
    TextSecondary,
    TextMuted,
    Success,
    Error,
    Warning,
    Info,
    Border,
    BorderLight,
    ButtonBackground,
    ButtonText,
    ButtonSecondaryBackground,
    ButtonSecondaryText,
}

impl ColorKey {
    /// Every slot, in declaration order.
    pub const ALL: [Self; 18] = [
        Self::Primary,
        Self::Secondary,
        Self::Accent,
        Self::Background,
        Self::BackgroundSecondary,
        Self::Text,
        Self::TextSecondary,
        Self::TextMuted,
        Self::Success,
        Self::Error,
        Self::Warning,
        Self::Info,
        Self::Border,
        Self::BorderLight,
        Self::ButtonBackground,
        Self::ButtonText,
        Self::ButtonSecondaryBackground,
        Self::ButtonSecondaryText,
    ];

    /// The camelCase key used in JSON and CSS variable names.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Accent => "accent",
            Self::Background => "background",
            Self::BackgroundSecondary => "backgroundSecondary",
            Self::Text => "text",
            Self::TextSecondary => "textSecondary",
            Self::TextMuted => "textMuted",
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Border => "border",
            Self::BorderLight => "borderLight",
            Self::ButtonBackground => "buttonBackground",
            Self::ButtonText => "buttonText",
            Self::ButtonSecondaryBackground => "buttonSecondaryBackground",
            Self::ButtonSecondaryText => "buttonSecondaryText",
        }
    }

    /// CSS custom-property name, e.g. `--primary`.
    pub fn css_variable(self) -> String {
        format!("--{}", self.as_str())
    }
}

impl fmt::Display for ColorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorKey {
    type Err = ThemeError;

    /// Accepts the camelCase key, with or without a leading `--`.
    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().trim_start_matches("--");
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == key)
            .ok_or_else(|| ThemeError::not_found(format!("color key '{s}'")))
    }
}

impl ThemeColors {
    /// Returns the value stored in `key`.
    pub fn get(&self, key: ColorKey) -> &str {
        match key {
            ColorKey::Primary => &self.primary,
            ColorKey::Secondary => &self.secondary,
            ColorKey::Accent => &self.accent,
            ColorKey::Background => &self.background,
            ColorKey::BackgroundSecondary => &self.background_secondary,
            ColorKey::Text => &self.text,
            ColorKey::TextSecondary => &self.text_secondary,
            ColorKey::TextMuted => &self.text_muted,
            ColorKey::Success => &self.success,
            ColorKey::Error => &self.error,
            ColorKey::Warning => &self.warning,
            ColorKey::Info => &self.info,
            ColorKey::Border => &self.border,
            ColorKey::BorderLight => &self.border_light,
            ColorKey::ButtonBackground => &self.button_background,
            ColorKey::ButtonText => &self.button_text,
            ColorKey::ButtonSecondaryBackground => &self.button_secondary_background,
            ColorKey::ButtonSecondaryText => &self.button_secondary_text,
        }
    }

    fn slot_mut(&mut self, key: ColorKey) -> &mut String {
        match key {
            ColorKey::Primary => &mut self.primary,
            ColorKey::Secondary => &mut self.secondary,
            ColorKey::Accent => &mut self.accent,
            ColorKey::Background => &mut self.background,
            ColorKey::BackgroundSecondary => &mut self.background_secondary,
            ColorKey::Text => &mut self.text,
            ColorKey::TextSecondary => &mut self.text_secondary,
            ColorKey::TextMuted => &mut self.text_muted,
            ColorKey::Success => &mut self.success,
            ColorKey::Error => &mut self.error,
            ColorKey::Warning => &mut self.warning,
            ColorKey::Info => &mut self.info,
            ColorKey::Border => &mut self.border,
            ColorKey::BorderLight => &mut self.border_light,
            ColorKey::ButtonBackground => &mut self.button_background,
            ColorKey::ButtonText => &mut self.button_text,
            ColorKey::ButtonSecondaryBackground => &mut self.button_secondary_background,
            ColorKey::ButtonSecondaryText => &mut self.button_secondary_text,
        }
    }

    /// Replaces one slot after validating the new value.
    pub fn set(&mut self, key: ColorKey, value: &str) -> Result<()> {
        parse_color(value).map_err(|_| ThemeError::InvalidColor {
            key: Some(key.as_str().to_string()),
            value: value.to_string(),
        })?;
        *self.slot_mut(key) = value.trim().to_string();
        Ok(())
    }

    /// Iterates `(key, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (ColorKey, &str)> + '_ {
        ColorKey::ALL.into_iter().map(move |k| (k, self.get(k)))
    }

    /// Checks that every slot holds a parseable color.
    pub fn validate(&self) -> Result<()> {
        for (key, value) in self.iter() {
            parse_color(value).map_err(|_| ThemeError::InvalidColor {
                key: Some(key.as_str().to_string()),
                value: value.to_string(),
            })?;
        }
        Ok(())
    }
}

/// One mode (light or dark) of a theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeVariant {
    pub colors: ThemeColors,
}

/// Rendering mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub const fn from_dark(is_dark: bool) -> Self {
        if is_dark { Self::Dark } else { Self::Light }
    }

    pub const fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Marker class toggled on the document root.
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Light => "light-theme",
            Self::Dark => "dark-theme",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named light/dark palette pair with ownership metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub light: ThemeVariant,
    pub dark: ThemeVariant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Theme {
    /// A transient theme seeded from the built-in palette.
    pub fn new_from_default(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_default: false,
            ..default_theme()
        }
    }

    /// True once the theme has been written to a store.
    pub const fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// True if the theme is shared with an organization.
    pub const fn is_organization_scoped(&self) -> bool {
        self.organization_id.is_some()
    }

    pub fn variant(&self, mode: ThemeMode) -> &ThemeVariant {
        get_theme_variant(self, mode)
    }

    pub fn variant_mut(&mut self, mode: ThemeMode) -> &mut ThemeVariant {
        match mode {
            ThemeMode::Dark => &mut self.dark,
            ThemeMode::Light => &mut self.light,
        }
    }

    /// Checks name and both palettes.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ThemeError::MalformedInput("theme name is empty".to_string()));
        }
        self.light.colors.validate()?;
        self.dark.colors.validate()
    }
}

/// Returns the dark variant for [`ThemeMode::Dark`], the light one otherwise.
pub fn get_theme_variant(theme: &Theme, mode: ThemeMode) -> &ThemeVariant {
    match mode {
        ThemeMode::Dark => &theme.dark,
        ThemeMode::Light => &theme.light,
    }
}

/// Projects a variant into `--<key>` style properties, one per slot.
pub fn get_theme_variables(variant: &ThemeVariant) -> BTreeMap<String, String> {
    variant
        .colors
        .iter()
        .map(|(key, value)| (key.css_variable(), value.to_string()))
        .collect()
}

fn light_colors() -> ThemeColors {
    ThemeColors {
        primary: "#3498db".into(),
        secondary: "#2ecc71".into(),
        accent: "#9b59b6".into(),
        background: "#ffffff".into(),
        background_secondary: "#f8f9fa".into(),
        text: "#333333".into(),
        text_secondary: "#6c757d".into(),
        text_muted: "#adb5bd".into(),
        success: "#28a745".into(),
        error: "#dc3545".into(),
        warning: "#ffc107".into(),
        info: "#17a2b8".into(),
        border: "#dee2e6".into(),
        border_light: "#e9ecef".into(),
        button_background: "#3498db".into(),
        button_text: "#ffffff".into(),
        button_secondary_background: "#f8f9fa".into(),
        button_secondary_text: "#3498db".into(),
    }
}

fn dark_colors() -> ThemeColors {
    ThemeColors {
        background: "#121212".into(),
        background_secondary: "#1e1e1e".into(),
        text: "#f8f9fa".into(),
        text_secondary: "#adb5bd".into(),
        text_muted: "#6c757d".into(),
        border: "#343a40".into(),
        border_light: "#495057".into(),
        button_secondary_background: "#343a40".into(),
        ..light_colors()
    }
}

/// The immutable built-in theme used as the fallback everywhere.
pub fn default_theme() -> Theme {
    Theme {
        id: None,
        name: DEFAULT_THEME_NAME.to_string(),
        light: ThemeVariant {
            colors: light_colors(),
        },
        dark: ThemeVariant {
            colors: dark_colors(),
        },
        created_by: None,
        organization_id: None,
        is_default: true,
        created_at: None,
        updated_at: None,
    }
}
