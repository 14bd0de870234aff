//! Output mode abstraction for robot and human output.

use std::path::Path;

use serde::Serialize;

use crate::cli::Cli;
use crate::context::CssVariables;
use crate::editor::{ColorCategory, PhonePreview};
use crate::error::ThemeError;
use crate::service::{Fallback, FanOutReport};
use crate::store::{ActivePreference, Role};
use crate::theme::{NativeTheme, Theme, ThemeColors, ThemeMode};

pub mod human;
pub mod robot;

pub use human::HumanOutput;
pub use robot::RobotOutput;

/// One row of the theme list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub is_default: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    pub active: bool,
}

impl ThemeSummary {
    /// Builds the list rows, marking the one `preference` resolves to.
    ///
    /// An unresolved preference marks the first default row, so at most one
    /// row is ever active.
    #[must_use]
    pub fn from_themes(themes: &[Theme], preference: &ActivePreference) -> Vec<Self> {
        let active = themes
            .iter()
            .position(|t| t.id.is_some() && t.id == preference.theme_id)
            .or_else(|| themes.iter().position(|t| t.is_default));
        themes
            .iter()
            .enumerate()
            .map(|(idx, t)| Self {
                id: t.id.clone(),
                name: t.name.clone(),
                is_default: t.is_default,
                organization_id: t.organization_id.clone(),
                active: active == Some(idx),
            })
            .collect()
    }
}

/// The resolved active theme.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTheme {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_id: Option<String>,
    pub name: String,
    pub mode: ThemeMode,
    pub root_class: &'static str,
    pub signed_in: bool,
}

/// Build metadata printed by `version`.
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub version: &'static str,
    pub git_sha: &'static str,
    pub git_dirty: bool,
    pub build_timestamp: &'static str,
    pub rustc_version: &'static str,
    pub target: &'static str,
}

/// JSON formatting options for robot mode.
#[derive(Debug, Clone, Copy)]
pub enum RobotFormat {
    /// Pretty-printed JSON (default for --robot).
    Json,
    /// Single-line JSON (--format=json-compact).
    JsonCompact,
}

/// Determines how command output is rendered.
#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    /// JSON output for AI agents and scripting.
    Robot(RobotFormat),
    /// Styled terminal output for human users.
    Human { color: bool },
}

impl OutputMode {
    /// Create OutputMode from CLI arguments.
    #[must_use]
    pub const fn from_cli(cli: &Cli) -> Self {
        if cli.use_json() {
            let format = if cli.use_compact_json() {
                RobotFormat::JsonCompact
            } else {
                RobotFormat::Json
            };
            Self::Robot(format)
        } else {
            Self::Human {
                color: !cli.no_color,
            }
        }
    }

    /// Returns true if output should be JSON.
    #[must_use]
    pub const fn is_robot(&self) -> bool {
        matches!(self, Self::Robot(_))
    }

    /// Convert into the appropriate Output implementation.
    #[must_use]
    pub fn into_output(self, quiet: bool) -> Box<dyn Output> {
        match self {
            Self::Robot(format) => Box::new(RobotOutput::new(format)),
            Self::Human { color } => Box::new(HumanOutput::new(color, quiet)),
        }
    }
}

/// Trait for all output operations.
///
/// Commands call these methods without knowing the output mode.
pub trait Output {
    // Basic messages
    fn success(&self, message: &str);
    fn error(&self, error: &ThemeError);
    fn warning(&self, message: &str);

    /// Reports reads that degraded to the built-in theme.
    fn fallbacks(&self, fallbacks: &[Fallback]);

    // Themes
    fn theme_list(&self, themes: &[ThemeSummary]);
    fn theme_detail(&self, theme: &Theme, mode: Option<ThemeMode>);
    fn theme_saved(&self, theme: &Theme, created: bool);
    fn theme_deleted(&self, theme_id: &str, removed: bool);
    fn theme_shared(&self, copy: &Theme, to_user: &str);

    // Active theme
    fn active_theme(&self, active: &ActiveTheme);
    fn fan_out(&self, report: &FanOutReport);

    // Import / export
    fn exported(&self, path: &Path, theme: &Theme);

    // Rendering
    fn stylesheet(&self, css: &CssVariables);
    fn native_theme(&self, theme: &NativeTheme);
    fn categories(&self, categories: &[ColorCategory], colors: &ThemeColors);
    fn preview(&self, preview: &PhonePreview);

    // Administration
    fn member_added(&self, organization_id: &str, user_id: &str, role: Role);

    // Metadata
    fn version_info(&self, info: &VersionInfo);
}
