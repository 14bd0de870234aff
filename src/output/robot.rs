//! Robot mode JSON output implementation.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, instrument, trace, warn};

use crate::context::CssVariables;
use crate::editor::{ColorCategory, PhonePreview};
use crate::error::ThemeError;
use crate::service::{Fallback, FanOutReport};
use crate::store::Role;
use crate::theme::{NativeTheme, Theme, ThemeColors, ThemeMode};

use super::{ActiveTheme, Output, RobotFormat, ThemeSummary, VersionInfo};

/// JSON output implementation for agents and scripting.
///
/// Results go to stdout; errors and warnings go to stderr.
pub struct RobotOutput {
    format: RobotFormat,
}

impl RobotOutput {
    #[instrument]
    pub fn new(format: RobotFormat) -> Self {
        debug!(?format, "Creating RobotOutput");
        Self { format }
    }

    fn encode<T: Serialize + ?Sized>(data: &T, pretty: bool) -> Option<String> {
        let encoded = if pretty {
            serde_json::to_string_pretty(data)
        } else {
            serde_json::to_string(data)
        };
        encoded
            .map_err(|e| warn!(error = %e, "JSON serialization failed"))
            .ok()
    }

    /// Output any serializable data as JSON to stdout.
    #[instrument(skip(self, data), fields(format = ?self.format))]
    fn output_json<T: Serialize + ?Sized>(&self, data: &T) {
        let pretty = matches!(self.format, RobotFormat::Json);
        if let Some(json) = Self::encode(data, pretty) {
            trace!(json_len = json.len(), "JSON serialized");
            println!("{json}");
        }
    }

    /// Output single-line JSON to stderr.
    fn output_json_line_stderr<T: Serialize>(data: &T) {
        if let Some(json) = Self::encode(data, false) {
            eprintln!("{json}");
        }
    }
}

impl Output for RobotOutput {
    #[instrument(skip(self))]
    fn success(&self, message: &str) {
        debug!(message, "Robot: success");
        self.output_json(&serde_json::json!({
            "success": true,
            "message": message
        }));
    }

    #[instrument(skip(self))]
    fn error(&self, error: &ThemeError) {
        debug!(error = %error, "Robot: error");
        if let Some(json) = Self::encode(
            &serde_json::json!({
                "error": true,
                "message": error.to_string(),
                "suggestion": error.suggestion(),
                "recoverable": error.is_user_recoverable(),
            }),
            true,
        ) {
            eprintln!("{json}");
        }
    }

    #[instrument(skip(self))]
    fn warning(&self, message: &str) {
        debug!(message, "Robot: warning");
        Self::output_json_line_stderr(&serde_json::json!({
            "warning": true,
            "message": message
        }));
    }

    fn fallbacks(&self, fallbacks: &[Fallback]) {
        for fallback in fallbacks {
            Self::output_json_line_stderr(&serde_json::json!({
                "warning": true,
                "fallback": fallback
            }));
        }
    }

    #[instrument(skip(self, themes), fields(count = themes.len()))]
    fn theme_list(&self, themes: &[ThemeSummary]) {
        debug!("Robot: theme_list");
        self.output_json(themes);
    }

    #[instrument(skip(self, theme), fields(name = %theme.name))]
    fn theme_detail(&self, theme: &Theme, mode: Option<ThemeMode>) {
        debug!("Robot: theme_detail");
        match mode {
            Some(mode) => self.output_json(&serde_json::json!({
                "id": theme.id,
                "name": theme.name,
                "mode": mode,
                "colors": theme.variant(mode).colors,
            })),
            None => self.output_json(theme),
        }
    }

    fn theme_saved(&self, theme: &Theme, created: bool) {
        debug!(id = ?theme.id, created, "Robot: theme_saved");
        self.output_json(&serde_json::json!({
            "ok": true,
            "created": created,
            "theme": theme,
        }));
    }

    fn theme_deleted(&self, theme_id: &str, removed: bool) {
        debug!(theme_id, removed, "Robot: theme_deleted");
        self.output_json(&serde_json::json!({
            "id": theme_id,
            "deleted": removed,
        }));
    }

    fn theme_shared(&self, copy: &Theme, to_user: &str) {
        self.output_json(&serde_json::json!({
            "ok": true,
            "sharedWith": to_user,
            "theme": copy,
        }));
    }

    fn active_theme(&self, active: &ActiveTheme) {
        self.output_json(active);
    }

    #[instrument(skip(self, report), fields(updated = report.updated.len(), failed = report.failed.len()))]
    fn fan_out(&self, report: &FanOutReport) {
        debug!("Robot: fan_out");
        self.output_json(&serde_json::json!({
            "ok": report.is_complete(),
            "themeId": report.theme_id,
            "organizationId": report.organization_id,
            "updated": report.updated,
            "failed": report.failed,
        }));
    }

    fn exported(&self, path: &Path, theme: &Theme) {
        self.output_json(&serde_json::json!({
            "ok": true,
            "path": path.display().to_string(),
            "name": theme.name,
        }));
    }

    fn stylesheet(&self, css: &CssVariables) {
        self.output_json(&serde_json::json!({
            "rootClass": css.root_class(),
            "variables": css.properties(),
        }));
    }

    fn native_theme(&self, theme: &NativeTheme) {
        self.output_json(theme);
    }

    fn categories(&self, categories: &[ColorCategory], colors: &ThemeColors) {
        let rows: Vec<_> = categories
            .iter()
            .map(|c| {
                let values: serde_json::Map<String, serde_json::Value> = c
                    .keys
                    .iter()
                    .map(|&k| (k.to_string(), serde_json::Value::from(colors.get(k))))
                    .collect();
                serde_json::json!({
                    "name": c.name,
                    "description": c.description,
                    "colors": values,
                })
            })
            .collect();
        self.output_json(&rows);
    }

    fn preview(&self, preview: &PhonePreview) {
        self.output_json(preview);
    }

    fn member_added(&self, organization_id: &str, user_id: &str, role: Role) {
        self.output_json(&serde_json::json!({
            "ok": true,
            "organizationId": organization_id,
            "userId": user_id,
            "role": role,
        }));
    }

    fn version_info(&self, info: &VersionInfo) {
        self.output_json(info);
    }
}
