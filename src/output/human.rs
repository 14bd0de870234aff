//! Human-friendly output implementation using console.

use std::path::Path;

use console::{Style, style};
use tracing::{debug, instrument, trace};

use crate::context::CssVariables;
use crate::editor::{ColorCategory, PhonePreview};
use crate::error::ThemeError;
use crate::service::{Fallback, FanOutReport};
use crate::store::Role;
use crate::theme::{NativeTheme, Theme, ThemeColors, ThemeMode, parse_color};

use super::{ActiveTheme, Output, ThemeSummary, VersionInfo};

/// Styled terminal output implementation for human users.
pub struct HumanOutput {
    quiet: bool,
    header: Style,
    label: Style,
    muted: Style,
}

impl HumanOutput {
    #[instrument]
    pub fn new(color: bool, quiet: bool) -> Self {
        debug!("Creating HumanOutput");
        if !color {
            console::set_colors_enabled(false);
            console::set_colors_enabled_stderr(false);
        }
        Self {
            quiet,
            header: Style::new().bold().cyan(),
            label: Style::new().bold(),
            muted: Style::new().dim(),
        }
    }

    /// Two-cell block painted with `value`, blank when unparsable.
    fn swatch(value: &str) -> String {
        parse_color(value).map_or_else(
            |_| "  ".to_string(),
            |rgba| style("  ").on_color256(rgba.to_ansi256()).to_string(),
        )
    }

    fn print_colors(&self, colors: &ThemeColors) {
        for (key, value) in colors.iter() {
            println!(
                "  {} {:<28} {}",
                Self::swatch(value),
                self.label.apply_to(key),
                value
            );
        }
    }
}

impl Output for HumanOutput {
    fn success(&self, message: &str) {
        if !self.quiet {
            println!("{} {message}", style("[OK]").green().bold());
        }
    }

    #[instrument(skip(self))]
    fn error(&self, error: &ThemeError) {
        debug!(
            error = %error,
            recoverable = error.is_user_recoverable(),
            "Outputting error"
        );
        eprintln!("{}: {error}", style("Error").red().bold());
        if let Some(suggestion) = error.suggestion() {
            trace!(suggestion, "Adding suggestion");
            eprintln!("{}: {suggestion}", style("Hint").yellow());
        }
    }

    fn warning(&self, message: &str) {
        eprintln!("{} {message}", style("[WARN]").yellow().bold());
    }

    fn fallbacks(&self, fallbacks: &[Fallback]) {
        for fallback in fallbacks {
            let message = match fallback {
                Fallback::ThemesUnavailable { reason } => {
                    format!("Showing the built-in theme only: {reason}")
                }
                Fallback::PreferenceUnavailable { reason } => {
                    format!("Using the built-in theme: {reason}")
                }
                Fallback::MalformedImport { reason } => {
                    format!("Import replaced by the built-in theme: {reason}")
                }
            };
            self.warning(&message);
        }
    }

    #[instrument(skip(self, themes), fields(count = themes.len()))]
    fn theme_list(&self, themes: &[ThemeSummary]) {
        for row in themes {
            let marker = if row.active { style("*").green().bold() } else { style(" ") };
            let id = row.id.as_deref().unwrap_or("default");
            let mut tags = Vec::new();
            if row.is_default {
                tags.push("built-in".to_string());
            }
            if let Some(org) = &row.organization_id {
                tags.push(format!("org {org}"));
            }
            let tags = if tags.is_empty() {
                String::new()
            } else {
                format!(" ({})", tags.join(", "))
            };
            println!(
                "{marker} {:<38} {}{}",
                self.muted.apply_to(id),
                row.name,
                self.muted.apply_to(tags)
            );
        }
    }

    fn theme_detail(&self, theme: &Theme, mode: Option<ThemeMode>) {
        println!("{}", self.header.apply_to(&theme.name));
        if let Some(id) = &theme.id {
            println!("  {} {id}", self.muted.apply_to("id:"));
        }
        if let Some(org) = &theme.organization_id {
            println!("  {} {org}", self.muted.apply_to("organization:"));
        }
        if let Some(updated) = theme.updated_at {
            println!("  {} {}", self.muted.apply_to("updated:"), updated.to_rfc3339());
        }

        let modes: &[ThemeMode] = match mode {
            Some(ThemeMode::Dark) => &[ThemeMode::Dark],
            Some(ThemeMode::Light) => &[ThemeMode::Light],
            None => &[ThemeMode::Light, ThemeMode::Dark],
        };
        for &mode in modes {
            println!();
            println!("{}", self.label.apply_to(format!("{mode} palette")));
            self.print_colors(&theme.variant(mode).colors);
        }
    }

    fn theme_saved(&self, theme: &Theme, created: bool) {
        let verb = if created { "Created" } else { "Saved" };
        self.success(&format!(
            "{verb} '{}' ({})",
            theme.name,
            theme.id.as_deref().unwrap_or("unsaved")
        ));
    }

    fn theme_deleted(&self, theme_id: &str, removed: bool) {
        if removed {
            self.success(&format!("Deleted {theme_id}"));
        } else {
            self.warning(&format!("No theme {theme_id}, nothing deleted"));
        }
    }

    fn theme_shared(&self, copy: &Theme, to_user: &str) {
        self.success(&format!(
            "Shared as '{}' with {to_user} ({})",
            copy.name,
            copy.id.as_deref().unwrap_or_default()
        ));
    }

    fn active_theme(&self, active: &ActiveTheme) {
        println!(
            "{} {}",
            self.header.apply_to(&active.name),
            self.muted.apply_to(format!("({} mode)", active.mode))
        );
        if !active.signed_in {
            println!("{}", self.muted.apply_to("not signed in, preference kept locally"));
        }
    }

    #[instrument(skip(self, report), fields(updated = report.updated.len(), failed = report.failed.len()))]
    fn fan_out(&self, report: &FanOutReport) {
        self.success(&format!(
            "Applied {} to {} member(s) of {}",
            report.theme_id,
            report.updated.len(),
            report.organization_id
        ));
        for failure in &report.failed {
            self.warning(&format!("{}: {}", failure.user_id, failure.error));
        }
    }

    fn exported(&self, path: &Path, theme: &Theme) {
        self.success(&format!("Exported '{}' to {}", theme.name, path.display()));
    }

    fn stylesheet(&self, css: &CssVariables) {
        if let Some(class) = css.root_class() {
            println!("/* root class: {class} */");
        }
        print!("{}", css.render());
    }

    fn native_theme(&self, theme: &NativeTheme) {
        println!("{}", self.header.apply_to("Colors"));
        self.print_colors(&theme.colors);

        let font = &theme.typography.font_size;
        println!();
        println!("{}", self.header.apply_to("Typography"));
        println!(
            "  sizes   xs {} sm {} md {} lg {} xl {} xxl {} xxxl {}",
            font.xs, font.sm, font.md, font.lg, font.xl, font.xxl, font.xxxl
        );

        let s = &theme.spacing;
        println!();
        println!("{}", self.header.apply_to("Spacing"));
        println!(
            "  xs {} sm {} md {} lg {} xl {} xxl {}",
            s.xs, s.sm, s.md, s.lg, s.xl, s.xxl
        );

        let r = &theme.border_radius;
        println!();
        println!("{}", self.header.apply_to("Border radius"));
        println!(
            "  xs {} sm {} md {} lg {} xl {} round {}",
            r.xs, r.sm, r.md, r.lg, r.xl, r.round
        );
    }

    fn categories(&self, categories: &[ColorCategory], colors: &ThemeColors) {
        for (idx, category) in categories.iter().enumerate() {
            if idx > 0 {
                println!();
            }
            println!("{}", self.header.apply_to(category.name));
            println!("  {}", self.muted.apply_to(category.description));
            for &key in category.keys {
                let value = colors.get(key);
                println!("  {} {:<28} {value}", Self::swatch(value), key);
            }
        }
    }

    fn preview(&self, preview: &PhonePreview) {
        println!("{}", self.header.apply_to("Phone preview"));
        for line in preview.render_text().lines() {
            println!("  {line}");
        }
    }

    fn member_added(&self, organization_id: &str, user_id: &str, role: Role) {
        self.success(&format!("Added {user_id} to {organization_id} as {role}"));
    }

    fn version_info(&self, info: &VersionInfo) {
        println!("rtheme {}", info.version);
        println!(
            "git: {}{}",
            info.git_sha,
            if info.git_dirty { " (dirty)" } else { "" }
        );
        println!("built: {}", info.build_timestamp);
        println!("rustc: {}", info.rustc_version);
        println!("target: {}", info.target);
    }
}
