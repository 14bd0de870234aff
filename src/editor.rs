//! Theme editor session.
//!
//! A [`ThemeEditor`] holds one draft theme. Color edits land on the draft
//! immediately and are only written to the store on [`ThemeEditor::save`].

use std::fmt::Write as _;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Result, ThemeError};
use crate::service::{FanOutReport, ThemeService, export_file_name, export_theme, try_import_theme};
use crate::theme::{ColorKey, Theme, ThemeColors, ThemeMode, default_theme};

/// Name given to themes created with [`ThemeEditor::new_theme`].
pub const NEW_THEME_NAME: &str = "New Theme";

/// A group of color pickers in the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorCategory {
    pub name: &'static str,
    pub description: &'static str,
    pub keys: &'static [ColorKey],
}

/// The six editor groups. Every [`ColorKey`] appears in exactly one.
pub const COLOR_CATEGORIES: [ColorCategory; 6] = [
    ColorCategory {
        name: "Primary Colors",
        description: "These colors define your brand identity",
        keys: &[ColorKey::Primary, ColorKey::Secondary, ColorKey::Accent],
    },
    ColorCategory {
        name: "Background Colors",
        description: "Used for page and component backgrounds",
        keys: &[ColorKey::Background, ColorKey::BackgroundSecondary],
    },
    ColorCategory {
        name: "Text Colors",
        description: "Used for text content throughout the app",
        keys: &[ColorKey::Text, ColorKey::TextSecondary, ColorKey::TextMuted],
    },
    ColorCategory {
        name: "Status Colors",
        description: "Used to indicate different states and notifications",
        keys: &[
            ColorKey::Success,
            ColorKey::Error,
            ColorKey::Warning,
            ColorKey::Info,
        ],
    },
    ColorCategory {
        name: "Border Colors",
        description: "Used for separators and boundaries",
        keys: &[ColorKey::Border, ColorKey::BorderLight],
    },
    ColorCategory {
        name: "Button Colors",
        description: "Used for interactive elements",
        keys: &[
            ColorKey::ButtonBackground,
            ColorKey::ButtonText,
            ColorKey::ButtonSecondaryBackground,
            ColorKey::ButtonSecondaryText,
        ],
    },
];

/// Category holding `key`.
pub fn category_of(key: ColorKey) -> &'static ColorCategory {
    COLOR_CATEGORIES
        .iter()
        .find(|c| c.keys.contains(&key))
        .unwrap_or(&COLOR_CATEGORIES[0])
}

/// Editing state over one draft theme.
pub struct ThemeEditor<'a> {
    service: &'a ThemeService,
    themes: Vec<Theme>,
    draft: Theme,
    draft_name: String,
    active_tab: ThemeMode,
    selected_theme_id: Option<String>,
    baseline: Option<Theme>,
}

impl<'a> ThemeEditor<'a> {
    /// Starts on the built-in theme. Call [`Self::load`] to pick up stored state.
    pub fn new(service: &'a ThemeService) -> Self {
        let draft = default_theme();
        Self {
            service,
            themes: vec![draft.clone()],
            draft_name: draft.name.clone(),
            baseline: Some(draft.clone()),
            draft,
            active_tab: ThemeMode::Light,
            selected_theme_id: None,
        }
    }

    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    pub const fn draft(&self) -> &Theme {
        &self.draft
    }

    pub fn draft_name(&self) -> &str {
        &self.draft_name
    }

    pub const fn active_tab(&self) -> ThemeMode {
        self.active_tab
    }

    pub fn selected_theme_id(&self) -> Option<&str> {
        self.selected_theme_id.as_deref()
    }

    /// Colors of the tab being edited.
    pub fn active_colors(&self) -> &ThemeColors {
        &self.draft.variant(self.active_tab).colors
    }

    /// Loads visible themes and opens the caller's active one.
    pub fn load(&mut self) {
        self.themes = self.service.get_user_themes();
        let preference = self.service.get_user_active_theme();
        self.active_tab = preference.mode();

        let active = preference
            .theme_id
            .as_deref()
            .and_then(|id| self.find(id).cloned())
            .unwrap_or_else(default_theme);
        self.open(active);
        debug!(themes = self.themes.len(), draft = %self.draft.name, "Editor loaded");
    }

    fn find(&self, id: &str) -> Option<&Theme> {
        self.themes.iter().find(|t| t.id.as_deref() == Some(id))
    }

    fn open(&mut self, theme: Theme) {
        self.selected_theme_id.clone_from(&theme.id);
        self.draft_name.clone_from(&theme.name);
        self.baseline = Some(theme.clone());
        self.draft = theme;
    }

    /// Opens a listed theme for editing. `None` opens the built-in theme.
    pub fn select(&mut self, theme_id: Option<&str>) -> Result<()> {
        let theme = match theme_id {
            Some(id) => self
                .find(id)
                .cloned()
                .ok_or_else(|| ThemeError::not_found(format!("theme '{id}'")))?,
            None => default_theme(),
        };
        self.open(theme);
        Ok(())
    }

    /// Starts an unsaved theme seeded from the built-in palette.
    pub fn new_theme(&mut self) {
        let theme = Theme::new_from_default(NEW_THEME_NAME);
        self.selected_theme_id = None;
        self.draft_name.clone_from(&theme.name);
        self.baseline = None;
        self.draft = theme;
    }

    pub fn set_tab(&mut self, mode: ThemeMode) {
        self.active_tab = mode;
    }

    /// Edits one slot of the active tab. Invalid colors leave the draft as is.
    pub fn set_color(&mut self, key: ColorKey, value: &str) -> Result<()> {
        self.draft
            .variant_mut(self.active_tab)
            .colors
            .set(key, value)
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.draft_name = name.into();
    }

    /// True when the draft differs from what was last opened or saved.
    pub fn has_unsaved_changes(&self) -> bool {
        let Some(baseline) = &self.baseline else {
            return true;
        };
        baseline.name != self.draft_name
            || baseline.light != self.draft.light
            || baseline.dark != self.draft.dark
    }

    /// Persists the draft under the current name.
    pub fn save(&mut self) -> Result<Theme> {
        let name = self.draft_name.trim();
        if name.is_empty() {
            return Err(ThemeError::MalformedInput(
                "Please enter a theme name".to_string(),
            ));
        }

        let mut theme = self.draft.clone();
        theme.name = name.to_string();
        // The built-in theme is saved as a new personal copy.
        if theme.is_default && theme.id.is_none() {
            theme.is_default = false;
        }

        let saved = self.service.save_theme(&theme)?;
        match self
            .themes
            .iter_mut()
            .find(|t| t.id.is_some() && t.id == saved.id)
        {
            Some(slot) => *slot = saved.clone(),
            None => self.themes.push(saved.clone()),
        }
        info!(id = ?saved.id, name = %saved.name, "Draft saved");
        self.open(saved.clone());
        Ok(saved)
    }

    /// Makes the draft the caller's active theme in the current tab's mode.
    pub fn apply(&self) -> Result<()> {
        if self.draft.id.is_none() && !self.draft.is_default {
            return Err(ThemeError::UnsavedTheme);
        }
        self.service
            .set_active_theme(self.draft.id.as_deref(), self.active_tab.is_dark())
    }

    /// Deletes the draft from the store and reopens the built-in theme.
    pub fn delete(&mut self) -> Result<bool> {
        if self.draft.is_default {
            return Err(ThemeError::DefaultThemeProtected);
        }
        let id = self.draft.id.clone().ok_or(ThemeError::UnsavedTheme)?;

        let removed = self.service.delete_theme(&id)?;
        self.themes.retain(|t| t.id.as_deref() != Some(id.as_str()));
        self.open(default_theme());
        Ok(removed)
    }

    /// Sets the draft as every organization member's active theme.
    pub async fn apply_to_organization(&self) -> Result<FanOutReport> {
        let id = self.draft.id.as_deref().ok_or(ThemeError::UnsavedTheme)?;
        self.service.apply_theme_to_organization(id).await
    }

    /// Suggested file name and JSON text for the draft.
    pub fn export(&self) -> (String, String) {
        let mut theme = self.draft.clone();
        theme.name.clone_from(&self.draft_name);
        (export_file_name(&theme), export_theme(&theme))
    }

    /// Replaces the draft with an exported theme. The import is unsaved.
    pub fn import(&mut self, text: &str) -> Result<()> {
        let imported = try_import_theme(text)?;
        let theme = Theme {
            id: None,
            created_by: None,
            organization_id: None,
            is_default: false,
            created_at: None,
            updated_at: None,
            ..imported
        };
        debug!(name = %theme.name, "Imported theme into draft");
        self.selected_theme_id = None;
        self.draft_name.clone_from(&theme.name);
        self.baseline = None;
        self.draft = theme;
        Ok(())
    }

    pub fn preview(&self) -> PhonePreview {
        PhonePreview::new(self.active_colors())
    }
}

/// Foreground over background.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Surface {
    pub background: String,
    pub foreground: String,
}

impl Surface {
    fn new(background: &str, foreground: &str) -> Self {
        Self {
            background: background.to_string(),
            foreground: foreground.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceCard {
    pub surface: Surface,
    pub label_color: String,
    pub amount: String,
    pub due: String,
    pub pay_button: Surface,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationCard {
    pub surface: Surface,
    pub icon_color: String,
    pub timestamp_color: String,
    pub title: &'static str,
    pub message: &'static str,
    pub timestamp: &'static str,
    pub priority: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickAction {
    pub label: &'static str,
    pub icon: &'static str,
    pub icon_color: String,
    pub label_color: String,
}

/// Mock phone screen drawn with a palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhonePreview {
    pub screen: Surface,
    pub header: Surface,
    pub streak_badge: Surface,
    pub streak_weeks: u32,
    pub last_payment: &'static str,
    pub balance: BalanceCard,
    pub notification: NotificationCard,
    pub quick_actions: Vec<QuickAction>,
}

const STREAK_WEEKS: u32 = 6;
const LAST_PAYMENT: &str = "15 days ago";
const NEXT_PAYMENT_DUE: &str = "April 1, 2024";
const BALANCE_DUE: u32 = 500;
const QUICK_ACTIONS: [(&str, &str); 3] = [
    ("History", "chart-bar"),
    ("Support", "life-ring"),
    ("Settings", "cog"),
];

impl PhonePreview {
    pub fn new(colors: &ThemeColors) -> Self {
        Self {
            screen: Surface::new(&colors.background, &colors.text),
            header: Surface::new(&colors.background_secondary, &colors.text),
            streak_badge: Surface::new(&colors.primary, &colors.button_text),
            streak_weeks: STREAK_WEEKS,
            last_payment: LAST_PAYMENT,
            balance: BalanceCard {
                surface: Surface::new(&colors.background_secondary, &colors.text),
                label_color: colors.text_muted.clone(),
                amount: format!("${BALANCE_DUE}"),
                due: NEXT_PAYMENT_DUE.to_string(),
                pay_button: Surface::new(&colors.primary, &colors.button_text),
            },
            notification: NotificationCard {
                surface: Surface::new(&colors.background_secondary, &colors.text),
                icon_color: colors.error.clone(),
                timestamp_color: colors.text_muted.clone(),
                title: "Payment Reminder",
                message: "Your next payment of $500 is due on April 1st",
                timestamp: "2h ago",
                priority: "high",
            },
            quick_actions: QUICK_ACTIONS
                .iter()
                .map(|&(label, icon)| QuickAction {
                    label,
                    icon,
                    icon_color: colors.primary.clone(),
                    label_color: colors.text.clone(),
                })
                .collect(),
        }
    }

    /// Plain-text description, one element per line.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let surface = |s: &Surface| format!("{} on {}", s.foreground, s.background);

        let _ = writeln!(out, "screen        {}", surface(&self.screen));
        let _ = writeln!(out, "header        {}", surface(&self.header));
        let _ = writeln!(
            out,
            "streak badge  {} ({} week streak, last payment {})",
            surface(&self.streak_badge),
            self.streak_weeks,
            self.last_payment
        );
        let _ = writeln!(
            out,
            "balance card  {} ({} due {}, label {})",
            surface(&self.balance.surface),
            self.balance.amount,
            self.balance.due,
            self.balance.label_color
        );
        let _ = writeln!(out, "pay now       {}", surface(&self.balance.pay_button));
        let _ = writeln!(
            out,
            "notification  {} ({}: {}, icon {})",
            surface(&self.notification.surface),
            self.notification.title,
            self.notification.timestamp,
            self.notification.icon_color
        );
        for action in &self.quick_actions {
            let _ = writeln!(
                out,
                "action        {} [{}] icon {} label {}",
                action.label, action.icon, action.icon_color, action.label_color
            );
        }
        out
    }
}
