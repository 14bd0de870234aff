//! Storage port for themes, preferences, and organization membership.
//!
//! The service layer talks to a [`ThemeStore`] only; production uses the
//! `SQLite` adapter and tests substitute [`MemoryThemeStore`].

pub mod memory;
mod record;
mod sqlite;

pub use memory::{MemoryThemeStore, StoreOp};
pub use record::ThemeRecord;
pub use sqlite::{SqliteThemeStore, default_db_path};

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ThemeError};
use crate::theme::{Theme, ThemeMode};

/// A user's chosen theme and dark-mode flag.
///
/// `theme_id = None` means the built-in default theme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivePreference {
    pub theme_id: Option<String>,
    pub is_dark_mode: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ActivePreference {
    pub fn new(theme_id: Option<String>, is_dark_mode: bool) -> Self {
        Self {
            theme_id,
            is_dark_mode,
            updated_at: None,
        }
    }

    pub const fn mode(&self) -> ThemeMode {
        ThemeMode::from_dark(self.is_dark_mode)
    }
}

/// Role of a user within an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Member,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            other => Err(ThemeError::MalformedInput(format!("unknown role '{other}'"))),
        }
    }
}

/// A user's organization and role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub organization_id: String,
    pub role: Role,
}

impl Membership {
    pub const fn is_owner(&self) -> bool {
        matches!(self.role, Role::Owner)
    }
}

/// Backing-store operations used by the theme service.
///
/// Every method is a single request; implementations make no atomicity
/// promise across calls. Failures are reported as
/// [`ThemeError::RemoteFailure`].
pub trait ThemeStore: Send + Sync {
    /// Themes created by `user_id` plus those shared with `organization_id`.
    fn list_themes(&self, user_id: &str, organization_id: Option<&str>) -> Result<Vec<Theme>>;

    fn get_theme(&self, id: &str) -> Result<Option<Theme>>;

    /// Inserts or replaces the theme keyed by its id. The id must be set.
    fn upsert_theme(&self, theme: &Theme) -> Result<()>;

    /// Returns true if a row was removed.
    fn delete_theme(&self, id: &str) -> Result<bool>;

    fn get_preference(&self, user_id: &str) -> Result<Option<ActivePreference>>;

    fn upsert_preference(&self, user_id: &str, preference: &ActivePreference) -> Result<()>;

    /// Resets every preference pointing at `theme_id` to the built-in default,
    /// keeping its dark-mode flag. Returns the affected user ids.
    fn clear_preferences_for_theme(&self, theme_id: &str) -> Result<Vec<String>>;

    fn membership(&self, user_id: &str) -> Result<Option<Membership>>;

    fn organization_members(&self, organization_id: &str) -> Result<Vec<String>>;
}

pub(crate) fn require_id(theme: &Theme) -> Result<&str> {
    theme
        .id
        .as_deref()
        .ok_or_else(|| ThemeError::MalformedInput("cannot store a theme without an id".to_string()))
}
