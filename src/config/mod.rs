//! Application configuration.
//!
//! Loaded from `~/.config/rtheme/config.toml` (or an explicit path), then
//! overridden by `RTHEME_DB` and `RTHEME_USER`. A missing default file
//! yields defaults.

mod path;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, ThemeError};

pub use path::{expand_home, home_dir, resolve_path};

/// Environment variable overriding the database path.
pub const ENV_DB: &str = "RTHEME_DB";
/// Environment variable supplying the signed-in user.
pub const ENV_USER: &str = "RTHEME_USER";

const APP_DIR: &str = "rtheme";

/// Settings for the theme CLI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// SQLite database holding themes and preferences.
    pub database_path: Option<PathBuf>,
    /// JSON file for the preference of anonymous sessions.
    pub local_preferences_path: Option<PathBuf>,
    /// Identity used when no `--user` is given.
    pub user_id: Option<String>,
    /// Mode used by anonymous sessions with no stored preference.
    pub default_dark_mode: bool,
}

impl AppConfig {
    /// `<config dir>/rtheme/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
    }

    /// Loads `path`, or the default location when `None`.
    ///
    /// An explicit path must exist; the default one may be absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (expand_home(p)?.unwrap_or_else(|| p.to_path_buf()), true),
            None => match Self::default_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            if explicit {
                return Err(ThemeError::not_found(format!(
                    "config file {}",
                    path.display()
                )));
            }
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let config = Self::from_toml_str(&text, base)?;
        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Parses TOML, resolving relative paths against `base_dir`.
    pub fn from_toml_str(text: &str, base_dir: &Path) -> Result<Self> {
        let mut config: Self =
            toml::from_str(text).map_err(|e| ThemeError::ConfigParse(format!("TOML: {e}")))?;

        if let Some(db) = &config.database_path {
            config.database_path = Some(resolve_path(db, base_dir)?);
        }
        if let Some(local) = &config.local_preferences_path {
            config.local_preferences_path = Some(resolve_path(local, base_dir)?);
        }
        Ok(config)
    }

    /// Applies `RTHEME_DB` and `RTHEME_USER` from the process environment.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from `lookup`. Empty values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(db) = get(ENV_DB) {
            let db = PathBuf::from(db);
            self.database_path = Some(expand_home(&db)?.unwrap_or(db));
        }
        if let Some(user) = get(ENV_USER) {
            self.user_id = Some(user);
        }
        Ok(self)
    }

    /// Configured database path, or `<data dir>/rtheme/themes.db`.
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => crate::store::default_db_path(),
        }
    }

    /// Configured local preference file, or `<data dir>/rtheme/local.json`.
    pub fn local_preferences_path(&self) -> PathBuf {
        self.local_preferences_path.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
                .join("local.json")
        })
    }
}
