//! `SQLite` adapter for the theme store.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::{debug, info, instrument};

use super::record::{ThemeRecord, parse_timestamp};
use super::{ActivePreference, Membership, Role, ThemeStore};
use crate::error::{Result, ThemeError};
use crate::theme::Theme;

/// SQL schema for the database.
const SCHEMA_SQL: &str = r"
-- Saved themes (personal when organization_id is NULL)
CREATE TABLE IF NOT EXISTS themes (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    light_variant TEXT NOT NULL,
    dark_variant TEXT NOT NULL,
    created_by TEXT,
    organization_id TEXT,
    is_default BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TEXT,
    updated_at TEXT
);

-- One active preference per user
CREATE TABLE IF NOT EXISTS user_theme_preferences (
    user_id TEXT PRIMARY KEY,
    theme_id TEXT,
    is_dark_mode BOOLEAN NOT NULL DEFAULT FALSE,
    updated_at TEXT NOT NULL
);

-- Organization membership (one organization per user)
CREATE TABLE IF NOT EXISTS user_organizations (
    user_id TEXT PRIMARY KEY,
    organization_id TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'member'
);

CREATE INDEX IF NOT EXISTS idx_themes_created_by ON themes(created_by);
CREATE INDEX IF NOT EXISTS idx_themes_organization ON themes(organization_id);
CREATE INDEX IF NOT EXISTS idx_preferences_theme ON user_theme_preferences(theme_id);
CREATE INDEX IF NOT EXISTS idx_user_organizations_org ON user_organizations(organization_id);
";

const THEME_COLUMNS: &str = "id, name, light_variant, dark_variant, created_by, organization_id, is_default, created_at, updated_at";

/// Database-backed [`ThemeStore`].
pub struct SqliteThemeStore {
    conn: Mutex<Connection>,
}

fn remote(context: &str) -> impl Fn(rusqlite::Error) -> ThemeError + '_ {
    move |e| ThemeError::RemoteFailure(format!("{context}: {e}"))
}

impl SqliteThemeStore {
    /// Opens or creates a database at the standard location.
    ///
    /// Location: `~/.local/share/rtheme/themes.db`
    #[instrument]
    pub fn open_default() -> Result<Self> {
        Self::open(default_db_path()?)
    }

    /// Opens or creates a database at the given path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                ThemeError::Other(format!(
                    "Failed to create directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        debug!(path = %path.display(), "Opening theme database");
        let conn = Connection::open(path).map_err(remote("Failed to open database"))?;
        Self::with_connection(conn)
    }

    /// Creates an in-memory database.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(remote("Failed to create in-memory database"))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL)
            .map_err(remote("Failed to initialize schema"))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| ThemeError::RemoteFailure("database lock poisoned".to_string()))
    }

    /// Adds or updates a user's organization membership.
    pub fn add_member(&self, organization_id: &str, user_id: &str, role: Role) -> Result<()> {
        self.conn()?
            .execute(
                "INSERT INTO user_organizations (user_id, organization_id, role) VALUES (?1, ?2, ?3)
                 ON CONFLICT(user_id) DO UPDATE SET organization_id = excluded.organization_id, role = excluded.role",
                params![user_id, organization_id, role.as_str()],
            )
            .map_err(remote("Failed to add member"))?;
        info!(organization_id, user_id, %role, "Organization member added");
        Ok(())
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<ThemeRecord> {
    Ok(ThemeRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        light_variant: row.get(2)?,
        dark_variant: row.get(3)?,
        created_by: row.get(4)?,
        organization_id: row.get(5)?,
        is_default: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

impl ThemeStore for SqliteThemeStore {
    fn list_themes(&self, user_id: &str, organization_id: Option<&str>) -> Result<Vec<Theme>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {THEME_COLUMNS} FROM themes
                 WHERE created_by = ?1 OR (?2 IS NOT NULL AND organization_id = ?2)
                 ORDER BY created_at, name"
            ))
            .map_err(remote("Failed to prepare statement"))?;

        let rows = stmt
            .query_map(params![user_id, organization_id], record_from_row)
            .map_err(remote("Failed to query themes"))?;

        let mut themes = Vec::new();
        for row in rows {
            themes.push(row.map_err(remote("Failed to read row"))?.into_theme()?);
        }
        Ok(themes)
    }

    fn get_theme(&self, id: &str) -> Result<Option<Theme>> {
        let record = self
            .conn()?
            .query_row(
                &format!("SELECT {THEME_COLUMNS} FROM themes WHERE id = ?1"),
                params![id],
                record_from_row,
            )
            .optional()
            .map_err(remote("Failed to get theme"))?;
        record.map(ThemeRecord::into_theme).transpose()
    }

    fn upsert_theme(&self, theme: &Theme) -> Result<()> {
        let r = ThemeRecord::from_theme(theme)?;
        self.conn()?
            .execute(
                &format!(
                    "INSERT OR REPLACE INTO themes ({THEME_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
                ),
                params![
                    r.id,
                    r.name,
                    r.light_variant,
                    r.dark_variant,
                    r.created_by,
                    r.organization_id,
                    r.is_default,
                    r.created_at,
                    r.updated_at
                ],
            )
            .map_err(remote("Failed to save theme"))?;
        Ok(())
    }

    fn delete_theme(&self, id: &str) -> Result<bool> {
        let removed = self
            .conn()?
            .execute("DELETE FROM themes WHERE id = ?1", params![id])
            .map_err(remote("Failed to delete theme"))?;
        Ok(removed > 0)
    }

    fn get_preference(&self, user_id: &str) -> Result<Option<ActivePreference>> {
        let row: Option<(Option<String>, bool, String)> = self
            .conn()?
            .query_row(
                "SELECT theme_id, is_dark_mode, updated_at FROM user_theme_preferences WHERE user_id = ?1",
                params![user_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()
            .map_err(remote("Failed to get preference"))?;

        row.map(|(theme_id, is_dark_mode, updated_at)| {
            Ok(ActivePreference {
                theme_id,
                is_dark_mode,
                updated_at: parse_timestamp(Some(&updated_at))?,
            })
        })
        .transpose()
    }

    fn upsert_preference(&self, user_id: &str, preference: &ActivePreference) -> Result<()> {
        let updated_at = preference.updated_at.unwrap_or_else(Utc::now).to_rfc3339();
        self.conn()?
            .execute(
                "INSERT INTO user_theme_preferences (user_id, theme_id, is_dark_mode, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(user_id) DO UPDATE SET
                    theme_id = excluded.theme_id,
                    is_dark_mode = excluded.is_dark_mode,
                    updated_at = excluded.updated_at",
                params![user_id, preference.theme_id, preference.is_dark_mode, updated_at],
            )
            .map_err(remote("Failed to save preference"))?;
        Ok(())
    }

    fn clear_preferences_for_theme(&self, theme_id: &str) -> Result<Vec<String>> {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .map_err(remote("Failed to begin transaction"))?;

        let affected = {
            let mut stmt = tx
                .prepare("SELECT user_id FROM user_theme_preferences WHERE theme_id = ?1 ORDER BY user_id")
                .map_err(remote("Failed to prepare statement"))?;
            let rows = stmt
                .query_map(params![theme_id], |row| row.get::<_, String>(0))
                .map_err(remote("Failed to query preferences"))?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(remote("Failed to read row"))?
        };

        tx.execute(
            "UPDATE user_theme_preferences SET theme_id = NULL, updated_at = ?2 WHERE theme_id = ?1",
            params![theme_id, Utc::now().to_rfc3339()],
        )
        .map_err(remote("Failed to reset preferences"))?;
        tx.commit().map_err(remote("Failed to commit"))?;

        Ok(affected)
    }

    fn membership(&self, user_id: &str) -> Result<Option<Membership>> {
        let row: Option<(String, String)> = self
            .conn()?
            .query_row(
                "SELECT organization_id, role FROM user_organizations WHERE user_id = ?1",
                params![user_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(remote("Failed to get membership"))?;

        row.map(|(organization_id, role)| {
            Ok(Membership {
                organization_id,
                role: role.parse()?,
            })
        })
        .transpose()
    }

    fn organization_members(&self, organization_id: &str) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT user_id FROM user_organizations WHERE organization_id = ?1 ORDER BY user_id")
            .map_err(remote("Failed to prepare statement"))?;
        let rows = stmt
            .query_map(params![organization_id], |row| row.get::<_, String>(0))
            .map_err(remote("Failed to query members"))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(remote("Failed to read row"))
    }
}

/// Returns the default database path.
pub fn default_db_path() -> Result<PathBuf> {
    let data_dir = dirs::data_local_dir().ok_or_else(|| {
        ThemeError::Other("Could not determine local data directory".to_string())
    })?;
    Ok(data_dir.join("rtheme").join("themes.db"))
}
