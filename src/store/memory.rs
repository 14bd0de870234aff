//! In-memory theme store for tests and offline use.
//!
//! Records every request for later assertion and supports failure
//! injection, so service behavior under partial outages can be exercised.
//!
//! # Example
//!
//! ```rust,ignore
//! use rtheme::store::{MemoryThemeStore, Role, StoreOp};
//!
//! let store = MemoryThemeStore::new();
//! store.add_member("org-1", "owner-1", Role::Owner);
//! store.fail_preference_writes_for("member-2");
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, trace};

use super::{ActivePreference, Membership, Role, ThemeStore, require_id};
use crate::error::{Result, ThemeError};
use crate::theme::Theme;

/// Recorded store request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    ListThemes { user_id: String },
    GetTheme { id: String },
    UpsertTheme { id: String },
    DeleteTheme { id: String },
    GetPreference { user_id: String },
    UpsertPreference { user_id: String, theme_id: Option<String> },
    ClearPreferences { theme_id: String },
    Membership { user_id: String },
    OrganizationMembers { organization_id: String },
}

#[derive(Default)]
struct Inner {
    themes: Vec<Theme>,
    preferences: HashMap<String, ActivePreference>,
    memberships: BTreeMap<String, Membership>,
    log: Vec<StoreOp>,
    injected: Option<ThemeError>,
    failing_preference_writes: HashSet<String>,
    #[cfg(test)]
    panicking_preference_writes: HashSet<String>,
    unavailable: bool,
}

/// Mutex-guarded in-memory implementation of [`ThemeStore`].
#[derive(Default)]
pub struct MemoryThemeStore {
    inner: Mutex<Inner>,
}

impl MemoryThemeStore {
    #[must_use]
    pub fn new() -> Self {
        debug!("Creating in-memory theme store");
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| ThemeError::RemoteFailure("theme store lock poisoned".to_string()))
    }

    /// Logs the request and applies any configured failure.
    fn begin(&self, op: StoreOp) -> Result<MutexGuard<'_, Inner>> {
        let mut inner = self.lock()?;
        trace!(?op, "Memory store request");
        inner.log.push(op);
        if let Some(err) = inner.injected.take() {
            return Err(err);
        }
        if inner.unavailable {
            return Err(ThemeError::RemoteFailure("theme store unavailable".to_string()));
        }
        Ok(inner)
    }

    // === Provisioning ===

    /// Adds `user_id` to `organization_id` with `role`, replacing any
    /// previous membership.
    pub fn add_member(&self, organization_id: &str, user_id: &str, role: Role) {
        if let Ok(mut inner) = self.lock() {
            inner.memberships.insert(
                user_id.to_string(),
                Membership {
                    organization_id: organization_id.to_string(),
                    role,
                },
            );
        }
    }

    /// Seeds a theme without going through the log.
    pub fn insert_theme(&self, theme: Theme) {
        if let Ok(mut inner) = self.lock() {
            inner.themes.retain(|t| t.id != theme.id);
            inner.themes.push(theme);
        }
    }

    /// Seeds a preference without going through the log.
    pub fn insert_preference(&self, user_id: &str, preference: ActivePreference) {
        if let Ok(mut inner) = self.lock() {
            inner.preferences.insert(user_id.to_string(), preference);
        }
    }

    // === Failure injection ===

    /// Fails the next request with `error`.
    pub fn inject_error(&self, error: ThemeError) {
        if let Ok(mut inner) = self.lock() {
            inner.injected = Some(error);
        }
    }

    /// Makes every preference write for `user_id` fail.
    pub fn fail_preference_writes_for(&self, user_id: &str) {
        if let Ok(mut inner) = self.lock() {
            inner.failing_preference_writes.insert(user_id.to_string());
        }
    }

    /// Makes every preference write for `user_id` panic.
    #[cfg(test)]
    pub(crate) fn panic_preference_writes_for(&self, user_id: &str) {
        if let Ok(mut inner) = self.lock() {
            inner.panicking_preference_writes.insert(user_id.to_string());
        }
    }

    /// Simulates a full outage while `unavailable` is true.
    pub fn set_unavailable(&self, unavailable: bool) {
        if let Ok(mut inner) = self.lock() {
            inner.unavailable = unavailable;
        }
    }

    // === Inspection ===

    #[must_use]
    pub fn operations(&self) -> Vec<StoreOp> {
        self.lock().map(|inner| inner.log.clone()).unwrap_or_default()
    }

    pub fn clear_operations(&self) {
        if let Ok(mut inner) = self.lock() {
            inner.log.clear();
        }
    }

    /// Number of stored themes.
    #[must_use]
    pub fn theme_count(&self) -> usize {
        self.lock().map(|inner| inner.themes.len()).unwrap_or_default()
    }

    /// Stored theme by id, bypassing the log and failure injection.
    #[must_use]
    pub fn peek_theme(&self, id: &str) -> Option<Theme> {
        self.lock()
            .ok()?
            .themes
            .iter()
            .find(|t| t.id.as_deref() == Some(id))
            .cloned()
    }

    /// Stored preference, bypassing the log and failure injection.
    #[must_use]
    pub fn peek_preference(&self, user_id: &str) -> Option<ActivePreference> {
        self.lock().ok()?.preferences.get(user_id).cloned()
    }
}

impl ThemeStore for MemoryThemeStore {
    fn list_themes(&self, user_id: &str, organization_id: Option<&str>) -> Result<Vec<Theme>> {
        let inner = self.begin(StoreOp::ListThemes {
            user_id: user_id.to_string(),
        })?;
        Ok(inner
            .themes
            .iter()
            .filter(|t| {
                t.created_by.as_deref() == Some(user_id)
                    || (organization_id.is_some() && t.organization_id.as_deref() == organization_id)
            })
            .cloned()
            .collect())
    }

    fn get_theme(&self, id: &str) -> Result<Option<Theme>> {
        let inner = self.begin(StoreOp::GetTheme { id: id.to_string() })?;
        Ok(inner
            .themes
            .iter()
            .find(|t| t.id.as_deref() == Some(id))
            .cloned())
    }

    fn upsert_theme(&self, theme: &Theme) -> Result<()> {
        let id = require_id(theme)?;
        let mut inner = self.begin(StoreOp::UpsertTheme { id: id.to_string() })?;
        match inner.themes.iter_mut().find(|t| t.id.as_deref() == Some(id)) {
            Some(existing) => *existing = theme.clone(),
            None => inner.themes.push(theme.clone()),
        }
        Ok(())
    }

    fn delete_theme(&self, id: &str) -> Result<bool> {
        let mut inner = self.begin(StoreOp::DeleteTheme { id: id.to_string() })?;
        let before = inner.themes.len();
        inner.themes.retain(|t| t.id.as_deref() != Some(id));
        Ok(inner.themes.len() != before)
    }

    fn get_preference(&self, user_id: &str) -> Result<Option<ActivePreference>> {
        let inner = self.begin(StoreOp::GetPreference {
            user_id: user_id.to_string(),
        })?;
        Ok(inner.preferences.get(user_id).cloned())
    }

    fn upsert_preference(&self, user_id: &str, preference: &ActivePreference) -> Result<()> {
        #[cfg(test)]
        {
            let panics = self.lock()?.panicking_preference_writes.contains(user_id);
            assert!(!panics, "preference write panicked for {user_id}");
        }
        let mut inner = self.begin(StoreOp::UpsertPreference {
            user_id: user_id.to_string(),
            theme_id: preference.theme_id.clone(),
        })?;
        if inner.failing_preference_writes.contains(user_id) {
            return Err(ThemeError::RemoteFailure(format!(
                "preference write rejected for {user_id}"
            )));
        }
        inner
            .preferences
            .insert(user_id.to_string(), preference.clone());
        Ok(())
    }

    fn clear_preferences_for_theme(&self, theme_id: &str) -> Result<Vec<String>> {
        let mut inner = self.begin(StoreOp::ClearPreferences {
            theme_id: theme_id.to_string(),
        })?;
        let mut affected = Vec::new();
        for (user_id, pref) in &mut inner.preferences {
            if pref.theme_id.as_deref() == Some(theme_id) {
                pref.theme_id = None;
                affected.push(user_id.clone());
            }
        }
        affected.sort();
        Ok(affected)
    }

    fn membership(&self, user_id: &str) -> Result<Option<Membership>> {
        let inner = self.begin(StoreOp::Membership {
            user_id: user_id.to_string(),
        })?;
        Ok(inner.memberships.get(user_id).cloned())
    }

    fn organization_members(&self, organization_id: &str) -> Result<Vec<String>> {
        let inner = self.begin(StoreOp::OrganizationMembers {
            organization_id: organization_id.to_string(),
        })?;
        Ok(inner
            .memberships
            .iter()
            .filter(|(_, m)| m.organization_id == organization_id)
            .map(|(user, _)| user.clone())
            .collect())
    }
}
