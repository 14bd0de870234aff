//! Theme persistence service.
//!
//! Wraps a [`ThemeStore`] with the caller's [`Session`] and enforces the
//! ownership policy. Read paths never fail: they degrade to the built-in
//! default theme and record a [`Fallback`] so the degradation stays visible.
//! Write paths return errors to the caller and are never retried.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::error::{Result, ThemeError};
use crate::store::{ActivePreference, Membership, ThemeStore};
use crate::theme::{Theme, default_theme};

/// Identity of the caller, supplied by the external identity provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user_id: Option<String>,
}

impl Session {
    pub fn authenticated(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    pub const fn anonymous() -> Self {
        Self { user_id: None }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub const fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }
}

/// A read or import that degraded to the built-in default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fallback {
    ThemesUnavailable { reason: String },
    PreferenceUnavailable { reason: String },
    MalformedImport { reason: String },
}

/// A member whose preference could not be updated during a fan-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberFailure {
    pub user_id: String,
    pub error: String,
}

/// Outcome of applying a theme to every member of an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FanOutReport {
    pub theme_id: String,
    pub organization_id: String,
    pub updated: Vec<String>,
    pub failed: Vec<MemberFailure>,
}

impl FanOutReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Theme operations for one caller.
pub struct ThemeService {
    store: Arc<dyn ThemeStore>,
    session: Session,
    fallbacks: Mutex<Vec<Fallback>>,
}

impl ThemeService {
    pub fn new(store: Arc<dyn ThemeStore>, session: Session) -> Self {
        debug!(user = ?session.user_id(), "Creating theme service");
        Self {
            store,
            session,
            fallbacks: Mutex::new(Vec::new()),
        }
    }

    pub const fn session(&self) -> &Session {
        &self.session
    }

    fn require_user(&self) -> Result<&str> {
        self.session.user_id().ok_or(ThemeError::NotAuthenticated)
    }

    fn record_fallback(&self, fallback: Fallback) {
        warn!(fallback = ?fallback, "Falling back to the built-in default theme");
        if let Ok(mut fallbacks) = self.fallbacks.lock() {
            fallbacks.push(fallback);
        }
    }

    /// Drains the fallbacks recorded since the last call.
    pub fn take_fallbacks(&self) -> Vec<Fallback> {
        self.fallbacks
            .lock()
            .map(|mut f| std::mem::take(&mut *f))
            .unwrap_or_default()
    }

    // === Reads ===

    /// Built-in default followed by every theme the caller can see.
    #[instrument(skip(self))]
    pub fn get_user_themes(&self) -> Vec<Theme> {
        let mut themes = vec![default_theme()];
        let Some(user_id) = self.session.user_id() else {
            debug!("Anonymous caller, returning built-in theme only");
            return themes;
        };

        let visible = self.store.membership(user_id).and_then(|membership| {
            let org = membership.as_ref().map(|m| m.organization_id.as_str());
            self.store.list_themes(user_id, org)
        });

        match visible {
            Ok(stored) => {
                debug!(count = stored.len(), "Loaded stored themes");
                themes.extend(stored);
            }
            Err(e) => self.record_fallback(Fallback::ThemesUnavailable {
                reason: e.to_string(),
            }),
        }
        themes
    }

    /// Stored preference, or `{None, false}` for first-time or anonymous users.
    pub fn get_user_active_theme(&self) -> ActivePreference {
        self.find_user_active_theme().unwrap_or_default()
    }

    /// Stored preference, `None` when the caller has no record.
    ///
    /// Anonymous callers and store failures also yield `None`; a failure is
    /// recorded as a [`Fallback`].
    #[instrument(skip(self))]
    pub fn find_user_active_theme(&self) -> Option<ActivePreference> {
        let user_id = self.session.user_id()?;

        match self.store.get_preference(user_id) {
            Ok(pref) => pref,
            Err(e) => {
                self.record_fallback(Fallback::PreferenceUnavailable {
                    reason: e.to_string(),
                });
                None
            }
        }
    }

    pub fn get_theme_by_id(&self, theme_id: &str) -> Result<Option<Theme>> {
        self.store.get_theme(theme_id)
    }

    // === Writes ===

    fn membership(&self, user_id: &str) -> Result<Option<Membership>> {
        self.store.membership(user_id)
    }

    fn require_owner_of(&self, user_id: &str, organization_id: &str, action: &str) -> Result<()> {
        match self.membership(user_id)? {
            Some(m) if m.is_owner() && m.organization_id == organization_id => Ok(()),
            _ => Err(ThemeError::permission_denied(format!(
                "only an owner of organization '{organization_id}' may {action}"
            ))),
        }
    }

    /// Stored theme the caller can see: their own, or one shared with
    /// `organization_id`. Anything else is reported as not found.
    fn visible_theme(
        &self,
        user_id: &str,
        theme_id: &str,
        organization_id: Option<&str>,
    ) -> Result<Theme> {
        self.store
            .get_theme(theme_id)?
            .filter(|t| {
                t.created_by.as_deref() == Some(user_id)
                    || (organization_id.is_some() && t.organization_id.as_deref() == organization_id)
            })
            .ok_or_else(|| ThemeError::not_found(format!("theme '{theme_id}'")))
    }

    /// Checks that the caller may modify or delete `theme`.
    fn authorize_write(&self, user_id: &str, theme: &Theme, action: &str) -> Result<()> {
        if let Some(org) = theme.organization_id.as_deref() {
            return self.require_owner_of(user_id, org, action);
        }
        match theme.created_by.as_deref() {
            Some(owner) if owner != user_id => Err(ThemeError::permission_denied(format!(
                "only the creator of '{}' may {action}",
                theme.name
            ))),
            _ => Ok(()),
        }
    }

    /// Creates (no id) or updates (id present) a theme.
    ///
    /// Create assigns a fresh id, the caller as creator, and both
    /// timestamps. Update only moves `updated_at`.
    #[instrument(skip(self, theme), fields(theme = %theme.name, id = ?theme.id))]
    pub fn save_theme(&self, theme: &Theme) -> Result<Theme> {
        let user_id = self.require_user()?;
        theme.validate()?;

        let existing = match theme.id.as_deref() {
            Some(id) => self.store.get_theme(id)?,
            None => None,
        };

        if let Some(existing) = &existing {
            self.authorize_write(user_id, existing, "update this theme")?;
        }
        if let Some(org) = theme.organization_id.as_deref() {
            self.require_owner_of(user_id, org, "create or update organization themes")?;
        }

        let now = Utc::now();
        let mut saved = theme.clone();
        match existing {
            Some(existing) => {
                saved.created_by = existing.created_by;
                saved.created_at = existing.created_at;
                saved.is_default = existing.is_default;
            }
            None => {
                saved.id = Some(theme.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string()));
                saved.created_by = Some(user_id.to_string());
                saved.created_at = Some(now);
                saved.is_default = false;
            }
        }
        saved.updated_at = Some(now);

        self.store.upsert_theme(&saved)?;
        info!(id = ?saved.id, organization = ?saved.organization_id, "Theme saved");
        Ok(saved)
    }

    /// Shares `theme` with the caller's organization and saves it.
    pub fn save_organization_theme(&self, theme: &Theme) -> Result<Theme> {
        let user_id = self.require_user()?;
        let membership = self.membership(user_id)?.ok_or_else(|| {
            ThemeError::permission_denied("share themes without belonging to an organization")
        })?;

        let mut shared = theme.clone();
        shared.organization_id = Some(membership.organization_id);
        self.save_theme(&shared)
    }

    /// Deletes a stored theme. Unknown ids are a no-op returning `false`.
    ///
    /// Preferences that pointed at the deleted theme are reset to the
    /// built-in default, keeping their dark-mode flag.
    #[instrument(skip(self))]
    pub fn delete_theme(&self, theme_id: &str) -> Result<bool> {
        let user_id = self.require_user()?;
        if theme_id.trim().is_empty() {
            debug!("Ignoring delete without an id");
            return Ok(false);
        }

        let Some(theme) = self.store.get_theme(theme_id)? else {
            debug!(theme_id, "Theme not found, nothing to delete");
            return Ok(false);
        };
        if theme.is_default {
            return Err(ThemeError::DefaultThemeProtected);
        }
        self.authorize_write(user_id, &theme, "delete this theme")?;

        let removed = self.store.delete_theme(theme_id)?;
        let reset = self.store.clear_preferences_for_theme(theme_id)?;
        info!(theme_id, reset_preferences = reset.len(), "Theme deleted");
        Ok(removed)
    }

    /// Upserts the caller's preference. `None` selects the built-in default.
    #[instrument(skip(self))]
    pub fn set_active_theme(&self, theme_id: Option<&str>, is_dark_mode: bool) -> Result<()> {
        let user_id = self.require_user()?;
        let preference = ActivePreference {
            theme_id: theme_id.map(str::to_string),
            is_dark_mode,
            updated_at: Some(Utc::now()),
        };
        self.store.upsert_preference(user_id, &preference)?;
        debug!("Active theme updated");
        Ok(())
    }

    /// Sets `theme_id` as the active theme of every organization member.
    ///
    /// Owner only. A theme not yet shared with the organization is first
    /// copied into it, and the copy is applied. Member writes run
    /// concurrently and independently; a failing member is logged and
    /// reported, the rest still apply.
    #[instrument(skip(self))]
    pub async fn apply_theme_to_organization(&self, theme_id: &str) -> Result<FanOutReport> {
        let user_id = self.require_user()?;
        let membership = self
            .membership(user_id)?
            .filter(Membership::is_owner)
            .ok_or_else(|| {
                ThemeError::permission_denied("only an organization owner may apply themes organization-wide")
            })?;

        let organization_id = membership.organization_id;
        let theme = self.visible_theme(user_id, theme_id, Some(&organization_id))?;
        let theme_id = if theme.organization_id.as_deref() == Some(organization_id.as_str()) {
            theme_id.to_string()
        } else {
            self.copy_into_organization(user_id, &organization_id, theme)?
        };

        let members = self.store.organization_members(&organization_id)?;
        info!(
            organization = %organization_id,
            theme_id = %theme_id,
            members = members.len(),
            "Applying theme to organization"
        );

        let mut tasks = JoinSet::new();
        let mut pending = HashMap::new();
        for member in members {
            let store = Arc::clone(&self.store);
            let theme_id = theme_id.clone();
            let user = member.clone();
            let handle = tasks.spawn_blocking(move || {
                let current = store.get_preference(&user)?;
                let preference = ActivePreference {
                    theme_id: Some(theme_id),
                    is_dark_mode: current.is_some_and(|p| p.is_dark_mode),
                    updated_at: Some(Utc::now()),
                };
                store.upsert_preference(&user, &preference)
            });
            pending.insert(handle.id(), member);
        }

        let mut report = FanOutReport {
            theme_id,
            organization_id,
            updated: Vec::new(),
            failed: Vec::new(),
        };

        while let Some(joined) = tasks.join_next_with_id().await {
            let (task_id, outcome) = match joined {
                Ok((task_id, result)) => (task_id, result),
                Err(e) => (
                    e.id(),
                    Err(ThemeError::Other(format!("preference task aborted: {e}"))),
                ),
            };
            let member = pending
                .remove(&task_id)
                .unwrap_or_else(|| format!("task {task_id}"));
            match outcome {
                Ok(()) => report.updated.push(member),
                Err(e) => {
                    warn!(member = %member, error = %e, "Member preference update failed");
                    report.failed.push(MemberFailure {
                        user_id: member,
                        error: e.to_string(),
                    });
                }
            }
        }

        report.updated.sort();
        report.failed.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(report)
    }

    /// Saves an organization-scoped copy of `theme` and returns its id.
    fn copy_into_organization(
        &self,
        user_id: &str,
        organization_id: &str,
        theme: Theme,
    ) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let copy = Theme {
            id: Some(id.clone()),
            created_by: Some(user_id.to_string()),
            organization_id: Some(organization_id.to_string()),
            is_default: false,
            created_at: Some(now),
            updated_at: Some(now),
            ..theme
        };
        self.store.upsert_theme(&copy)?;
        info!(id = %id, organization_id, name = %copy.name, "Theme copied into organization");
        Ok(id)
    }

    /// Copies a visible theme into `to_user_id`'s personal themes.
    #[instrument(skip(self))]
    pub fn share_theme(&self, theme_id: &str, to_user_id: &str) -> Result<Theme> {
        let user_id = self.require_user()?;
        let organization_id = self.membership(user_id)?.map(|m| m.organization_id);
        let theme = self.visible_theme(user_id, theme_id, organization_id.as_deref())?;

        let now = Utc::now();
        let copy = Theme {
            id: Some(Uuid::new_v4().to_string()),
            name: format!("{} (Shared)", theme.name),
            created_by: Some(to_user_id.to_string()),
            organization_id: None,
            is_default: false,
            created_at: Some(now),
            updated_at: Some(now),
            ..theme
        };

        self.store.upsert_theme(&copy)?;
        info!(from = user_id, to = to_user_id, id = ?copy.id, "Theme shared");
        Ok(copy)
    }

    // === Import / export ===

    /// Serializes the full theme as pretty-printed JSON.
    pub fn export_theme(&self, theme: &Theme) -> String {
        export_theme(theme)
    }

    /// Parses an exported theme, rejecting anything incomplete.
    pub fn try_import_theme(&self, text: &str) -> Result<Theme> {
        try_import_theme(text)
    }

    /// Parses an exported theme, substituting the built-in default on
    /// malformed input. The substitution is recorded as a [`Fallback`].
    pub fn import_theme(&self, text: &str) -> Theme {
        match try_import_theme(text) {
            Ok(theme) => theme,
            Err(e) => {
                self.record_fallback(Fallback::MalformedImport {
                    reason: e.to_string(),
                });
                default_theme()
            }
        }
    }
}

/// Pretty JSON of the whole theme.
pub fn export_theme(theme: &Theme) -> String {
    serde_json::to_string_pretty(theme).unwrap_or_default()
}

/// Strict parse of an exported theme.
pub fn try_import_theme(text: &str) -> Result<Theme> {
    let theme: Theme = serde_json::from_str(text)
        .map_err(|e| ThemeError::MalformedInput(format!("not a theme export: {e}")))?;
    theme.validate().map_err(|e| match e {
        ThemeError::MalformedInput(_) => e,
        other => ThemeError::MalformedInput(other.to_string()),
    })?;
    Ok(theme)
}

/// Download file name: whitespace runs become `_`, plus `.json`.
pub fn export_file_name(theme: &Theme) -> String {
    let stem = theme.name.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{stem}.json")
}
