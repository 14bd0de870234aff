//! Row shape of the `themes` table.

use chrono::{DateTime, Utc};

use crate::error::{Result, ThemeError};
use crate::theme::{Theme, ThemeVariant};

/// A theme as stored: variants are JSON text columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeRecord {
    pub id: String,
    pub name: String,
    pub light_variant: String,
    pub dark_variant: String,
    pub created_by: Option<String>,
    pub organization_id: Option<String>,
    pub is_default: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl ThemeRecord {
    pub fn from_theme(theme: &Theme) -> Result<Self> {
        let id = super::require_id(theme)?.to_string();
        let encode = |variant: &ThemeVariant| {
            serde_json::to_string(variant)
                .map_err(|e| ThemeError::Other(format!("Failed to encode variant: {e}")))
        };

        Ok(Self {
            id,
            name: theme.name.clone(),
            light_variant: encode(&theme.light)?,
            dark_variant: encode(&theme.dark)?,
            created_by: theme.created_by.clone(),
            organization_id: theme.organization_id.clone(),
            is_default: theme.is_default,
            created_at: theme.created_at.map(|t| t.to_rfc3339()),
            updated_at: theme.updated_at.map(|t| t.to_rfc3339()),
        })
    }

    pub fn into_theme(self) -> Result<Theme> {
        let decode = |column: &str, text: &str| {
            serde_json::from_str::<ThemeVariant>(text).map_err(|e| {
                ThemeError::RemoteFailure(format!("Corrupt {column} for theme {}: {e}", self.id))
            })
        };
        let light = decode("light_variant", &self.light_variant)?;
        let dark = decode("dark_variant", &self.dark_variant)?;

        Ok(Theme {
            light,
            dark,
            created_at: parse_timestamp(self.created_at.as_deref())?,
            updated_at: parse_timestamp(self.updated_at.as_deref())?,
            id: Some(self.id),
            name: self.name,
            created_by: self.created_by,
            organization_id: self.organization_id,
            is_default: self.is_default,
        })
    }
}

pub(super) fn parse_timestamp(value: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    value
        .map(|text| {
            DateTime::parse_from_rfc3339(text)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| ThemeError::RemoteFailure(format!("Invalid timestamp '{text}': {e}")))
        })
        .transpose()
}
