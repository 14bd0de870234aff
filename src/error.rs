//! Error types for theme operations.

use thiserror::Error;

/// Primary error type for theme operations.
#[derive(Error, Debug)]
pub enum ThemeError {
    // Identity and policy errors
    #[error("Not authenticated: this operation requires a signed-in user")]
    NotAuthenticated,

    #[error("Permission denied: {action}")]
    PermissionDenied { action: String },

    #[error("Not found: {what}")]
    NotFound { what: String },

    #[error("The built-in default theme cannot be deleted")]
    DefaultThemeProtected,

    #[error("Theme has not been saved yet")]
    UnsavedTheme,

    // Data errors
    #[error("Malformed theme data: {0}")]
    MalformedInput(String),

    #[error("Invalid color {value:?}{}", key_suffix(.key))]
    InvalidColor { key: Option<String>, value: String },

    // Backing store errors
    #[error("Theme store request failed: {0}")]
    RemoteFailure(String),

    // Configuration errors
    #[error("Configuration parse error: {0}")]
    ConfigParse(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl ThemeError {
    /// Returns true if the error is recoverable by the user.
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NotAuthenticated
                | Self::NotFound { .. }
                | Self::UnsavedTheme
                | Self::MalformedInput(_)
                | Self::InvalidColor { .. }
                | Self::RemoteFailure(_)
                | Self::ConfigParse(_)
        )
    }

    /// Returns a suggestion for how to fix the error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::NotAuthenticated => Some("Pass --user <ID> or set RTHEME_USER"),
            Self::PermissionDenied { .. } => Some("Ask an organization owner to make this change"),
            Self::UnsavedTheme => Some("Save the theme first"),
            Self::InvalidColor { .. } => Some("Use #rgb, #rrggbb, rgb(r, g, b) or rgba(r, g, b, a)"),
            Self::RemoteFailure(_) => Some("Retry the operation"),
            Self::MalformedInput(_) => Some("Check that the file is an exported theme with name, light and dark"),
            Self::NotFound { .. } => Some("Run: rtheme list"),
            _ => None,
        }
    }

    pub(crate) fn permission_denied(action: impl Into<String>) -> Self {
        Self::PermissionDenied {
            action: action.into(),
        }
    }

    pub(crate) fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }
}

fn key_suffix(key: &Option<String>) -> String {
    key.as_ref().map(|k| format!(" for '{k}'")).unwrap_or_default()
}

/// Convenience type alias for Results using ThemeError.
pub type Result<T> = std::result::Result<T, ThemeError>;

/// Extension trait for adding context to errors.
pub trait ResultExt<T> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E: std::error::Error> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| ThemeError::Other(format!("{}: {e}", f().into())))
    }
}
