//! Projection of a theme for the mobile (non-web) client.
//!
//! The typography, spacing, and radius scales are fixed tables merged with the
//! selected palette; nothing here is computed from the colors.

use serde::Serialize;

use super::model::{Theme, ThemeColors, ThemeMode, get_theme_variant};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeTheme {
    pub colors: ThemeColors,
    pub typography: Typography,
    pub spacing: Spacing,
    pub border_radius: BorderRadius,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Typography {
    pub font_family: FontFamily,
    pub font_size: FontSize,
    pub font_weight: FontWeight,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FontFamily {
    pub regular: &'static str,
    pub bold: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FontSize {
    pub xs: u16,
    pub sm: u16,
    pub md: u16,
    pub lg: u16,
    pub xl: u16,
    pub xxl: u16,
    pub xxxl: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FontWeight {
    pub regular: &'static str,
    pub medium: &'static str,
    pub semi_bold: &'static str,
    pub bold: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Spacing {
    pub xs: u16,
    pub sm: u16,
    pub md: u16,
    pub lg: u16,
    pub xl: u16,
    pub xxl: u16,
}

/// Corner radii; `round` means fully rounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BorderRadius {
    pub xs: u16,
    pub sm: u16,
    pub md: u16,
    pub lg: u16,
    pub xl: u16,
    pub round: u16,
}

pub const TYPOGRAPHY: Typography = Typography {
    font_family: FontFamily {
        regular: "System",
        bold: "System",
    },
    font_size: FontSize {
        xs: 12,
        sm: 14,
        md: 16,
        lg: 18,
        xl: 20,
        xxl: 24,
        xxxl: 32,
    },
    font_weight: FontWeight {
        regular: "400",
        medium: "500",
        semi_bold: "600",
        bold: "700",
    },
};

pub const SPACING: Spacing = Spacing {
    xs: 4,
    sm: 8,
    md: 16,
    lg: 24,
    xl: 32,
    xxl: 48,
};

pub const BORDER_RADIUS: BorderRadius = BorderRadius {
    xs: 4,
    sm: 8,
    md: 12,
    lg: 16,
    xl: 24,
    round: 9999,
};

/// Builds the mobile theme object for one mode of `theme`.
pub fn convert_to_native_theme(theme: &Theme, is_dark_mode: bool) -> NativeTheme {
    let variant = get_theme_variant(theme, ThemeMode::from_dark(is_dark_mode));
    NativeTheme {
        colors: variant.colors.clone(),
        typography: TYPOGRAPHY,
        spacing: SPACING,
        border_radius: BORDER_RADIUS,
    }
}
