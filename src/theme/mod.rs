//! Theme data model.
//!
//! A [`Theme`] always carries both a light and a dark [`ThemeVariant`];
//! switching mode never changes which theme is active.

mod color;
mod model;
mod native;

pub use color::{Rgba, is_valid_color, parse_color};
pub use model::{
    ColorKey, DEFAULT_THEME_NAME, Theme, ThemeColors, ThemeMode, ThemeVariant, default_theme,
    get_theme_variables, get_theme_variant,
};
pub use native::{
    BORDER_RADIUS, BorderRadius, FontFamily, FontSize, FontWeight, NativeTheme, SPACING, Spacing,
    TYPOGRAPHY, Typography, convert_to_native_theme,
};
