//! Color-string parsing for theme slots.
//!
//! Slots hold the color text exactly as the user typed it; parsing is only
//! used to validate and to derive contrast hints for previews.

use serde::Serialize;

use crate::error::{Result, ThemeError};

/// A parsed RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Alpha in 0.0..=1.0.
    pub a: f32,
}

impl Rgba {
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Relative luminance per WCAG, ignoring alpha.
    #[allow(clippy::suboptimal_flops)]
    pub fn luminance(&self) -> f64 {
        fn channel(c: u8) -> f64 {
            let c = f64::from(c) / 255.0;
            if c <= 0.039_28 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * channel(self.r) + 0.7152 * channel(self.g) + 0.0722 * channel(self.b)
    }

    /// True when dark text reads better than light text on this color.
    pub fn is_light(&self) -> bool {
        self.luminance() > 0.179
    }

    /// Nearest entry of the xterm 256-color cube.
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_ansi256(&self) -> u8 {
        const LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];
        let nearest = |c: u8| {
            LEVELS
                .iter()
                .enumerate()
                .min_by_key(|&(_, &level)| level.abs_diff(c))
                .map_or(0, |(i, _)| i as u8)
        };
        16 + 36 * nearest(self.r) + 6 * nearest(self.g) + nearest(self.b)
    }

    /// Lowercase `#rrggbb` form (alpha dropped).
    pub fn to_hex(&self) -> String {
        format!("#{}", hex::encode([self.r, self.g, self.b]))
    }
}

/// Parse a CSS-style color string.
///
/// Accepted forms: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`,
/// `rgba(r, g, b, a)` and `transparent`.
pub fn parse_color(value: &str) -> Result<Rgba> {
    let trimmed = value.trim();
    let invalid = || ThemeError::InvalidColor {
        key: None,
        value: value.to_string(),
    };

    if trimmed.eq_ignore_ascii_case("transparent") {
        return Ok(Rgba {
            r: 0,
            g: 0,
            b: 0,
            a: 0.0,
        });
    }

    if let Some(digits) = trimmed.strip_prefix('#') {
        return parse_hex(digits).ok_or_else(invalid);
    }

    let lower = trimmed.to_ascii_lowercase();
    if let Some(args) = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let with_alpha = lower.starts_with("rgba(");
        return parse_functional(args, with_alpha).ok_or_else(invalid);
    }

    Err(invalid())
}

/// Returns true if `value` parses as a color.
pub fn is_valid_color(value: &str) -> bool {
    parse_color(value).is_ok()
}

fn parse_hex(digits: &str) -> Option<Rgba> {
    // Expand shorthand (#abc -> #aabbcc)
    let expanded: String = match digits.len() {
        3 | 4 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 | 8 => digits.to_string(),
        _ => return None,
    };

    let bytes = hex::decode(&expanded).ok()?;
    let a = bytes.get(3).map_or(1.0, |&a| f32::from(a) / 255.0);
    Some(Rgba {
        r: bytes[0],
        g: bytes[1],
        b: bytes[2],
        a,
    })
}

fn parse_functional(args: &str, with_alpha: bool) -> Option<Rgba> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    let expected = if with_alpha { 4 } else { 3 };
    if parts.len() != expected {
        return None;
    }

    let r = parts[0].parse::<u8>().ok()?;
    let g = parts[1].parse::<u8>().ok()?;
    let b = parts[2].parse::<u8>().ok()?;
    let a = if with_alpha {
        let a = parts[3].parse::<f32>().ok()?;
        if !(0.0..=1.0).contains(&a) {
            return None;
        }
        a
    } else {
        1.0
    };

    Some(Rgba { r, g, b, a })
}
