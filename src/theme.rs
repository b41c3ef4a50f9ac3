//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.
//!
//! Only the chrome (background, borders, text) is themable; piece colours come from the
//! shape catalog.

use crate::grid::Rgb;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// UI colours loaded from a theme file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Playfield and screen background.
    pub bg: Color,
    /// Grid lines between cells.
    pub div_line: Color,
    /// Playfield border.
    pub border: Color,
    /// Text (score, record, level).
    pub main_fg: Color,
    /// Titles.
    pub title: Color,
    /// "New high score" and other highlights.
    pub hi_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

impl Theme {
    /// Black background, grey grid, white border and text.
    pub fn classic() -> Self {
        Self {
            bg: Color::Rgb(0, 0, 0),
            div_line: Color::Rgb(128, 128, 128),
            border: Color::Rgb(255, 255, 255),
            main_fg: Color::Rgb(255, 255, 255),
            title: Color::Rgb(255, 255, 255),
            hi_fg: Color::Rgb(255, 0, 255),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to the classic theme if path is None or the file is missing.
    pub fn load(path: Option<&Path>) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default()),
        };
        let s = std::fs::read_to_string(path)?;
        Ok(Self::from_map(&parse_theme_file(&s)))
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        let base = Self::classic();
        Self {
            bg: get("main_bg").unwrap_or(base.bg),
            div_line: get("div_line").unwrap_or(base.div_line),
            border: get("cpu_box").unwrap_or(base.border),
            main_fg: get("main_fg").unwrap_or(base.main_fg),
            title: get("title").unwrap_or(base.title),
            hi_fg: get("hi_fg").unwrap_or(base.hi_fg),
        }
    }
}

/// Terminal colour for a cell colour.
#[inline]
pub fn cell_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    let channel = |hex: &str| u8::from_str_radix(hex, 16).map_err(|_| invalid());
    if !s.is_ascii() {
        return Err(invalid());
    }
    let (r, g, b) = match s.len() {
        6 => (channel(&s[0..2])?, channel(&s[2..4])?, channel(&s[4..6])?),
        3 => (
            channel(&s[0..1])? * 17,
            channel(&s[1..2])? * 17,
            channel(&s[2..3])? * 17,
        ),
        _ => return Err(invalid()),
    };
    Ok(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#98C379").unwrap();
        assert!(matches!(c, Color::Rgb(0x98, 0xC3, 0x79)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_parse_hex_invalid() {
        assert!(matches!(parse_hex("#12"), Err(ThemeError::InvalidHex(_))));
        assert!(matches!(parse_hex("#GGGGGG"), Err(ThemeError::InvalidHex(_))));
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file(r##"theme[main_bg]="#31353F""##);
        assert_eq!(map.get("main_bg"), Some(&"#31353F".to_string()));
    }

    #[test]
    fn test_from_map_keeps_defaults_for_missing_keys() {
        let map = parse_theme_file("# comment\ntheme[title]='#E5C07B'\ntheme[hi_fg]=\"oops\"\n");
        let theme = Theme::from_map(&map);
        assert_eq!(theme.title, Color::Rgb(0xE5, 0xC0, 0x7B));
        assert_eq!(theme.hi_fg, Theme::classic().hi_fg);
        assert_eq!(theme.bg, Theme::classic().bg);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let theme = Theme::load(Some(Path::new("/nonexistent/blockfall.theme"))).unwrap();
        assert_eq!(theme, Theme::classic());
    }

    #[test]
    fn test_cell_color() {
        assert_eq!(cell_color(Rgb(255, 165, 0)), Color::Rgb(255, 165, 0));
    }
}
