use pinback_core::RgbHex;
use ratatui::style::Color;
use serde::Deserialize;
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GalleryTheme {
    pub accent_fg: Color,
    pub border_fg: Color,
    pub help_fg: Color,
    pub error_fg: Color,
    /// Tile border when the record has no usable color.
    pub tile_fg: Color,
}

impl Default for GalleryTheme {
    fn default() -> Self {
        Self {
            accent_fg: Color::Cyan,
            border_fg: Color::Gray,
            help_fg: Color::Yellow,
            error_fg: Color::Red,
            tile_fg: Color::DarkGray,
        }
    }
}

#[derive(Deserialize, Default)]
struct RawTheme {
    accent_fg: Option<String>,
    border_fg: Option<String>,
    help_fg: Option<String>,
    error_fg: Option<String>,
    tile_fg: Option<String>,
}

/// `<config dir>/tui_theme.toml`, falling back to the defaults per field.
pub fn load_theme() -> GalleryTheme {
    load_theme_from(&crate::config::config_dir().join("tui_theme.toml"))
}

pub fn load_theme_from(path: &Path) -> GalleryTheme {
    let raw = std::fs::read_to_string(path)
        .ok()
        .and_then(|s| toml::from_str::<RawTheme>(&s).ok())
        .unwrap_or_default();
    let d = GalleryTheme::default();
    let pick = |v: Option<String>, fallback: Color| {
        v.as_deref().and_then(parse_color).unwrap_or(fallback)
    };
    GalleryTheme {
        accent_fg: pick(raw.accent_fg, d.accent_fg),
        border_fg: pick(raw.border_fg, d.border_fg),
        help_fg: pick(raw.help_fg, d.help_fg),
        error_fg: pick(raw.error_fg, d.error_fg),
        tile_fg: pick(raw.tile_fg, d.tile_fg),
    }
}

/// Named colors, `#rrggbb`, or `rgb(r, g, b)`.
pub fn parse_color(s: &str) -> Option<Color> {
    let k = s.trim().to_ascii_lowercase();
    match k.as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "white" => Some(Color::White),
        "gray" | "grey" => Some(Color::Gray),
        "darkgray" | "darkgrey" => Some(Color::DarkGray),
        _ => {
            if k.starts_with('#') {
                return k.parse::<RgbHex>().ok().map(rgb);
            }
            if let Some(rest) = k.strip_prefix("rgb(") {
                return parse_rgb_tuple(rest);
            }
            None
        }
    }
}

pub fn rgb(c: RgbHex) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

fn parse_rgb_tuple(rest: &str) -> Option<Color> {
    let t = rest.strip_suffix(')')?;
    let parts: Vec<_> = t.split(',').map(|p| p.trim()).collect();
    if parts.len() != 3 {
        return None;
    }
    let r = parts[0].parse::<u8>().ok()?;
    let g = parts[1].parse::<u8>().ok()?;
    let b = parts[2].parse::<u8>().ok()?;
    Some(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_hex_and_tuples() {
        assert_eq!(parse_color("Grey"), Some(Color::Gray));
        assert_eq!(parse_color("#0080ff"), Some(Color::Rgb(0, 128, 255)));
        assert_eq!(parse_color("rgb(1, 2, 3)"), Some(Color::Rgb(1, 2, 3)));
        assert_eq!(parse_color("rgb(1,2)"), None);
        assert_eq!(parse_color("mauve"), None);
    }

    #[test]
    fn partial_theme_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tui_theme.toml");
        std::fs::write(&path, "accent_fg = \"magenta\"\nerror_fg = \"nonsense\"\n").unwrap();
        let t = load_theme_from(&path);
        assert_eq!(t.accent_fg, Color::Magenta);
        assert_eq!(t.error_fg, GalleryTheme::default().error_fg);
        assert_eq!(t.border_fg, GalleryTheme::default().border_fg);
    }
}
