use pinback_core::{FilterAction, RenderMode, RgbHex, SessionConfig, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub server: Server,
    pub gallery: Option<Gallery>,
    pub tui: Option<Tui>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in milliseconds (default: 10000)
    pub timeout_ms: Option<u64>,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Starting filters for new sessions; anything unset keeps the built-in default.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Gallery {
    pub apply_date: Option<bool>,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
    pub color: Option<RgbHex>,
    pub hue_tolerance: Option<i32>,
    pub mode: Option<RenderMode>,
    pub grid_size: Option<i64>,
    /// Pixels per centimetre in real-life mode
    pub real_life_scale: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Tui {
    /// Suggestions stay visible this long after the keyword field loses focus (default: 150)
    pub blur_grace_ms: Option<u64>,
    /// Idle typing delay before a suggestion request goes out (default: 0)
    pub suggest_debounce_ms: Option<u64>,
    /// Event poll interval in milliseconds (default: 50)
    pub poll_ms: Option<u64>,
}

impl Settings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.server.timeout_ms.unwrap_or(10_000))
    }

    pub fn session_config(&self) -> SessionConfig {
        let mut cfg = SessionConfig::default();
        if let Some(tui) = &self.tui {
            if let Some(ms) = tui.blur_grace_ms {
                cfg.blur_grace = Duration::from_millis(ms);
            }
            if let Some(ms) = tui.suggest_debounce_ms {
                cfg.suggest_debounce = Duration::from_millis(ms);
            }
        }
        cfg
    }

    pub fn poll_interval(&self) -> Duration {
        let ms = self.tui.as_ref().and_then(|t| t.poll_ms).unwrap_or(50);
        Duration::from_millis(ms.max(1))
    }

    /// Filter actions that turn the default state into the configured one.
    pub fn gallery_actions(&self) -> Vec<FilterAction> {
        let Some(g) = &self.gallery else {
            return Vec::new();
        };
        let mut actions = Vec::new();
        if let Some(on) = g.apply_date {
            actions.push(FilterAction::SetDateFilter(on));
        }
        if let Some(v) = g.year_min {
            actions.push(FilterAction::SetYearMin(v));
        }
        if let Some(v) = g.year_max {
            actions.push(FilterAction::SetYearMax(v));
        }
        if let Some(c) = g.color {
            actions.push(FilterAction::SetColor(Some(c)));
        }
        if let Some(t) = g.hue_tolerance {
            actions.push(FilterAction::SetHueTolerance(t));
        }
        if let Some(m) = g.mode {
            actions.push(FilterAction::SetRenderMode(m));
        }
        if let Some(s) = g.grid_size {
            actions.push(FilterAction::SetGridSize(s));
        }
        if let Some(s) = g.real_life_scale {
            actions.push(FilterAction::SetRealLifeScale(s));
        }
        actions
    }
}

pub fn config_dir() -> PathBuf {
    if let Some(bd) = directories::BaseDirs::new() {
        bd.config_dir().join("pinback")
    } else {
        PathBuf::from("./.config/pinback")
    }
}

pub fn state_dir() -> PathBuf {
    // XDG state dir when the platform has one; config dir otherwise
    if let Some(bd) = directories::BaseDirs::new() {
        if let Some(sd) = bd.state_dir() {
            return sd.join("pinback");
        }
    }
    config_dir()
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.toml")
}

pub fn log_path() -> PathBuf {
    state_dir().join("pinback.log")
}

/// Read settings from `path` (or the default location). A missing file
/// yields defaults; a malformed one is logged and ignored.
pub fn load_settings(path: Option<&Path>) -> Settings {
    let path = path.map(Path::to_path_buf).unwrap_or_else(settings_path);
    match std::fs::read_to_string(&path) {
        Ok(s) => toml::from_str(&s).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings");
            Settings::default()
        }),
        Err(_) => Settings::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinback_core::FilterState;

    #[test]
    fn empty_file_gives_defaults() {
        let s: Settings = toml::from_str("").unwrap();
        assert_eq!(s.server.base_url, DEFAULT_BASE_URL);
        assert_eq!(s.timeout(), Duration::from_secs(10));
        assert!(s.gallery_actions().is_empty());
        assert_eq!(s.session_config().blur_grace, Duration::from_millis(150));
    }

    #[test]
    fn gallery_section_seeds_filters() {
        let s: Settings = toml::from_str(
            r##"
[server]
base_url = "http://archive.local:9000"

[gallery]
year_min = 1950
year_max = 1970
color = "#FF0000"
mode = "real-life"
grid_size = 203

[tui]
blur_grace_ms = 300
"##,
        )
        .unwrap();
        let state = FilterState::default().apply_all(s.gallery_actions());
        assert_eq!(state.year_range(), (1950, 1970));
        assert_eq!(state.color(), Some(RgbHex::new(255, 0, 0)));
        assert!(!state.color_filter_enabled());
        assert_eq!(state.render_mode(), RenderMode::RealLife);
        assert_eq!(state.grid_size(), 200);
        assert_eq!(s.session_config().blur_grace, Duration::from_millis(300));
        assert_eq!(s.server.base_url, "http://archive.local:9000");
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let s = load_settings(Some(&dir.path().join("nope.toml")));
        assert!(s.gallery.is_none());
    }
}
