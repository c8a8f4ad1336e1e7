use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use pomotune_core::SessionConfig;
use ratatui::style::Color;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const SPOTIFY_TOKEN_ENV: &str = "SPOTIFY_ACCESS_TOKEN";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub theme: Theme,
    pub icons: Icons,
    pub session: SessionDefaults,
    pub alerts: Alerts,
    pub spotify: SpotifySettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Theme {
    #[serde(deserialize_with = "hex_to_color")]
    pub background: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub foreground: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub selection: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub black: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub focus: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub rest: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub green: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub yellow: Color,
    #[serde(deserialize_with = "hex_to_color")]
    pub gray: Color,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Icons {
    pub play: String,
    pub pause: String,
    pub select: String,
    pub marker_filled: String,
    pub marker_empty: String,
    pub progress_filled: String,
    pub progress_empty: String,
    pub music: String,
    pub separator: String,
    pub header_left: String,
    pub header_right: String,
}

/// Starting values for the setup screen.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct SessionDefaults {
    pub focus_duration: u32,
    pub short_break_duration: u32,
    pub long_break_duration: Option<u32>,
    pub break_interval: u32,
    pub total_sessions: u32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Alerts {
    /// Ring the terminal bell when an interval ends.
    pub bell: bool,
    /// Show a desktop notification when an interval ends.
    pub desktop: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SpotifySettings {
    pub enabled: bool,
    /// Already-issued OAuth access token. The environment variable wins.
    pub access_token: Option<String>,
    pub api_base: String,
    pub poll_interval_secs: u64,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::Rgb(9, 14, 19),
            foreground: Color::Rgb(197, 201, 199),
            selection: Color::Rgb(230, 195, 132),
            black: Color::Rgb(13, 12, 12),
            focus: Color::Rgb(59, 130, 246),
            rest: Color::Rgb(246, 59, 62),
            green: Color::Rgb(29, 185, 84),
            yellow: Color::Rgb(196, 178, 138),
            gray: Color::Rgb(164, 167, 164),
        }
    }
}

impl Default for Icons {
    fn default() -> Self {
        Self {
            play: "▶".to_string(),
            pause: "⏸".to_string(),
            select: "▸".to_string(),
            marker_filled: "●".to_string(),
            marker_empty: "○".to_string(),
            progress_filled: "█".to_string(),
            progress_empty: "░".to_string(),
            music: "♫".to_string(),
            separator: "│".to_string(),
            header_left: "⟪ ".to_string(),
            header_right: " ⟫".to_string(),
        }
    }
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            focus_duration: 35,
            short_break_duration: 10,
            long_break_duration: Some(20),
            break_interval: 2,
            total_sessions: 4,
        }
    }
}

impl From<SessionDefaults> for SessionConfig {
    fn from(defaults: SessionDefaults) -> Self {
        Self {
            focus_duration: defaults.focus_duration,
            short_break_duration: defaults.short_break_duration,
            long_break_duration: defaults.long_break_duration,
            break_interval: defaults.break_interval,
            total_sessions: defaults.total_sessions,
        }
    }
}

impl Default for Alerts {
    fn default() -> Self {
        Self {
            bell: true,
            desktop: true,
        }
    }
}

impl Default for SpotifySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            access_token: None,
            api_base: "https://api.spotify.com/v1".to_string(),
            poll_interval_secs: 5,
        }
    }
}

impl SpotifySettings {
    /// Token from the environment, falling back to the config file. Blank
    /// values count as missing.
    pub fn resolve_token(&self, from_env: Option<String>) -> Option<String> {
        from_env
            .or_else(|| self.access_token.clone())
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
    }
}

fn hex_to_color<'de, D>(deserializer: D) -> Result<Color, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = serde::Deserialize::deserialize(deserializer)?;
    if !s.is_ascii() || !s.starts_with('#') || s.len() != 7 {
        return Err(serde::de::Error::custom("invalid hex color format"));
    }
    let r = u8::from_str_radix(&s[1..3], 16).map_err(serde::de::Error::custom)?;
    let g = u8::from_str_radix(&s[3..5], 16).map_err(serde::de::Error::custom)?;
    let b = u8::from_str_radix(&s[5..7], 16).map_err(serde::de::Error::custom)?;
    Ok(Color::Rgb(r, g, b))
}

pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "pomotune", "pomotune")
        .map(|proj_dirs| proj_dirs.config_dir().join("pomotune.toml"))
}

/// Loads `explicit` if given (it must exist), otherwise the per-user config
/// file if there is one, otherwise the built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => {
            if !path.exists() {
                bail!("Config file {:?} does not exist", path);
            }
            read_config(path)
        }
        None => match default_config_path() {
            Some(path) if path.exists() => read_config(&path),
            _ => Ok(Config::default()),
        },
    }
}

fn read_config(path: &Path) -> Result<Config> {
    let config_str = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {:?}", path))?;
    toml::from_str(&config_str)
        .with_context(|| format!("Failed to parse config file at {:?}", path))
}
