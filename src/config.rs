use ratatui::style::Color;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{fs, io, path::{Path, PathBuf}};
use tracing::{debug, warn};

const APP_DIR: &str = "hacktimer";
pub const CONFIG_FILE: &str = "config.json";
pub const LOG_FILE: &str = "hacktimer.log";
pub const THEMES: &[&str] = &["default", "nord", "dracula", "gruvbox", "solarized"];

// ============================================================================
// Preferences
// ============================================================================

/// User preferences read from `hacktimer/config.json`. Every field is
/// optional in the file.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    pub theme: String,
    pub sound_enabled: bool,
    pub notifications_enabled: bool,
    pub quick_set_hours: Vec<u32>,
    pub completion_title: String,
    pub completion_body: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "default".into(),
            sound_enabled: true,
            notifications_enabled: true,
            quick_set_hours: vec![1, 2, 4, 8],
            completion_title: "🎉 Hackathon complete!".into(),
            completion_body: "Great work, everyone!".into(),
        }
    }
}

impl Config {
    /// Quick-set offsets actually bound to keys: non-zero, at most twelve (F1..F12).
    pub fn quick_set_hours(&self) -> Vec<u32> {
        self.quick_set_hours.iter().copied().filter(|&h| h > 0).take(12).collect()
    }
}

// ============================================================================
// Themes
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Theme {
    pub running_color: Color,
    pub completed_color: Color,
    pub track_color: Color,
    pub border_color: Color,
    pub accent_color: Color,
}

pub fn get_theme(name: &str) -> Theme {
    match name {
        "nord" => Theme {
            running_color: Color::Rgb(136, 192, 208),
            completed_color: Color::Rgb(163, 190, 140),
            track_color: Color::Rgb(76, 86, 106),
            border_color: Color::Rgb(129, 161, 193),
            accent_color: Color::Rgb(180, 142, 173),
        },
        "dracula" => Theme {
            running_color: Color::Rgb(189, 147, 249),
            completed_color: Color::Rgb(80, 250, 123),
            track_color: Color::Rgb(68, 71, 90),
            border_color: Color::Rgb(200, 100, 255),
            accent_color: Color::Rgb(255, 121, 198),
        },
        "gruvbox" => Theme {
            running_color: Color::Rgb(254, 128, 25),
            completed_color: Color::Rgb(184, 187, 38),
            track_color: Color::Rgb(80, 73, 69),
            border_color: Color::Rgb(255, 200, 100),
            accent_color: Color::Rgb(250, 189, 47),
        },
        "solarized" => Theme {
            running_color: Color::Rgb(38, 139, 210),
            completed_color: Color::Rgb(133, 153, 0),
            track_color: Color::Rgb(7, 54, 66),
            border_color: Color::Rgb(42, 161, 152),
            accent_color: Color::Rgb(181, 137, 0),
        },
        _ => Theme {
            // #3b82f6 while counting, #10b981 when done, #e5e7eb track
            running_color: Color::Rgb(59, 130, 246),
            completed_color: Color::Rgb(16, 185, 129),
            track_color: Color::Rgb(229, 231, 235),
            border_color: Color::Rgb(0, 200, 255),
            accent_color: Color::Rgb(255, 100, 0),
        },
    }
}

// ============================================================================
// Files
// ============================================================================

pub fn get_path(filename: &str) -> PathBuf {
    let mut path = PathBuf::from(".");
    path.push(APP_DIR);
    if let Err(e) = fs::create_dir_all(&path) {
        debug!("could not create {}: {}", path.display(), e);
    }
    path.push(filename);
    path
}

/// Reads a JSON file, falling back to `T::default()` when it is missing or
/// malformed.
pub fn load_json<T: DeserializeOwned + Default>(path: &Path) -> T {
    match fs::read_to_string(path) {
        Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
            warn!("ignoring malformed {}: {}", path.display(), e);
            T::default()
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => T::default(),
        Err(e) => {
            warn!("could not read {}: {}", path.display(), e);
            T::default()
        }
    }
}

pub fn save_json<T: Serialize>(path: &Path, data: &T) -> io::Result<()> {
    fs::write(path, serde_json::to_string_pretty(data)?)
}
