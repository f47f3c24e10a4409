// Application settings
// Loaded from ~/.config/duudl/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// How the interactive grid should pick its interaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputModeSetting {
    /// Decide from the device's reported capabilities (default)
    #[default]
    Auto,
    /// Hover-capable fine pointer: edit via the per-cell affordance
    Pointer,
    /// Coarse touch: edit via long-press
    Touch,
}

/// Weekday label table for day headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekdayLabelSet {
    #[default]
    En,
    No,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Server
    #[serde(rename = "server.baseUrl")]
    pub base_url: String,

    // Editor
    #[serde(rename = "editor.commentDebounceMs")]
    pub comment_debounce_ms: u64,

    #[serde(rename = "editor.longPressMs")]
    pub long_press_ms: u64,

    #[serde(rename = "editor.longPressMoveTolerance")]
    pub long_press_move_tolerance: f32,

    #[serde(rename = "editor.inputMode")]
    pub input_mode: InputModeSetting,

    // Grid layout (terminal columns/lines)
    #[serde(rename = "grid.columnWidth")]
    pub column_width: u16,

    #[serde(rename = "grid.nameColumnWidth")]
    pub name_column_width: u16,

    #[serde(rename = "grid.cellLines")]
    pub cell_lines: u16,

    // UI
    #[serde(rename = "ui.weekdayLabels")]
    pub weekday_labels: WeekdayLabelSet,

    #[serde(rename = "ui.highlightOwnRow")]
    pub highlight_own_row: bool,

    #[serde(rename = "ui.statusFlashMs")]
    pub status_flash_ms: u64,

    // Tooltip geometry
    #[serde(rename = "tooltip.offsetX")]
    pub tooltip_offset_x: f32,

    #[serde(rename = "tooltip.offsetY")]
    pub tooltip_offset_y: f32,

    #[serde(rename = "tooltip.viewportPadding")]
    pub tooltip_viewport_padding: f32,

    #[serde(rename = "tooltip.minWidth")]
    pub tooltip_min_width: f32,

    #[serde(rename = "tooltip.tolerance")]
    pub truncation_tolerance: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Server
            base_url: "http://127.0.0.1:5001".to_string(),
            // Editor
            comment_debounce_ms: 450,
            long_press_ms: 520,
            long_press_move_tolerance: 10.0,
            input_mode: InputModeSetting::Auto,
            // Grid
            column_width: 12,
            name_column_width: 22,
            cell_lines: 2,
            // UI
            weekday_labels: WeekdayLabelSet::En,
            highlight_own_row: true,
            status_flash_ms: 1800,
            // Tooltip
            tooltip_offset_x: 12.0,
            tooltip_offset_y: 12.0,
            tooltip_viewport_padding: 12.0,
            tooltip_min_width: 260.0,
            truncation_tolerance: 2.0,
        }
    }
}

const DEFAULT_CONFIG: &str = r#"{
    // Poll service
    "server.baseUrl": "http://127.0.0.1:5001",

    // Comment edits are sent after this much quiet time (ms)
    "editor.commentDebounceMs": 450,

    // Touch mode: hold this long to start editing a comment (ms)
    "editor.longPressMs": 520,
    "editor.longPressMoveTolerance": 10,

    // "auto", "pointer" or "touch"
    "editor.inputMode": "auto",

    // Grid layout, in terminal columns / lines
    "grid.columnWidth": 12,
    "grid.nameColumnWidth": 22,
    "grid.cellLines": 2,

    // "en" or "no"
    "ui.weekdayLabels": "en",
    "ui.highlightOwnRow": true,
    "ui.statusFlashMs": 1800,

    // Tooltip geometry (pixel units)
    "tooltip.offsetX": 12,
    "tooltip.offsetY": 12,
    "tooltip.viewportPadding": 12,
    "tooltip.minWidth": 260,
    "tooltip.tolerance": 2
}
"#;

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("duudl");
        config_dir.join("settings.json")
    }

    /// Load settings from the default location, creating it on first run
    pub fn load() -> Self {
        let path = Self::config_path();

        if !path.exists() {
            if let Err(e) = Self::create_default_file(&path) {
                log::warn!("Error writing default settings.json: {}", e);
            }
            return Self::default();
        }

        Self::load_from(&path)
    }

    /// Load settings from an explicit path, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("Error parsing {}: {} (using default settings)", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings JSON, ignoring `//` comment lines.
    pub fn parse(contents: &str) -> Result<Self, String> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        serde_json::from_str(&cleaned).map_err(|e| e.to_string())
    }

    /// Save current settings to disk
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Create default settings file with comments
    fn create_default_file(path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        fs::write(path, DEFAULT_CONFIG).map_err(|e| e.to_string())
    }

    /// Get the config file path for display
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }
}
