//! Chart settings: level ordering, level colours, and the colour palette
//!
//! Levels come from `listLevelOrder` as a name → order map plus a name → colour
//! token map. Tokens resolve through the palette, so a settings file can restyle
//! the whole chart without touching the level table.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading or parsing chart settings
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse settings TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Normalise a level name the way the level lookup keys are stored
pub fn normalize_level(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Sort order and colour token per level name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelCatalog {
    order: HashMap<String, i32>,
    colors: HashMap<String, String>,
}

impl LevelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a level, replacing any previous entry with the same normalised name
    pub fn insert(&mut self, name: &str, order: i32, color: Option<&str>) {
        let key = normalize_level(name);
        self.order.insert(key.clone(), order);
        match color {
            Some(color) => {
                self.colors.insert(key, color.to_string());
            }
            None => {
                self.colors.remove(&key);
            }
        }
    }

    pub fn with_level(mut self, name: &str, order: i32) -> Self {
        self.insert(name, order, None);
        self
    }

    /// Sort key for a level; unknown or missing levels sort last
    pub fn order_of(&self, level: Option<&str>) -> i32 {
        level
            .and_then(|name| self.order.get(&normalize_level(name)))
            .copied()
            .unwrap_or(i32::MAX)
    }

    pub fn color_token(&self, level: Option<&str>) -> Option<&str> {
        level
            .and_then(|name| self.colors.get(&normalize_level(name)))
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// A palette mapping colour tokens to concrete values
#[derive(Debug, Clone)]
pub struct Palette {
    pub name: Option<String>,
    pub description: Option<String>,
    /// token name -> hex colour
    pub colors: HashMap<String, String>,
}

/// Default palette: light boxes, grey pass-through managers, blue highlights
const DEFAULT_PALETTE: &str = r##"
[colors]
node-fill = "#ffffff"
node-stroke = "#90a4ae"
node-text = "#263238"

hidden-fill = "#eceff1"
hidden-stroke = "#b0bec5"
hidden-text = "#90a4ae"

seat-fill = "#fafafa"
seat-stroke = "#78909c"
seat-selected-stroke = "#ff9800"

selected-stroke = "#1565c0"
selected-fill = "#e3f2fd"
candidate-stroke = "#4caf50"
ghost-fill = "#cfd8dc"

link = "#b0bec5"
link-active = "#1565c0"

accent-1 = "#2196f3"
accent-2 = "#e3f2fd"
secondary-1 = "#ff9800"
secondary-2 = "#fff3e0"
"##;

#[derive(Deserialize)]
struct TomlSettings {
    metadata: Option<TomlMetadata>,
    chart: Option<TomlChart>,
    #[serde(default)]
    levels: HashMap<String, TomlLevel>,
    #[serde(default)]
    colors: HashMap<String, String>,
}

#[derive(Deserialize)]
struct TomlMetadata {
    name: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize)]
struct TomlChart {
    root: Option<String>,
}

#[derive(Deserialize)]
struct TomlLevel {
    order: i32,
    color: Option<String>,
}

impl Palette {
    /// Resolve a token to a concrete value. Hex literals pass through.
    pub fn resolve<'a>(&'a self, token: &'a str) -> Option<&'a str> {
        if token.starts_with('#') {
            return Some(token);
        }
        self.colors.get(token).map(|s| s.as_str())
    }

    /// Resolve a token with fallback to the default palette, then to a neutral grey
    pub fn resolve_or_default(&self, token: &str) -> String {
        if let Some(color) = self.resolve(token) {
            return color.to_string();
        }

        let default = Self::default();
        if let Some(color) = default.resolve(token) {
            return color.to_string();
        }

        if token.ends_with("-fill") {
            return "#ffffff".to_string();
        }
        if token.ends_with("-text") {
            return "#263238".to_string();
        }

        "#90a4ae".to_string()
    }
}

impl Default for Palette {
    fn default() -> Self {
        let parsed: TomlSettings =
            toml::from_str(DEFAULT_PALETTE).expect("Default palette should be valid TOML");
        Palette {
            name: None,
            description: None,
            colors: parsed.colors,
        }
    }
}

/// Everything a settings file can configure
#[derive(Debug, Clone, Default)]
pub struct ChartSettings {
    /// Display name of the designated root
    pub root_name: Option<String>,
    pub levels: LevelCatalog,
    pub palette: Palette,
}

impl ChartSettings {
    /// Load settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load settings from a TOML string. Palette entries override the defaults.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, SettingsError> {
        let parsed: TomlSettings = toml::from_str(content)?;

        let mut levels = LevelCatalog::new();
        for (name, level) in &parsed.levels {
            levels.insert(name, level.order, level.color.as_deref());
        }

        let mut palette = Palette::default();
        palette.name = parsed.metadata.as_ref().and_then(|m| m.name.clone());
        palette.description = parsed.metadata.as_ref().and_then(|m| m.description.clone());
        palette.colors.extend(parsed.colors);

        Ok(ChartSettings {
            root_name: parsed.chart.and_then(|c| c.root),
            levels,
            palette,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_palette() {
        let palette = Palette::default();
        assert!(palette.colors.contains_key("node-fill"));
        assert!(palette.colors.contains_key("hidden-fill"));
        assert!(palette.colors.contains_key("selected-stroke"));
    }

    #[test]
    fn test_resolve_hex_passthrough() {
        let palette = Palette::default();
        assert_eq!(palette.resolve("#123456"), Some("#123456"));
        assert_eq!(palette.resolve("nonexistent"), None);
    }

    #[test]
    fn test_resolve_or_default_fallback() {
        let empty = Palette {
            name: None,
            description: None,
            colors: HashMap::new(),
        };
        assert_eq!(empty.resolve_or_default("node-fill"), "#ffffff");
        assert_eq!(empty.resolve_or_default("custom-fill"), "#ffffff");
        assert_eq!(empty.resolve_or_default("mystery"), "#90a4ae");
    }

    #[test]
    fn test_level_lookup_is_normalised() {
        let mut levels = LevelCatalog::new();
        levels.insert("  Director ", 2, Some("accent-1"));
        assert_eq!(levels.order_of(Some("director")), 2);
        assert_eq!(levels.order_of(Some("DIRECTOR")), 2);
        assert_eq!(levels.color_token(Some("Director")), Some("accent-1"));
    }

    #[test]
    fn test_unknown_levels_sort_last() {
        let levels = LevelCatalog::new().with_level("VP", 1);
        assert_eq!(levels.order_of(Some("Intern")), i32::MAX);
        assert_eq!(levels.order_of(None), i32::MAX);
    }

    #[test]
    fn test_parse_settings() {
        let toml_str = r##"
[metadata]
name = "Acme"

[chart]
root = "Ada Lovelace"

[levels."Vice President"]
order = 1
color = "accent-1"

[levels.engineer]
order = 5

[colors]
node-fill = "#000000"
"##;
        let settings = ChartSettings::from_str(toml_str).expect("Should parse");
        assert_eq!(settings.root_name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(settings.levels.order_of(Some("vice president")), 1);
        assert_eq!(settings.levels.order_of(Some("Engineer")), 5);
        assert_eq!(settings.palette.name.as_deref(), Some("Acme"));
        assert_eq!(settings.palette.resolve("node-fill"), Some("#000000"));
        assert!(settings.palette.resolve("link").is_some());
    }

    #[test]
    fn test_invalid_toml_error() {
        let result = ChartSettings::from_str("this is not valid toml {{{{");
        assert!(result.is_err());
    }
}
