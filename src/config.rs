//! Configuration file support
//!
//! Loads settings from ~/.sourcedeco.toml (or %USERPROFILE%\.sourcedeco.toml on Windows)
//!
//! Format: flat TOML table. Unknown keys are ignored.
//!
//! Example:
//! ```text
//! # sourcedeco configuration
//! element = "span"
//! class-attribute = "class"
//! strict-nesting = false
//! line-numbers = true
//! ansi = false
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{DecorationError, Result};

/// Configuration settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Markup element wrapped around each range
    pub element: String,
    /// Attribute receiving the range class
    pub class_attribute: String,
    /// Reject crossing ranges instead of decorating them
    pub strict_nesting: bool,
    /// Prefix output lines with their number
    pub show_line_numbers: bool,
    /// Render for the terminal instead of HTML
    pub ansi: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            element: "span".to_string(),
            class_attribute: "class".to_string(),
            strict_nesting: false,
            show_line_numbers: false,
            ansi: false,
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(windows)]
        {
            std::env::var("USERPROFILE")
                .ok()
                .map(|home| PathBuf::from(home).join(".sourcedeco.toml"))
        }

        #[cfg(not(windows))]
        {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".sourcedeco.toml"))
        }
    }

    /// Load configuration from the default file, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Config::default();
        };
        if !path.exists() {
            return Config::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring config file");
                Config::default()
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let settings = Self::parse(&contents)?;
        let mut config = Config::default();
        config.apply(&settings);
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse config file contents into key-value pairs
    fn parse(contents: &str) -> Result<HashMap<String, String>> {
        let table: toml::Table = contents
            .parse()
            .map_err(|e: toml::de::Error| DecorationError::Config(e.to_string()))?;

        let mut settings = HashMap::new();
        for (key, value) in table {
            let value = match value {
                toml::Value::String(s) => s,
                other => other.to_string(),
            };
            settings.insert(key.to_lowercase(), value);
        }
        Ok(settings)
    }

    /// Apply settings from parsed config
    fn apply(&mut self, settings: &HashMap<String, String>) {
        if let Some(value) = settings.get("element") {
            if valid_name(value) {
                self.element = value.clone();
            } else {
                tracing::warn!(element = %value, "invalid element name, keeping default");
            }
        }

        if let Some(value) = settings.get("class-attribute") {
            if valid_name(value) {
                self.class_attribute = value.clone();
            } else {
                tracing::warn!(attribute = %value, "invalid attribute name, keeping default");
            }
        }

        if let Some(value) = settings.get("strict-nesting") {
            self.strict_nesting = parse_bool(value);
        }

        if let Some(value) = settings.get("line-numbers") {
            self.show_line_numbers = parse_bool(value);
        }

        if let Some(value) = settings.get("ansi") {
            self.ansi = parse_bool(value);
        }
    }
}

/// Parse a boolean value from string
fn parse_bool(s: &str) -> bool {
    let s = s.to_lowercase();
    matches!(s.as_str(), "true" | "yes" | "on" | "1")
}

/// Element and attribute names: a letter, then letters, digits or dashes
fn valid_name(name: &str) -> bool {
    static NAME: OnceLock<Regex> = OnceLock::new();
    NAME.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9-]*$").expect("name pattern is valid"))
        .is_match(name)
}
