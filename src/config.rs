//! gitlane configuration (`gitlane.toml`).
//!
//! Holds the branch priority list and the color theme. Everything has a
//! default, so a missing file is not an error.

use std::path::Path;
use std::str::FromStr;

use ratatui::style::Color;
use serde::Deserialize;

use crate::augment::DEFAULT_PRIORITY;
use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphConfig {
    /// Branch inference settings.
    #[serde(default)]
    pub branches: BranchesConfig,

    /// Graph colors.
    #[serde(default)]
    pub colors: ColorsConfig,
}

// ---------------------------------------------------------------------------
// BranchesConfig
// ---------------------------------------------------------------------------

/// Branch inference settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BranchesConfig {
    /// Branch names preferred for ambiguous commits, best first.
    #[serde(default = "default_priority")]
    pub priority: Vec<String>,
}

impl Default for BranchesConfig {
    fn default() -> Self {
        Self {
            priority: default_priority(),
        }
    }
}

fn default_priority() -> Vec<String> {
    DEFAULT_PRIORITY.iter().map(|&s| s.to_owned()).collect()
}

// ---------------------------------------------------------------------------
// ColorsConfig
// ---------------------------------------------------------------------------

/// Color names as written in the file. Validated by [`GraphConfig::theme`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColorsConfig {
    /// Colors handed out to branches.
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,

    /// Color of the main branch and its counterpart.
    #[serde(default = "default_main")]
    pub main: String,

    /// Pass-through lines on rows where the branch is ambiguous.
    #[serde(default = "default_ambiguous")]
    pub ambiguous: String,

    /// Cells where two different colors meet.
    #[serde(default = "default_neutral")]
    pub neutral: String,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            palette: default_palette(),
            main: default_main(),
            ambiguous: default_ambiguous(),
            neutral: default_neutral(),
        }
    }
}

fn default_palette() -> Vec<String> {
    [
        "cyan",
        "blue",
        "green",
        "yellow",
        "lightred",
        "lightblue",
        "lightgreen",
        "lightmagenta",
        "lightcyan",
        "red",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect()
}

fn default_main() -> String {
    "magenta".to_owned()
}

fn default_ambiguous() -> String {
    "white".to_owned()
}

fn default_neutral() -> String {
    "darkgray".to_owned()
}

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

/// Validated colors, injected into color assignment and layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Theme {
    pub palette: Vec<Color>,
    pub main: Color,
    pub ambiguous: Color,
    pub neutral: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            palette: vec![
                Color::Cyan,
                Color::Blue,
                Color::Green,
                Color::Yellow,
                Color::LightRed,
                Color::LightBlue,
                Color::LightGreen,
                Color::LightMagenta,
                Color::LightCyan,
                Color::Red,
            ],
            main: Color::Magenta,
            ambiguous: Color::White,
            neutral: Color::DarkGray,
        }
    }
}

fn color(field: &str, name: &str) -> Result<Color, ConfigError> {
    Color::from_str(name)
        .map_err(|_| ConfigError::new(format!("colors.{field}: unknown color `{name}`")))
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl GraphConfig {
    /// Load configuration from a TOML file.
    ///
    /// - If the file does not exist, returns all defaults (not an error).
    /// - Invalid TOML, unknown fields or bad colors give a [`ConfigError`]
    ///   carrying the path.
    ///
    /// # Errors
    /// Returns `ConfigError` on I/O errors (other than not-found), parse
    /// errors or invalid colors.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError {
                    path: Some(path.to_owned()),
                    message: format!("could not read file: {e}"),
                });
            }
        };
        Self::parse(&contents)
            .and_then(|config| config.theme().map(|_| config))
            .map_err(|mut e| {
                e.path = Some(path.to_owned());
                e
            })
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `ConfigError` on invalid TOML or unknown fields; the message
    /// starts with the line number when toml reports a span.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| {
            let mut message = e.message().to_owned();
            if let Some(span) = e.span() {
                let line = toml_str[..span.start]
                    .chars()
                    .filter(|&c| c == '\n')
                    .count()
                    + 1;
                message = format!("line {line}: {message}");
            }
            ConfigError::new(message)
        })
    }

    /// Resolve color names into a [`Theme`].
    ///
    /// # Errors
    /// Returns `ConfigError` for an empty palette or an unknown color name.
    pub fn theme(&self) -> Result<Theme, ConfigError> {
        let c = &self.colors;
        if c.palette.is_empty() {
            return Err(ConfigError::new("colors.palette: must not be empty"));
        }
        let palette = c
            .palette
            .iter()
            .map(|name| color("palette", name))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Theme {
            palette,
            main: color("main", &c.main)?,
            ambiguous: color("ambiguous", &c.ambiguous)?,
            neutral: color("neutral", &c.neutral)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
