// src/config.rs

use crate::constants::{CONVENTIONS_ENV_VAR, DEFAULT_FAILURE_EXIT_CODE, NO_COLOR_ENV_VAR};
use crate::core::conventions::{Conventions, HyphenConventions, SlashConventions};
use crate::core::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Which convention family a dispatcher speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConventionStyle {
    #[default]
    Hyphen,
    Slash,
}

impl ConventionStyle {
    pub fn conventions(self) -> Box<dyn Conventions> {
        match self {
            ConventionStyle::Hyphen => Box::new(HyphenConventions),
            ConventionStyle::Slash => Box::new(SlashConventions),
        }
    }
}

impl FromStr for ConventionStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hyphen" => Ok(ConventionStyle::Hyphen),
            "slash" => Ok(ConventionStyle::Slash),
            _ => Err(ConfigError::UnknownConventions(s.to_string())),
        }
    }
}

/// Dispatcher settings, usually read from a small TOML file:
///
/// ```toml
/// conventions = "slash"
/// failure_exit_code = 2
/// color = false
/// help_on_failure = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub conventions: ConventionStyle,
    pub failure_exit_code: i32,
    pub color: bool,
    pub help_on_failure: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            conventions: ConventionStyle::Hyphen,
            failure_exit_code: DEFAULT_FAILURE_EXIT_CODE,
            color: true,
            help_on_failure: true,
        }
    }
}

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        log::debug!("Loaded settings from '{}'.", path.display());
        Self::from_toml_str(&content)
    }

    /// Applies `CMDLET_CONVENTIONS` and `NO_COLOR` from the process
    /// environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Same as [`Settings::with_env_overrides`], reading variables through
    /// `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(style) = lookup(CONVENTIONS_ENV_VAR) {
            self.conventions = style.parse()?;
        }
        if lookup(NO_COLOR_ENV_VAR).is_some_and(|v| !v.is_empty()) {
            self.color = false;
        }
        Ok(self)
    }
}

// MARK: --- UNIT TESTS ---
