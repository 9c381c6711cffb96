// src/core/error.rs

use thiserror::Error;

/// A raw token could not be converted into a parameter's declared type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoercionError {
    #[error("an empty value is not a valid {expected}")]
    Empty { expected: String },
    #[error("a value of type {expected} is required")]
    MissingValue { expected: String },
    #[error("'{token}' is not a valid {expected}")]
    Invalid { token: String, expected: String },
    #[error("'{token}' is not one of: {variants}")]
    UnknownVariant { token: String, variants: String },
    #[error("{0}")]
    Custom(String),
}

impl CoercionError {
    /// Shorthand for custom parsers that need to reject a token.
    pub fn custom(message: impl Into<String>) -> Self {
        CoercionError::Custom(message.into())
    }

    /// The raw value that failed to convert, when there was one. An option
    /// given no value at all has none.
    pub fn offending_token(&self) -> Option<&str> {
        match self {
            CoercionError::Invalid { token, .. } | CoercionError::UnknownVariant { token, .. } => {
                Some(token)
            }
            CoercionError::Empty { .. } => Some(""),
            CoercionError::MissingValue { .. } | CoercionError::Custom(_) => None,
        }
    }
}

/// A failure during the parse pass. Any of these aborts the whole pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Token '{token}' at position {index} does not match any parameter.")]
    UnmappedParameter { token: String, index: usize },
    #[error("Cannot convert '{token}' for parameter '{parameter}': {source}")]
    Conversion {
        parameter: String,
        token: String,
        #[source]
        source: CoercionError,
    },
}

/// Why a token list did not resolve to an invokable action.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Command '{command}' has no default action.")]
    NoAction { command: String },
    #[error("'{token}' is not an action or sub-command of '{command}'.")]
    Unrecognized { command: String, token: String },
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("Action '{action}' is missing required parameters: {}", missing.join(", "))]
    NotInvokable { action: String, missing: Vec<String> },
}

/// Reading a typed value out of the per-call argument table failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("Action has no parameter named '{0}'.")]
    Unknown(String),
    #[error("Parameter '{0}' has no value and no default.")]
    Missing(String),
    #[error("Parameter '{name}' holds {actual}, which cannot be read as {expected}.")]
    Type {
        name: String,
        expected: &'static str,
        actual: String,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read settings file '{path}'")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Settings are not valid TOML")]
    Toml(#[from] toml::de::Error),
    #[error("Unknown convention family '{0}'; expected 'hyphen' or 'slash'.")]
    UnknownConventions(String),
}
