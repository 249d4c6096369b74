//! How per-file template failures are treated.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Reaction to a file whose path or content fails to render.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
#[value(rename_all = "kebab-case")]
pub enum MissingVariablePolicy {
    /// Skip the file without any diagnostic.
    Off,
    /// Log a warning naming the file and skip it.
    #[default]
    Warn,
    /// Log an error and abort the whole run.
    Error,
}

impl MissingVariablePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingVariablePolicy::Off => "off",
            MissingVariablePolicy::Warn => "warn",
            MissingVariablePolicy::Error => "error",
        }
    }

    /// Whether a failure under this policy stops the batch.
    pub fn aborts(&self) -> bool {
        matches!(self, MissingVariablePolicy::Error)
    }
}

impl fmt::Display for MissingVariablePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MissingVariablePolicy {
    type Err = PolicyParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "off" | "none" | "ignore" => Ok(MissingVariablePolicy::Off),
            "warn" | "warning" => Ok(MissingVariablePolicy::Warn),
            "error" | "fail" => Ok(MissingVariablePolicy::Error),
            other => Err(PolicyParseError::Unknown(other.to_string())),
        }
    }
}

/// Error returned when parsing a [`MissingVariablePolicy`] fails.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum PolicyParseError {
    #[error("unknown missing-variable policy '{0}' (expected off, warn, or error)")]
    Unknown(String),
}
