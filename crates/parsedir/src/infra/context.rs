//! Loading the variables document used as template context.

use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};

use crate::domain::model::Context;

/// Serialization formats accepted for variables files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextFormat {
    Json,
    Yaml,
}

impl ContextFormat {
    /// JSON when the first non-whitespace character opens an object or array, YAML otherwise.
    pub fn detect(contents: &str) -> Self {
        match contents.trim_start().chars().next() {
            Some('{') | Some('[') => ContextFormat::Json,
            _ => ContextFormat::Yaml,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContextFormat::Json => "json",
            ContextFormat::Yaml => "yaml",
        }
    }
}

/// Read and parse a variables file.
pub fn load_context(path: &Path) -> Result<Context> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("could not read variables file {}", path.display()))?;
    parse_context(&contents)
        .with_context(|| format!("could not parse variables file {}", path.display()))
}

/// Parse a variables document, picking the format from its first character.
pub fn parse_context(contents: &str) -> Result<Context> {
    let format = ContextFormat::detect(contents);
    tracing::info!(format = format.as_str(), "loading variables");
    let value: serde_json::Value = match format {
        ContextFormat::Json => serde_json::from_str(contents).context("invalid JSON")?,
        ContextFormat::Yaml => serde_yaml::from_str(contents).context("invalid YAML")?,
    };
    Ok(Context::new(value))
}
