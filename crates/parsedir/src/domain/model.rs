//! Domain models for template files, range markers, and rendered output.

use serde::{Deserialize, Serialize};

/// One input artifact before expansion. Both fields may contain template syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUnit {
    /// Output location relative to the output root.
    pub path: String,
    pub content: String,
}

impl FileUnit {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// A finished `(path, content)` pair ready to be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedUnit {
    pub path: String,
    pub content: String,
}

impl RenderedUnit {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// A repetition directive found in a template path, kept as its literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeMarker {
    open: String,
}

impl RangeMarker {
    pub fn new(open: impl Into<String>) -> Self {
        Self { open: open.into() }
    }

    /// The directive exactly as it appeared in the path.
    pub fn open_text(&self) -> &str {
        &self.open
    }
}

/// The data document every template is evaluated against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context {
    value: serde_json::Value,
}

impl Context {
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }

    pub fn value(&self) -> &serde_json::Value {
        &self.value
    }

    /// Convert into the evaluator's value representation.
    pub fn to_template_value(&self) -> minijinja::Value {
        minijinja::Value::from_serializable(&self.value)
    }
}

impl From<serde_json::Value> for Context {
    fn from(value: serde_json::Value) -> Self {
        Self::new(value)
    }
}
