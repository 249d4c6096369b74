//! Template evaluation and marker-aware wrapping of paths and contents.

use minijinja::{AutoEscape, Environment, UndefinedBehavior, Value};

use crate::domain::errors::TemplateError;
use crate::domain::model::RangeMarker;

/// Emitted once per innermost iteration, directly after the wrapped target. It is printed by
/// an expression rather than spliced in as template text, so whitespace control in the
/// target cannot eat any part of it.
pub(crate) const SEPARATOR: &str = "\u{1e}parsedir-segment-5c1f0a9e-3b7d-4e62-a8d4-9f2c6b1e7a30\u{1e}";

/// Closes one range marker.
const TERMINATOR: &str = "{% endfor %}";

/// Evaluates template strings against a context.
pub struct Evaluator {
    env: Environment<'static>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    /// Create an evaluator that rejects undefined variables and never escapes output.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        Self { env }
    }

    /// Render `source` once against `context`.
    pub fn evaluate(&self, source: &str, context: &Value) -> Result<String, TemplateError> {
        self.env
            .render_str(source, context)
            .map_err(TemplateError::from)
    }
}

/// The raw evaluation output for one file's path and content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBlobs {
    pub path: String,
    pub content: String,
    /// Whether the blobs were produced by wrapping and carry separators.
    pub ranged: bool,
}

/// Wrap `target` in every marker so it renders once per combination of iterated elements.
pub fn wrap(target: &str, markers: &[RangeMarker]) -> String {
    let opens = markers
        .iter()
        .map(RangeMarker::open_text)
        .collect::<Vec<_>>()
        .join("\n");
    let ends = vec![TERMINATOR; markers.len()].join("\n");
    format!("{opens}\n{target}{{{{ \"{SEPARATOR}\" }}}}\n{ends}")
}

/// Render a file's bare path and content under the same markers.
///
/// Without markers both strings are evaluated as-is. With markers, path and content are
/// wrapped identically so their segments line up one-to-one after splitting. Failures are
/// returned untouched; deciding whether they matter is up to the caller.
pub fn render_unit(
    evaluator: &Evaluator,
    bare_path: &str,
    content: &str,
    markers: &[RangeMarker],
    context: &Value,
) -> Result<RenderedBlobs, TemplateError> {
    if markers.is_empty() {
        return Ok(RenderedBlobs {
            path: evaluator.evaluate(bare_path, context)?,
            content: evaluator.evaluate(content, context)?,
            ranged: false,
        });
    }

    let path = evaluator.evaluate(&wrap(bare_path, markers), context)?;
    let content = evaluator.evaluate(&wrap(content, markers), context)?;
    Ok(RenderedBlobs {
        path,
        content,
        ranged: true,
    })
}
