//! Domain-specific errors.

use std::io;

use thiserror::Error;

/// Failure reported by the template evaluator for a single template string.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template syntax error: {0}")]
    Syntax(#[source] minijinja::Error),
    #[error("template evaluation failed: {0}")]
    Evaluation(#[source] minijinja::Error),
}

impl From<minijinja::Error> for TemplateError {
    fn from(err: minijinja::Error) -> Self {
        match err.kind() {
            minijinja::ErrorKind::SyntaxError => TemplateError::Syntax(err),
            _ => TemplateError::Evaluation(err),
        }
    }
}

/// Fatal errors that stop an expansion batch.
#[derive(Debug, Error)]
pub enum ExpandError {
    #[error("unable to render '{path}': {source}")]
    Template {
        path: String,
        #[source]
        source: TemplateError,
    },
    #[error("failed to emit rendered file '{path}'")]
    Sink {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Path and content of one template rendered into a different number of segments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "'{source_path}' rendered {path_segments} path segment(s) but {content_segments} content segment(s)"
)]
pub struct AlignmentFault {
    pub source_path: String,
    pub path_segments: usize,
    pub content_segments: usize,
}
