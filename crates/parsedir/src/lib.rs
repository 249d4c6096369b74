//! Render a directory tree whose paths and contents are templates.
//!
//! A directory or file name may open a `{% for <binding> in <collection> %}` loop. Such a
//! path expands into one output file per element of the collection, and the file content
//! is rendered under the same loop so every output path gets its matching content.

pub mod app;
pub mod cli;
pub mod domain;
pub mod infra;

pub use app::expand::{Expander, Expansion, ExpansionReport, expand};
pub use domain::model::{Context, FileUnit, RenderedUnit};
pub use domain::policy::MissingVariablePolicy;

pub fn init(verbosity: i8) {
    infra::logging::init(verbosity);
}
