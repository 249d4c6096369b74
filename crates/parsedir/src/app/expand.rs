//! Batch expansion of template files into rendered files.

use std::io;

use crate::app::demux::{Demuxed, demultiplex};
use crate::app::markers::detect_markers;
use crate::app::render::{Evaluator, render_unit};
use crate::domain::errors::{AlignmentFault, ExpandError, TemplateError};
use crate::domain::model::{Context, FileUnit, RenderedUnit};
use crate::domain::policy::MissingVariablePolicy;

/// A template file left out of the output because it failed to render or its output could
/// not be split into files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: String,
    pub error: String,
}

/// Everything noteworthy about a batch besides the rendered files themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionReport {
    /// Number of rendered files handed out.
    pub rendered: usize,
    pub skipped: Vec<SkippedFile>,
    pub alignment_faults: Vec<AlignmentFault>,
}

/// Rendered files of a batch in input order, then iteration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    pub units: Vec<RenderedUnit>,
    pub report: ExpansionReport,
}

/// Drives marker detection, rendering, and splitting for every file of a batch.
pub struct Expander {
    evaluator: Evaluator,
    policy: MissingVariablePolicy,
}

impl Expander {
    pub fn new(policy: MissingVariablePolicy) -> Self {
        Self {
            evaluator: Evaluator::new(),
            policy,
        }
    }

    pub fn policy(&self) -> MissingVariablePolicy {
        self.policy
    }

    /// Expand all files, collecting the rendered output in memory.
    pub fn expand(&self, files: &[FileUnit], context: &Context) -> Result<Expansion, ExpandError> {
        let mut units = Vec::new();
        let report = self.expand_into(files, context, |unit| {
            units.push(unit);
            Ok(())
        })?;
        Ok(Expansion { units, report })
    }

    /// Expand all files, handing each rendered file to `sink` as soon as it is produced.
    ///
    /// Under [`MissingVariablePolicy::Error`] the first file that fails to render aborts the
    /// batch; files already handed to the sink stay emitted.
    pub fn expand_into<F>(
        &self,
        files: &[FileUnit],
        context: &Context,
        mut sink: F,
    ) -> Result<ExpansionReport, ExpandError>
    where
        F: FnMut(RenderedUnit) -> io::Result<()>,
    {
        let context = context.to_template_value();
        let mut report = ExpansionReport::default();

        for file in files {
            tracing::debug!(path = %file.path, "parsing path");
            let demuxed = match self.expand_file(file, &context) {
                Ok(demuxed) => demuxed,
                Err(err) => {
                    self.handle_failure(file, err, &mut report)?;
                    continue;
                }
            };

            if let Some(fault) = demuxed.fault {
                report.skipped.push(SkippedFile {
                    path: file.path.clone(),
                    error: fault.to_string(),
                });
                report.alignment_faults.push(fault);
                continue;
            }
            for unit in demuxed.units {
                let path = unit.path.clone();
                sink(unit).map_err(|source| ExpandError::Sink { path, source })?;
                report.rendered += 1;
            }
        }

        Ok(report)
    }

    /// Render a single file without applying the missing-variable policy.
    pub fn expand_file(
        &self,
        file: &FileUnit,
        context: &minijinja::Value,
    ) -> Result<Demuxed, TemplateError> {
        let scan = detect_markers(&file.path);
        let blobs = render_unit(
            &self.evaluator,
            &scan.bare_path,
            &file.content,
            &scan.markers,
            context,
        )?;
        Ok(demultiplex(&file.path, &blobs.path, &blobs.content))
    }

    fn handle_failure(
        &self,
        file: &FileUnit,
        err: TemplateError,
        report: &mut ExpansionReport,
    ) -> Result<(), ExpandError> {
        match self.policy {
            MissingVariablePolicy::Off => {}
            MissingVariablePolicy::Warn => {
                tracing::warn!(path = %file.path, error = %err, "unable to render file; skipping");
            }
            MissingVariablePolicy::Error => {
                tracing::error!(path = %file.path, error = %err, "unable to render file");
                return Err(ExpandError::Template {
                    path: file.path.clone(),
                    source: err,
                });
            }
        }
        report.skipped.push(SkippedFile {
            path: file.path.clone(),
            error: err.to_string(),
        });
        Ok(())
    }
}

/// Expand `files` against `context`, treating render failures according to `policy`.
pub fn expand(
    files: &[FileUnit],
    context: &Context,
    policy: MissingVariablePolicy,
) -> Result<Expansion, ExpandError> {
    Expander::new(policy).expand(files, context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::render::SEPARATOR;
    use serde_json::json;

    fn pets() -> Context {
        Context::new(json!({
            "pets": [{"name": "rex"}, {"name": "fido"}],
            "dog": {"name": "buddy"},
        }))
    }

    #[test]
    fn missing_variables_are_skipped_under_off() {
        let files = vec![
            FileUnit::new("{{ cat.name }}.txt", "x"),
            FileUnit::new("{{ dog.name }}.txt", "y"),
        ];
        let out = expand(&files, &pets(), MissingVariablePolicy::Off).unwrap();
        assert_eq!(out.units, vec![RenderedUnit::new("buddy.txt", "y")]);
        assert_eq!(out.report.skipped.len(), 1);
        assert_eq!(out.report.skipped[0].path, "{{ cat.name }}.txt");
        assert_eq!(out.report.rendered, 1);
    }

    #[test]
    fn content_failures_skip_the_whole_file() {
        let files = vec![FileUnit::new("{{ dog.name }}.txt", "{{ dog.owner.name }}")];
        let out = expand(&files, &pets(), MissingVariablePolicy::Warn).unwrap();
        assert!(out.units.is_empty());
        assert_eq!(out.report.skipped.len(), 1);
    }

    #[test]
    fn error_policy_stops_at_first_failure() {
        let files = vec![
            FileUnit::new("{{ dog.name }}.txt", "ok"),
            FileUnit::new("{{ cat.name }}.txt", "x"),
            FileUnit::new("after.txt", "never"),
        ];
        let mut seen = Vec::new();
        let err = Expander::new(MissingVariablePolicy::Error)
            .expand_into(&files, &pets(), |unit| {
                seen.push(unit.path);
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, ExpandError::Template { ref path, .. } if path == "{{ cat.name }}.txt"));
        assert_eq!(seen, vec!["buddy.txt".to_string()]);
    }

    #[test]
    fn sink_failures_abort_the_batch() {
        let files = vec![FileUnit::new("a.txt", "a"), FileUnit::new("b.txt", "b")];
        let err = Expander::new(MissingVariablePolicy::Off)
            .expand_into(&files, &pets(), |_| {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
            })
            .unwrap_err();
        assert!(matches!(err, ExpandError::Sink { ref path, .. } if path == "a.txt"));
    }

    #[test]
    fn separator_in_content_skips_the_file() {
        let content = format!("before{SEPARATOR}after");
        let files = vec![
            FileUnit::new("{% for pet in pets %}{{ pet.name }}.txt", content),
            FileUnit::new("{{ dog.name }}.txt", "woof"),
        ];
        let out = expand(&files, &pets(), MissingVariablePolicy::Warn).unwrap();
        assert_eq!(out.units, vec![RenderedUnit::new("buddy.txt", "woof")]);
        assert_eq!(out.report.rendered, 1);
        assert_eq!(out.report.alignment_faults.len(), 1);
        let fault = &out.report.alignment_faults[0];
        assert_eq!(fault.path_segments, 3);
        assert_eq!(fault.content_segments, 5);
        assert_eq!(out.report.skipped.len(), 1);
        assert_eq!(
            out.report.skipped[0].path,
            "{% for pet in pets %}{{ pet.name }}.txt"
        );
    }
}
