//! End-to-end rendering of a template directory into an output directory.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::app::expand::{ExpansionReport, Expander};
use crate::app::rename::PathRewriter;
use crate::app::scan::{Scanner, ScannerConfig};
use crate::domain::policy::MissingVariablePolicy;
use crate::infra::config::{Config, ReplaceRule};
use crate::infra::context::load_context;
use crate::infra::fs::{OutputWriter, read_file_units};

/// Inputs for one generation run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub vars_file: PathBuf,
    pub template_dir: PathBuf,
    pub out_dir: PathBuf,
    pub policy: MissingVariablePolicy,
    pub replacements: Vec<ReplaceRule>,
    pub config: Config,
}

/// What a generation run produced.
#[derive(Debug, Clone, Default)]
pub struct GenerateSummary {
    /// Written files, in render order.
    pub written: Vec<PathBuf>,
    pub report: ExpansionReport,
}

/// Render every template under `template_dir` and write the results under `out_dir`.
///
/// All files are rendered before anything is written, so a run aborted by the
/// missing-variable policy leaves the output directory untouched.
pub fn generate(options: &GenerateOptions) -> Result<GenerateSummary> {
    let rewriter = PathRewriter::new(&options.replacements)?;

    let scanner_cfg = ScannerConfig::from_root(options.template_dir.clone(), options.config.clone());
    let scan = Scanner::new()
        .scan(&scanner_cfg)
        .with_context(|| format!("could not scan {}", options.template_dir.display()))?;
    let files = read_file_units(&scan)?;
    tracing::info!(
        templates = files.len(),
        root = %scan.root.display(),
        "loaded templates"
    );

    let context = load_context(&options.vars_file)?;

    let expansion = Expander::new(options.policy)
        .expand(&files, &context)
        .context("rendering aborted")?;

    let writer = OutputWriter::new(&options.out_dir);
    let mut written = Vec::with_capacity(expansion.units.len());
    for mut unit in expansion.units {
        unit.path = rewriter.apply(&unit.path);
        let target = writer
            .write(&unit)
            .with_context(|| format!("failed to write {}", unit.path))?;
        written.push(target);
    }

    let report = expansion.report;
    if announces_skipped(options.policy, &report) {
        tracing::info!(skipped = report.skipped.len(), "some templates were not rendered");
    }
    if !report.alignment_faults.is_empty() {
        tracing::warn!(
            faults = report.alignment_faults.len(),
            "some templates produced misaligned output; check the warnings above"
        );
    }

    Ok(GenerateSummary { written, report })
}

/// `off` keeps render failures silent, including the end-of-run tally.
fn announces_skipped(policy: MissingVariablePolicy, report: &ExpansionReport) -> bool {
    policy != MissingVariablePolicy::Off && !report.skipped.is_empty()
}
