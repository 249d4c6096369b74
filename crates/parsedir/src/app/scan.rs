//! Template directory scanning.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::{DirEntry, WalkBuilder};

use crate::infra::config::Config;

const PARSEDIR_IGNORE: &str = ".parsedirignore";

/// A file discovered in the template tree.
#[derive(Debug, Clone)]
pub struct TemplateFile {
    pub path: PathBuf,
    /// Path relative to the template root, `/`-separated. This is the template path.
    pub display_path: String,
    pub skipped: Option<SkipReason>,
}

/// Reason for leaving a file out of rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    BinaryFile,
}

/// Result of scanning a template root.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub files: Vec<TemplateFile>,
    pub root: PathBuf,
}

impl ScanResult {
    /// Files that will be rendered, in scan order.
    pub fn renderable(&self) -> impl Iterator<Item = &TemplateFile> {
        self.files.iter().filter(|file| file.skipped.is_none())
    }
}

/// Configuration inputs for the scanner.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub root: PathBuf,
    pub config: Config,
}

impl ScannerConfig {
    pub fn from_root(root: PathBuf, config: Config) -> Self {
        Self { root, config }
    }
}

/// Walks a template directory and lists its regular files sorted by path.
#[derive(Debug, Default)]
pub struct Scanner;

impl Scanner {
    pub fn new() -> Self {
        Self
    }

    pub fn scan(&self, cfg: &ScannerConfig) -> Result<ScanResult> {
        if !cfg.root.is_dir() {
            anyhow::bail!("template directory {} does not exist", cfg.root.display());
        }

        let matcher = build_ignore_matcher(&cfg.root, cfg)?;
        let mut builder = WalkBuilder::new(&cfg.root);
        builder
            .standard_filters(false)
            .follow_links(true)
            .sort_by_file_name(|a, b| a.cmp(b));

        let root = cfg.root.clone();
        builder.filter_entry(move |entry| {
            if entry.depth() == 0 {
                return true;
            }
            let rel = entry.path().strip_prefix(&root).unwrap_or(entry.path());
            !matcher.should_skip(rel)
        });

        let mut files = Vec::new();
        for result in builder.build() {
            let entry = result
                .with_context(|| format!("could not walk template directory {}", cfg.root.display()))?;
            if let Some(file) = process_entry(&entry, &cfg.root) {
                if file.skipped == Some(SkipReason::BinaryFile) {
                    tracing::warn!(path = %file.display_path, "skipping binary template file");
                }
                files.push(file);
            }
        }

        Ok(ScanResult {
            files,
            root: cfg.root.clone(),
        })
    }
}

fn process_entry(entry: &DirEntry, root: &Path) -> Option<TemplateFile> {
    let path = entry.path();
    if !entry.file_type().is_some_and(|kind| kind.is_file()) {
        return None;
    }

    let skipped = is_probably_binary(path).then_some(SkipReason::BinaryFile);
    Some(TemplateFile {
        path: path.to_path_buf(),
        display_path: to_display_path(root, path),
        skipped,
    })
}

fn to_display_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn is_probably_binary(path: &Path) -> bool {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(_) => return false,
    };
    let mut buf = [0u8; 1024];
    match file.read(&mut buf) {
        Ok(0) => false,
        Ok(n) => {
            let slice = &buf[..n];
            slice.contains(&0) || !is_utf8_prefix(slice)
        }
        Err(_) => false,
    }
}

/// UTF-8 check tolerant of a multi-byte character cut off by the read buffer.
fn is_utf8_prefix(bytes: &[u8]) -> bool {
    match std::str::from_utf8(bytes) {
        Ok(_) => true,
        Err(err) => err.error_len().is_none(),
    }
}

#[derive(Debug, Clone)]
struct IgnoreMatcher {
    globs: Option<GlobSet>,
}

impl IgnoreMatcher {
    fn should_skip(&self, rel: &Path) -> bool {
        self.globs.as_ref().is_some_and(|set| set.is_match(rel))
    }
}

fn build_ignore_matcher(root: &Path, cfg: &ScannerConfig) -> Result<IgnoreMatcher> {
    let mut builder = GlobSetBuilder::new();

    for pattern in &cfg.config.ignore.paths {
        for expanded in expand_dir_pattern(pattern) {
            let glob = Glob::new(&expanded).context("invalid ignore path pattern")?;
            builder.add(glob);
        }
    }

    for glob in &cfg.config.ignore.globs {
        let glob = Glob::new(glob).context("invalid ignore glob")?;
        builder.add(glob);
    }

    for pattern in load_parsedirignore(root)? {
        for expanded in expand_dir_pattern(&pattern) {
            let glob = Glob::new(&expanded).context("invalid .parsedirignore pattern")?;
            builder.add(glob);
        }
    }

    // The ignore file is never a template.
    builder.add(Glob::new(PARSEDIR_IGNORE)?);

    let globs = builder.build().context("failed to build ignore matcher")?;

    Ok(IgnoreMatcher { globs: Some(globs) })
}

fn expand_dir_pattern(raw: &str) -> Vec<String> {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Vec::new();
    }
    vec![
        trimmed.to_owned(),
        format!("{trimmed}/**"),
        format!("**/{trimmed}"),
        format!("**/{trimmed}/**"),
    ]
}

fn load_parsedirignore(root: &Path) -> Result<Vec<String>> {
    let path = root.join(PARSEDIR_IGNORE);
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(&path).with_context(|| format!("failed to open {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut patterns = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        patterns.push(trimmed.to_owned());
    }
    Ok(patterns)
}
