//! Regex rewriting of rendered output paths.

use anyhow::{Context, Result, anyhow};
use regex::Regex;

use crate::infra::config::ReplaceRule;

/// Ordered list of regex replacements applied to every rendered path.
#[derive(Debug, Clone, Default)]
pub struct PathRewriter {
    rules: Vec<(Regex, String)>,
}

impl PathRewriter {
    /// Compile rules, failing on the first invalid pattern.
    pub fn new(rules: &[ReplaceRule]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|rule| -> Result<(Regex, String)> {
                let regex = Regex::new(&rule.pattern)
                    .with_context(|| format!("invalid replace pattern '{}'", rule.pattern))?;
                Ok((regex, rule.replacement.clone()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply every rule in order, each to the output of the previous one.
    pub fn apply(&self, path: &str) -> String {
        self.rules
            .iter()
            .fold(path.to_owned(), |current, (regex, replacement)| {
                regex.replace_all(&current, replacement.as_str()).into_owned()
            })
    }
}

/// Parse a `PATTERN=REPLACEMENT` command-line argument, splitting at the first `=`.
pub fn parse_replace_arg(raw: &str) -> Result<ReplaceRule> {
    let (pattern, replacement) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected PATTERN=REPLACEMENT, got '{raw}'"))?;
    if pattern.is_empty() {
        return Err(anyhow!("replace pattern must not be empty in '{raw}'"));
    }
    Ok(ReplaceRule {
        pattern: pattern.to_owned(),
        replacement: replacement.to_owned(),
    })
}
