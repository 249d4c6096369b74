//! Configuration management utilities.

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::domain::policy::MissingVariablePolicy;

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static DEFAULT_WORKSPACE_CONFIG_PATH: &str = ".parsedir/config.toml";

/// Layered configuration loaded from defaults, user, workspace, explicit file, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub ignore: Ignore,
    #[serde(default)]
    pub replace: Vec<ReplaceRule>,
}

/// Fallbacks for command-line flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Defaults {
    #[serde(default)]
    pub missing_variable: Option<MissingVariablePolicy>,
    #[serde(default)]
    pub vars_file: Option<PathBuf>,
    #[serde(default)]
    pub template_dir: Option<PathBuf>,
    #[serde(default)]
    pub out_dir: Option<PathBuf>,
}

impl Defaults {
    pub fn missing_variable(&self) -> MissingVariablePolicy {
        self.missing_variable.unwrap_or_default()
    }
}

/// Template-tree entries that are never rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Ignore {
    #[serde(default)]
    pub paths: Vec<String>,
    #[serde(default)]
    pub globs: Vec<String>,
}

/// Regex rewrite applied to every rendered path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceRule {
    pub pattern: String,
    #[serde(default)]
    pub replacement: String,
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    missing_variable: Option<String>,
    vars_file: Option<String>,
    template_dir: Option<String>,
    out_dir: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            missing_variable: env::var("PARSEDIR_MISSING_VARIABLE").ok(),
            vars_file: env::var("PARSEDIR_VARS_FILE").ok(),
            template_dir: env::var("PARSEDIR_TEMPLATE_DIR").ok(),
            out_dir: env::var("PARSEDIR_OUT_DIR").ok(),
        }
    }
}

impl Config {
    /// Load configuration from defaults, user/global config, workspace config, an optional
    /// explicit file, and env overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let workspace = workspace_config_path()?;
        Self::load_with_layers(global, workspace, explicit, env)
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        workspace: Option<PathBuf>,
        explicit: Option<&Path>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<Config> = Vec::new();

        layers.push(Self::from_str(&DEFAULT_CONFIG)?);

        if let Some(global_path) = global.filter(|path| path.exists()) {
            layers.push(Self::from_file(&global_path)?);
        }

        if let Some(workspace_path) = workspace.filter(|path| path.exists()) {
            layers.push(Self::from_file(&workspace_path)?);
        }

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(anyhow!("config file not found: {}", path.display()));
            }
            tracing::info!(path = %path.display(), "using config file");
            layers.push(Self::from_file(path)?);
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        apply_env_overrides(merged, env_overrides)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data)
            .with_context(|| format!("invalid config file: {}", path.display()))
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        let mut replace = self.replace;
        replace.extend(other.replace);
        Self {
            defaults: merge_defaults(self.defaults, other.defaults),
            ignore: merge_ignore(self.ignore, other.ignore),
            replace,
        }
    }
}

fn merge_defaults(base: Defaults, overlay: Defaults) -> Defaults {
    Defaults {
        missing_variable: overlay.missing_variable.or(base.missing_variable),
        vars_file: overlay.vars_file.or(base.vars_file),
        template_dir: overlay.template_dir.or(base.template_dir),
        out_dir: overlay.out_dir.or(base.out_dir),
    }
}

fn merge_ignore(base: Ignore, overlay: Ignore) -> Ignore {
    let mut paths: BTreeSet<String> = base.paths.into_iter().collect();
    paths.extend(overlay.paths);

    let mut globs: BTreeSet<String> = base.globs.into_iter().collect();
    globs.extend(overlay.globs);

    Ignore {
        paths: paths.into_iter().collect(),
        globs: globs.into_iter().collect(),
    }
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("parsedir/config.toml"))
}

fn workspace_config_path() -> Result<Option<PathBuf>> {
    let cwd = env::current_dir()?;
    let root = find_repo_root(&cwd).unwrap_or(cwd);
    Ok(Some(root.join(DEFAULT_WORKSPACE_CONFIG_PATH)))
}

fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Result<Config> {
    if let Some(policy) = env.missing_variable {
        let policy = policy
            .parse::<MissingVariablePolicy>()
            .context("invalid PARSEDIR_MISSING_VARIABLE")?;
        config.defaults.missing_variable = Some(policy);
    }
    if let Some(vars_file) = env.vars_file {
        config.defaults.vars_file = Some(vars_file.into());
    }
    if let Some(template_dir) = env.template_dir {
        config.defaults.template_dir = Some(template_dir.into());
    }
    if let Some(out_dir) = env.out_dir {
        config.defaults.out_dir = Some(out_dir.into());
    }
    Ok(config)
}
