//! Command-line interface.

use std::io;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::app::generate::{GenerateOptions, generate};
use crate::app::rename::parse_replace_arg;
use crate::domain::policy::MissingVariablePolicy;
use crate::infra::config::{Config, ReplaceRule};

const EXAMPLE: &str = "\
Example template tree:

  templates/
  |-- {{ dog.name }}/
  |   `-- {{ dog.name }}.yaml
  `-- {% for pet in pets %}{{ pet.name }}/
      `-- detail.txt

  parsedir --vars-file vars.yaml --template-dir templates --out-dir result

Every path and file content is rendered against vars.yaml. A directory named with a
`{% for .. in .. %}` tag is expanded once per element of the collection.";

/// Render a directory of templates, expanding looped paths into many files.
#[derive(Debug, Parser)]
#[command(name = "parsedir", author, version, about, after_help = EXAMPLE)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub render: RenderArgs,

    /// Config file layered over the user and workspace configuration.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// More diagnostics (repeatable).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only report errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a shell completion script.
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Print version and build information.
    Version,
}

/// Flags controlling a rendering run.
#[derive(Debug, Clone, Default, Args)]
pub struct RenderArgs {
    /// File holding the template variables (JSON or YAML).
    #[arg(long, value_name = "FILE")]
    pub vars_file: Option<PathBuf>,

    /// Directory containing the templates.
    #[arg(long, value_name = "DIR")]
    pub template_dir: Option<PathBuf>,

    /// Directory the rendered files are written to.
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Rewrite rendered paths with a regex, as PATTERN=REPLACEMENT (repeatable).
    #[arg(long, value_name = "PATTERN=REPLACEMENT", value_parser = parse_replace_arg)]
    pub replace: Vec<ReplaceRule>,

    /// What to do when a template references a missing variable.
    #[arg(long, value_enum, value_name = "POLICY")]
    pub missing_variable: Option<MissingVariablePolicy>,
}

impl Cli {
    /// Verbosity adjustment for the logging setup.
    pub fn verbosity(&self) -> i8 {
        if self.quiet {
            -1
        } else {
            self.verbose.min(i8::MAX as u8) as i8
        }
    }

    pub fn run(self) -> Result<()> {
        match self.command {
            Some(Commands::Completion { shell }) => {
                let mut command = Cli::command();
                clap_complete::generate(shell, &mut command, "parsedir", &mut io::stdout());
                Ok(())
            }
            Some(Commands::Version) => {
                println!("Version: {}", env!("CARGO_PKG_VERSION"));
                println!(
                    "BuiltOn: {}",
                    option_env!("PARSEDIR_BUILD_TIME").unwrap_or("<not-assigned>")
                );
                Ok(())
            }
            None => {
                let config = Config::load(self.config.as_deref())?;
                let options = self.render.into_options(config)?;
                let summary = generate(&options)?;
                for path in &summary.written {
                    println!("Generated file {}", path.display());
                }
                Ok(())
            }
        }
    }
}

impl RenderArgs {
    /// Combine flags with configuration; flags win, config replace rules run after flag rules.
    pub fn into_options(self, config: Config) -> Result<GenerateOptions> {
        let defaults = &config.defaults;
        let vars_file = self
            .vars_file
            .or_else(|| defaults.vars_file.clone())
            .ok_or_else(|| missing_flag("--vars-file", "vars_file"))?;
        let template_dir = self
            .template_dir
            .or_else(|| defaults.template_dir.clone())
            .ok_or_else(|| missing_flag("--template-dir", "template_dir"))?;
        let out_dir = self
            .out_dir
            .or_else(|| defaults.out_dir.clone())
            .ok_or_else(|| missing_flag("--out-dir", "out_dir"))?;
        let policy = self
            .missing_variable
            .unwrap_or_else(|| defaults.missing_variable());

        let mut replacements = self.replace;
        replacements.extend(config.replace.iter().cloned());

        Ok(GenerateOptions {
            vars_file,
            template_dir,
            out_dir,
            policy,
            replacements,
            config,
        })
    }
}

fn missing_flag(flag: &str, key: &str) -> anyhow::Error {
    anyhow!("missing required {flag} (or `{key}` under [defaults] in a config file)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_render_flags() {
        let cli = Cli::try_parse_from([
            "parsedir",
            "--vars-file",
            "vars.yaml",
            "--template-dir",
            "templates",
            "--out-dir",
            "out",
            "--replace",
            "_dot_=.",
            "--replace",
            "^x/=",
            "--missing-variable",
            "error",
        ])
        .unwrap();
        assert!(cli.command.is_none());
        let options = cli.render.into_options(Config::default()).unwrap();
        assert_eq!(options.vars_file, PathBuf::from("vars.yaml"));
        assert_eq!(options.policy, MissingVariablePolicy::Error);
        let patterns: Vec<_> = options.replacements.iter().map(|r| r.pattern.as_str()).collect();
        assert_eq!(patterns, vec!["_dot_", "^x/"]);
    }

    #[test]
    fn config_fills_missing_flags() {
        let mut config = Config::default();
        config.defaults.vars_file = Some("cfg-vars.json".into());
        config.defaults.template_dir = Some("cfg-templates".into());
        config.defaults.out_dir = Some("cfg-out".into());
        config.defaults.missing_variable = Some(MissingVariablePolicy::Off);

        let args = RenderArgs {
            out_dir: Some("flag-out".into()),
            ..RenderArgs::default()
        };
        let options = args.into_options(config).unwrap();
        assert_eq!(options.vars_file, PathBuf::from("cfg-vars.json"));
        assert_eq!(options.out_dir, PathBuf::from("flag-out"));
        assert_eq!(options.policy, MissingVariablePolicy::Off);
    }

    #[test]
    fn reports_missing_required_flags() {
        let err = RenderArgs::default()
            .into_options(Config::default())
            .unwrap_err();
        assert!(err.to_string().contains("--vars-file"));
    }

    #[test]
    fn quiet_and_verbose_adjust_verbosity() {
        let cli = Cli::try_parse_from(["parsedir", "-vv", "version"]).unwrap();
        assert_eq!(cli.verbosity(), 2);
        let cli = Cli::try_parse_from(["parsedir", "-q", "version"]).unwrap();
        assert_eq!(cli.verbosity(), -1);
    }
}
