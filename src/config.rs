//! Configuration management for the interface analyzer.
//!
//! Handles:
//! - Command-line argument parsing
//! - Project configuration (`.ifdiag.toml`)
//! - Template directory discovery

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::template::SHOW_INTERFACES_TEMPLATE;

/// Project configuration file looked up in the working directory
pub const PROJECT_CONFIG_FILE: &str = ".ifdiag.toml";

/// Command-line arguments
#[derive(Debug, Default, Parser)]
#[command(name = "ifdiag")]
#[command(about = "Extract interface state from device CLI output and report anomalies")]
#[command(version)]
pub struct Args {
    /// Registered template to parse with
    #[arg(long, help = "Template name (e.g., 'cisco_ios_show_interfaces')")]
    pub template: Option<String>,

    /// Template file to compile instead of a registered template
    #[arg(long, conflicts_with = "template", help = "Path to a .textfsm template")]
    pub template_file: Option<PathBuf>,

    /// Extra template directories
    #[arg(long, help = "Directory containing .textfsm templates")]
    pub template_dir: Vec<PathBuf>,

    /// Captured command output; stdin when omitted
    #[arg(long, short, help = "File with captured command output (default: stdin)")]
    pub input: Option<PathBuf>,

    /// Fail on lines no rule matches
    #[arg(long)]
    pub strict: bool,

    /// Pretty-print the JSON response
    #[arg(long)]
    pub pretty: bool,

    /// Print the available template names and exit
    #[arg(long)]
    pub list_templates: bool,

    /// Log level
    #[arg(
        long,
        default_value = "info",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

/// Settings read from `.ifdiag.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    pub template: Option<String>,
    pub strict: Option<bool>,
    /// Relative paths resolve against the config file's directory
    pub template_dirs: Vec<PathBuf>,
}

impl ProjectConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read project config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse project config: {}", path.display()))
    }
}

/// Which template to parse with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Named(String),
    File(PathBuf),
}

/// Combined configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    pub template: TemplateSource,
    /// Template directories, user-global first
    pub template_dirs: Vec<PathBuf>,
    pub input: Option<PathBuf>,
    pub strict: bool,
    pub pretty: bool,
    pub list_templates: bool,
    pub log_level: String,
    /// Project config that contributed settings, if any
    pub project_config_path: Option<PathBuf>,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args_and_env() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Create configuration from explicit arguments, reading project config
    /// from the current directory
    pub fn from_args(args: Args) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        Self::from_args_in(args, &cwd)
    }

    /// Create configuration from explicit arguments and a project directory
    pub fn from_args_in(args: Args, project_dir: &Path) -> Result<Self> {
        let project_path = project_dir.join(PROJECT_CONFIG_FILE);
        let (project, project_config_path) = if project_path.is_file() {
            (ProjectConfig::load(&project_path)?, Some(project_path))
        } else {
            (ProjectConfig::default(), None)
        };

        let mut template_dirs = Vec::new();

        // Default user config directory
        if let Some(config_dir) = dirs::config_dir() {
            template_dirs.push(config_dir.join("ifdiag").join("templates"));
        }

        template_dirs.extend(project.template_dirs.iter().map(|dir| {
            if dir.is_absolute() {
                dir.clone()
            } else {
                project_dir.join(dir)
            }
        }));
        template_dirs.extend(args.template_dir);

        let template = match (args.template_file, args.template, project.template) {
            (Some(path), _, _) => TemplateSource::File(path),
            (None, Some(name), _) | (None, None, Some(name)) => TemplateSource::Named(name),
            (None, None, None) => TemplateSource::Named(SHOW_INTERFACES_TEMPLATE.to_string()),
        };

        Ok(Config {
            template,
            template_dirs,
            input: args.input,
            strict: args.strict || project.strict.unwrap_or(false),
            pretty: args.pretty,
            list_templates: args.list_templates,
            log_level: args.log_level,
            project_config_path,
        })
    }

    pub fn has_project_config(&self) -> bool {
        self.project_config_path.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> Args {
        Args {
            log_level: "info".to_string(),
            ..Args::default()
        }
    }

    #[test]
    fn test_defaults_without_project_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_args_in(args(), dir.path()).unwrap();

        assert!(!config.has_project_config());
        assert_eq!(
            config.template,
            TemplateSource::Named(SHOW_INTERFACES_TEMPLATE.to_string())
        );
        assert!(!config.strict);
    }

    #[test]
    fn test_cli_overrides_project_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(PROJECT_CONFIG_FILE),
            "template = \"from_project\"\nstrict = true\ntemplate_dirs = [\"tpl\"]\n",
        )
        .unwrap();

        let config = Config::from_args_in(args(), dir.path()).unwrap();
        assert!(config.has_project_config());
        assert_eq!(
            config.template,
            TemplateSource::Named("from_project".to_string())
        );
        assert!(config.strict);
        assert!(config.template_dirs.contains(&dir.path().join("tpl")));

        let mut cli = args();
        cli.template_file = Some(PathBuf::from("custom.textfsm"));
        let config = Config::from_args_in(cli, dir.path()).unwrap();
        assert_eq!(
            config.template,
            TemplateSource::File(PathBuf::from("custom.textfsm"))
        );
    }

    #[test]
    fn test_cli_template_dirs_come_last() {
        let dir = tempfile::tempdir().unwrap();
        let mut cli = args();
        cli.template_dir = vec![PathBuf::from("/opt/templates")];

        let config = Config::from_args_in(cli, dir.path()).unwrap();
        assert_eq!(
            config.template_dirs.last(),
            Some(&PathBuf::from("/opt/templates"))
        );
    }

    #[test]
    fn test_invalid_project_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(PROJECT_CONFIG_FILE), "templat = 1\n").unwrap();
        assert!(Config::from_args_in(args(), dir.path()).is_err());
    }
}
