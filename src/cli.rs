//! Command-line front end
//!
//! Reads captured command output, analyzes it and writes the JSON response
//! to stdout. Logs go to stderr.

use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::{Config, TemplateSource};
use crate::report::{analyze, Response};
use crate::template::{compile, TemplateDefinition, TemplateRegistry};

/// Run the analyzer with arguments from the command line
pub fn run() -> Result<()> {
    let config = Config::from_args_and_env()?;
    init_logging(&config.log_level);

    if let Some(path) = &config.project_config_path {
        log::debug!("Using project config {}", path.display());
    }

    let registry = TemplateRegistry::load(&config.template_dirs);

    if config.list_templates {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for name in registry.list_templates() {
            writeln!(out, "{}", name)?;
        }
        return Ok(());
    }

    let template = resolve_template(&config.template, &registry)?;
    let raw = read_input(config.input.as_deref())?;

    let response = analyze(&raw, &template, config.strict)
        .context("Failed to parse command output")?;
    write_response(&response, config.pretty)
}

fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Look up or compile the configured template
pub fn resolve_template(
    source: &TemplateSource,
    registry: &TemplateRegistry,
) -> Result<Arc<TemplateDefinition>> {
    match source {
        TemplateSource::File(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read template file: {}", path.display()))?;
            let definition = compile(&text)
                .with_context(|| format!("Failed to compile template: {}", path.display()))?;
            Ok(Arc::new(definition))
        }
        TemplateSource::Named(name) => registry.definition(name).with_context(|| {
            format!(
                "Unknown template '{}' (available: {})",
                name,
                registry.list_templates().join(", ")
            )
        }),
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input: {}", path.display())),
        None => {
            let mut raw = String::new();
            io::stdin()
                .read_to_string(&mut raw)
                .context("Failed to read input from stdin")?;
            Ok(raw)
        }
    }
}

fn write_response(response: &Response, pretty: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if pretty {
        serde_json::to_writer_pretty(&mut out, response)?;
    } else {
        serde_json::to_writer(&mut out, response)?;
    }
    writeln!(out)?;
    Ok(())
}
