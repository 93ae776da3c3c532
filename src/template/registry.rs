//! Template Registry
//!
//! Compiled templates by name. The embedded Cisco IOS template is always
//! present; template directories can add to it or override it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use super::compiler::compile;
use super::schema::TemplateDefinition;

/// Name of the embedded `show interfaces` template
pub const SHOW_INTERFACES_TEMPLATE: &str = "cisco_ios_show_interfaces";

/// File extension of on-disk templates
pub const TEMPLATE_EXTENSION: &str = "textfsm";

const EMBEDDED_SHOW_INTERFACES: &str =
    include_str!("../../resources/templates/cisco_ios_show_interfaces.textfsm");

/// Where a template came from. Later sources override earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TemplatePriority {
    BuiltIn = 0,
    UserGlobal = 1,
    Workspace = 2,
}

/// A compiled template with its source and priority
#[derive(Debug, Clone)]
pub struct LoadedTemplate {
    pub definition: Arc<TemplateDefinition>,
    pub priority: TemplatePriority,
    pub source_path: Option<PathBuf>,
}

/// In-memory template registry
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, LoadedTemplate>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding only the embedded templates
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.add_builtin_templates();
        registry
    }

    /// Registry holding the embedded templates plus every directory in
    /// `dirs`. The first directory loads as user-global, the rest as
    /// workspace templates.
    pub fn load(dirs: &[PathBuf]) -> Self {
        let mut registry = Self::with_builtin();

        for (i, dir) in dirs.iter().enumerate() {
            let priority = if i == 0 {
                TemplatePriority::UserGlobal
            } else {
                TemplatePriority::Workspace
            };
            if let Err(e) = registry.load_directory(dir, priority) {
                log::warn!("{:#}", e);
            }
        }

        log::debug!("loaded {} templates", registry.templates.len());
        registry
    }

    /// Add the templates compiled into the binary
    pub fn add_builtin_templates(&mut self) {
        match compile(EMBEDDED_SHOW_INTERFACES) {
            Ok(definition) => {
                self.insert(
                    SHOW_INTERFACES_TEMPLATE,
                    LoadedTemplate {
                        definition: Arc::new(definition),
                        priority: TemplatePriority::BuiltIn,
                        source_path: None,
                    },
                );
            }
            Err(e) => {
                log::error!(
                    "embedded template '{}' failed to compile: {}",
                    SHOW_INTERFACES_TEMPLATE,
                    e
                );
            }
        }
    }

    /// Load every `*.textfsm` file in `dir`. Files that fail to read or
    /// compile are logged and skipped.
    pub fn load_directory(&mut self, dir: &Path, priority: TemplatePriority) -> Result<usize> {
        if !dir.exists() {
            return Ok(0);
        }

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read template directory: {}", dir.display()))?
        {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) == Some(TEMPLATE_EXTENSION) {
                paths.push(path);
            }
        }
        // Directory order is platform dependent
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            match self.load_file(&path, priority) {
                Ok(()) => loaded += 1,
                Err(e) => log::warn!("Skipping template {}: {:#}", path.display(), e),
            }
        }

        Ok(loaded)
    }

    /// Compile and register a single template file under its file stem
    pub fn load_file(&mut self, path: &Path, priority: TemplatePriority) -> Result<()> {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .with_context(|| format!("Template path has no usable name: {}", path.display()))?;

        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read template file: {}", path.display()))?;
        let definition = compile(&source)
            .with_context(|| format!("Failed to compile template: {}", path.display()))?;

        self.insert(
            name,
            LoadedTemplate {
                definition: Arc::new(definition),
                priority,
                source_path: Some(path.to_path_buf()),
            },
        );
        Ok(())
    }

    /// Register a template unless a higher-priority one already holds the name
    pub fn insert(&mut self, name: &str, template: LoadedTemplate) -> bool {
        let should_load = match self.templates.get(name) {
            Some(existing) => template.priority >= existing.priority,
            None => true,
        };

        if should_load {
            self.templates.insert(name.to_string(), template);
        }
        should_load
    }

    pub fn get(&self, name: &str) -> Option<&LoadedTemplate> {
        self.templates.get(name)
    }

    /// Shared handle to a compiled template
    pub fn definition(&self, name: &str) -> Option<Arc<TemplateDefinition>> {
        self.templates.get(name).map(|t| t.definition.clone())
    }

    /// Template names, sorted
    pub fn list_templates(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}
