use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::config::parse_by_extension;
use crate::error::{Result, ReviewError};
use crate::llm::prompts::{BUILTIN_TEMPLATES, CODE_PLACEHOLDER};

#[derive(Debug, Clone, Deserialize)]
struct TemplateEntry {
    prompt: String,
}

/// Review modes mapped to their prompt templates. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    templates: BTreeMap<String, String>,
}

impl TemplateStore {
    /// The modes shipped in `prompts/templates.toml`.
    pub fn builtin() -> Result<Self> {
        let entries: BTreeMap<String, TemplateEntry> = toml::from_str(BUILTIN_TEMPLATES)
            .map_err(|e| ReviewError::config("invalid built-in templates").with_source(e))?;
        Self::from_entries(entries)
    }

    /// Load modes from a TOML (or `.yaml`/`.yml`) file instead of the built-ins.
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).map_err(|e| {
            ReviewError::config(format!("failed to read template file {}", path.display()))
                .with_source(e)
        })?;
        let entries: BTreeMap<String, TemplateEntry> = parse_by_extension(path, &data)?;
        log::debug!("Loaded {} review mode(s) from {}", entries.len(), path.display());
        Self::from_entries(entries)
    }

    /// `--templates` if given, the built-ins otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_path(p),
            None => Self::builtin(),
        }
    }

    fn from_entries(entries: BTreeMap<String, TemplateEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(ReviewError::config("no review modes defined"));
        }

        let mut templates = BTreeMap::new();
        for (mode, entry) in entries {
            validate(&mode, &entry.prompt)?;
            templates.insert(mode, entry.prompt);
        }

        Ok(TemplateStore { templates })
    }

    /// The prompt template for `mode`.
    pub fn resolve(&self, mode: &str) -> Result<&str> {
        self.templates.get(mode).map(String::as_str).ok_or_else(|| {
            ReviewError::config(format!(
                "unknown review mode '{mode}' (available: {})",
                self.modes().join(", ")
            ))
        })
    }

    pub fn modes(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }
}

fn validate(mode: &str, prompt: &str) -> Result<()> {
    if prompt.trim().is_empty() {
        return Err(ReviewError::config(format!("template '{mode}' is empty")));
    }

    let slots = prompt.matches(CODE_PLACEHOLDER).count();
    if slots != 1 {
        return Err(ReviewError::config(format!(
            "template '{mode}' must contain {CODE_PLACEHOLDER} exactly once (found {slots})"
        )));
    }

    Ok(())
}

/// Put `code` into the template's placeholder.
pub fn render(template: &str, code: &str) -> String {
    template.replacen(CODE_PLACEHOLDER, code, 1)
}
