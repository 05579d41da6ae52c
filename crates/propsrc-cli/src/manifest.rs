//! TOML manifest describing which sources to load and where they rank

use anyhow::{Context, Result};
use propsrc_core::{load_source, EnvironmentPropertySource, Position, PropertySources};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Manifest file contents
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Manifest {
    /// Register the process environment before any file source
    #[serde(default)]
    pub(crate) include_env: bool,

    #[serde(default, rename = "source")]
    pub(crate) sources: Vec<SourceEntry>,
}

/// One `[[source]]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SourceEntry {
    pub(crate) name: String,
    pub(crate) path: PathBuf,
    #[serde(default)]
    pub(crate) position: Position,
}

impl Manifest {
    /// Read and parse a manifest file
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid manifest {}", path.display()))
    }

    pub(crate) fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load every listed source, resolving relative paths against `base_dir`
    pub(crate) fn assemble(&self, base_dir: &Path) -> Result<PropertySources> {
        let mut sources = PropertySources::new();
        if self.include_env {
            sources.add_last(Arc::new(EnvironmentPropertySource::capture()));
        }

        for entry in &self.sources {
            let path = if entry.path.is_absolute() {
                entry.path.clone()
            } else {
                base_dir.join(&entry.path)
            };
            let source = load_source(entry.name.clone(), &path)
                .with_context(|| format!("failed to load source '{}'", entry.name))?;
            tracing::debug!(name = %entry.name, path = %path.display(), position = ?entry.position, "adding source");
            sources
                .insert_at(&entry.position, Arc::new(source))
                .with_context(|| format!("cannot place source '{}'", entry.name))?;
        }
        Ok(sources)
    }
}
