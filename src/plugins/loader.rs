use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};

use super::OperatorPlugin;

/// The file suffix of plugin manifests.
pub const MANIFEST_SUFFIX: &str = ".plugin.json";

/// Finds and instantiates plugin modules. Failures are per candidate.
pub trait PluginLoader: Send + Sync {
    /// The loadable candidates in a directory.
    fn candidates(&self, dir: &Path) -> Result<Vec<PathBuf>>;

    /// Instantiates every plugin a candidate provides.
    fn load(&self, candidate: &Path) -> Result<Vec<Box<dyn OperatorPlugin>>>;
}

/// A zero argument constructor of a plugin.
pub type PluginFactory = fn() -> Box<dyn OperatorPlugin>;

/// The plugin implementations a process can instantiate, by name.
#[derive(Default, Clone)]
pub struct PluginCatalog {
    factories: BTreeMap<String, PluginFactory>,
}

impl PluginCatalog {
    /// An empty catalog.
    pub fn new() -> PluginCatalog {
        PluginCatalog::default()
    }

    /// Adds a factory under `name`.
    pub fn with(mut self, name: &str, factory: PluginFactory) -> PluginCatalog {
        self.factories.insert(name.to_owned(), factory);
        self
    }

    /// The factory for `name`.
    pub fn get(&self, name: &str) -> Option<PluginFactory> {
        self.factories.get(name).copied()
    }

    /// Every known plugin name.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(|k| k.as_str())
    }
}

/// The contents of a `*.plugin.json` file: a module name and the plugins it provides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginManifest {
    /// The module the plugins come from.
    pub module: String,
    /// The plugins to instantiate.
    pub plugins: Vec<String>,
}

/// Loads plugins described by manifest files, instantiating them from a [PluginCatalog].
pub struct ManifestLoader {
    catalog: PluginCatalog,
}

impl ManifestLoader {
    /// A loader instantiating plugins from `catalog`.
    pub fn new(catalog: PluginCatalog) -> ManifestLoader {
        ManifestLoader { catalog }
    }

    fn read_manifest(candidate: &Path) -> Result<PluginManifest> {
        let text = fs::read_to_string(candidate)
            .with_context(|| format!("reading {}", candidate.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", candidate.display()))
    }
}

impl PluginLoader for ManifestLoader {
    fn candidates(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        for entry in
            fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))?
        {
            let path = entry?.path();
            let is_manifest = path
                .file_name()
                .and_then(|n| n.to_str())
                .map_or(false, |n| n.ends_with(MANIFEST_SUFFIX));
            if is_manifest && path.is_file() {
                found.push(path);
            }
        }
        found.sort();
        debug!("{} plugin manifests in {}", found.len(), dir.display());
        Ok(found)
    }

    fn load(&self, candidate: &Path) -> Result<Vec<Box<dyn OperatorPlugin>>> {
        let manifest = Self::read_manifest(candidate)?;
        manifest
            .plugins
            .iter()
            .map(|name| {
                self.catalog
                    .get(name)
                    .map(|factory| factory())
                    .ok_or_else(|| anyhow!("module {} has no plugin {}", manifest.module, name))
            })
            .collect()
    }
}
