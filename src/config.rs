//! Site layout and component registry configuration
//!
//! A site is a base directory holding pages, a `components/` directory of
//! fragments and a registry file naming them. The registry is TOML:
//!
//! ```toml
//! prefix = "curvature"   # optional
//!
//! [components]
//! navbar = "navbar.html"
//! footer = "layout/footer.html"
//! ```
//!
//! The older JSON form `{"components": {"navbar": "navbar.html"}}` in
//! `curvature-config.json` is still accepted.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::component::{ComponentRegistry, TagSyntax};
use crate::error::ConfigError;

/// Registry file looked up first
pub const CONFIG_TOML: &str = "curvature.toml";
/// Legacy registry file
pub const CONFIG_JSON: &str = "curvature-config.json";
/// Directory holding component fragments, relative to the base
pub const COMPONENTS_DIR: &str = "components";
/// Default output directory, relative to the base
pub const OUTPUT_DIR: &str = "curvature-output";

/// Where a site lives and how it should be built
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Root of the source tree
    pub base_dir: PathBuf,
    /// Directory component paths are resolved against
    pub components_dir: PathBuf,
    /// Mirror of the source tree with components substituted
    pub output_dir: PathBuf,
    /// Explicit registry file; discovered in `base_dir` when unset
    pub config_file: Option<PathBuf>,
    /// Tag prefix overriding the registry file's
    pub prefix: Option<String>,
    /// Run the cycle check over all components before building
    pub validate: bool,
    /// Expand components referenced from inside other components
    pub nested: bool,
}

/// On-disk shape of the registry file
#[derive(Debug, Deserialize)]
struct RegistryFile {
    prefix: Option<String>,
    components: Option<BTreeMap<String, String>>,
}

impl SiteConfig {
    /// Create a configuration with the conventional layout under `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        let base_dir = std::path::absolute(&base_dir).unwrap_or(base_dir);
        Self {
            components_dir: base_dir.join(COMPONENTS_DIR),
            output_dir: base_dir.join(OUTPUT_DIR),
            base_dir,
            config_file: None,
            prefix: None,
            validate: true,
            nested: false,
        }
    }

    /// Set the output directory
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.output_dir = std::path::absolute(&dir).unwrap_or(dir);
        self
    }

    /// Use a specific registry file instead of discovering one
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.config_file = Some(std::path::absolute(&path).unwrap_or(path));
        self
    }

    /// Override the tag prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Enable or disable the cycle check before building
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Enable or disable nested expansion
    pub fn with_nested(mut self, nested: bool) -> Self {
        self.nested = nested;
        self
    }

    /// The registry file in use
    pub fn config_file_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.config_file {
            return Ok(path.clone());
        }
        [CONFIG_TOML, CONFIG_JSON]
            .iter()
            .map(|name| self.base_dir.join(name))
            .find(|path| path.is_file())
            .ok_or_else(|| ConfigError::NotFound {
                dir: self.base_dir.clone(),
            })
    }

    /// Load the component registry described by this configuration
    pub fn load_registry(&self) -> Result<ComponentRegistry, ConfigError> {
        let path = self.config_file_path()?;
        debug!("Loading component registry from {}", path.display());

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let file = parse_registry_file(&content, &path)?;

        let components = file
            .components
            .ok_or_else(|| ConfigError::MissingComponents { path: path.clone() })?;

        let prefix = self
            .prefix
            .clone()
            .or(file.prefix)
            .map(TagSyntax::new)
            .transpose()?
            .unwrap_or_default();

        let registry = ComponentRegistry::from_entries(&self.components_dir, components, prefix)?;
        debug!(
            "Registered {} components with prefix '{}'",
            registry.len(),
            registry.syntax().prefix()
        );
        Ok(registry)
    }
}

fn parse_registry_file(content: &str, path: &Path) -> Result<RegistryFile, ConfigError> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    } else {
        toml::from_str(content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }
}
