//! Component registry mapping component names to fragment files

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::tag::TagSyntax;

/// Immutable lookup table of every known component
///
/// Built once from configuration and then shared by reference for the rest of
/// the run. Names iterate in sorted order so validation passes are
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    components: BTreeMap<String, PathBuf>,
    syntax: TagSyntax,
}

impl ComponentRegistry {
    /// Create a new empty registry using the default tag prefix
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty registry with a specific tag syntax
    pub fn with_syntax(syntax: TagSyntax) -> Self {
        Self {
            components: BTreeMap::new(),
            syntax,
        }
    }

    /// Build a registry from `name -> relative path` entries resolved against `components_dir`
    pub fn from_entries<I>(
        components_dir: &Path,
        entries: I,
        syntax: TagSyntax,
    ) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut registry = Self::with_syntax(syntax);
        for (name, relative) in entries {
            if relative.trim().is_empty() {
                return Err(ConfigError::InvalidEntry {
                    name,
                    reason: "template path must not be empty".to_string(),
                });
            }
            let path = components_dir.join(relative);
            registry.register(name, path)?;
        }
        Ok(registry)
    }

    /// Register a component
    pub fn register(
        &mut self,
        name: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Result<(), ConfigError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ConfigError::InvalidEntry {
                name,
                reason: "component name must not be empty".to_string(),
            });
        }
        if self.components.contains_key(&name) {
            return Err(ConfigError::InvalidEntry {
                name,
                reason: "duplicate component definition".to_string(),
            });
        }
        self.components.insert(name, path.into());
        Ok(())
    }

    /// Get the fragment path for a component
    pub fn get(&self, name: &str) -> Option<&Path> {
        self.components.get(name).map(PathBuf::as_path)
    }

    /// Check if a component exists
    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    /// All component names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// The tag grammar components are referenced with
    pub fn syntax(&self) -> &TagSyntax {
        &self.syntax
    }

    /// Reverse lookup: find the component whose fragment lives at `path`
    ///
    /// Both sides are canonicalized when possible so that `./a/../b.html` and
    /// `b.html` compare equal.
    pub fn name_for_path(&self, path: &Path) -> Option<&str> {
        let wanted = normalize(path);
        self.components
            .iter()
            .find(|(_, candidate)| normalize(candidate) == wanted)
            .map(|(name, _)| name.as_str())
    }
}

fn normalize(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
