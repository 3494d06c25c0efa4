//! Circular dependency detection between components
//!
//! Components form an implicit directed graph: component A has an edge to B
//! when A's fragment contains a tag referencing B. Expanding a component
//! terminates only if no cycle is reachable from it.
//!
//! The traversal is a depth-first search over the *current path only*. Each
//! recursive step gets its own copy of the ancestor list, so a component
//! reached through one sibling branch is never mistaken for an ancestor of
//! another branch. A diamond (A uses B and C, B also uses C) is not a cycle.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

use tracing::{debug, trace};

use crate::error::DetectError;

use super::registry::ComponentRegistry;

/// Outcome of a cycle check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleResult {
    NoCycle,
    /// Component names from the first repeated ancestor to its reoccurrence
    Cycle(Vec<String>),
}

impl CycleResult {
    pub fn is_cycle(&self) -> bool {
        matches!(self, CycleResult::Cycle(_))
    }

    /// The offending chain, if any
    pub fn path(&self) -> Option<&[String]> {
        match self {
            CycleResult::Cycle(path) => Some(path),
            CycleResult::NoCycle => None,
        }
    }
}

impl fmt::Display for CycleResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleResult::NoCycle => write!(f, "no cycle"),
            CycleResult::Cycle(path) => write!(f, "{}", path.join(" --> ")),
        }
    }
}

/// Depth-first cycle detector over a component registry
///
/// A detector can be reused for several checks against the same registry;
/// fragments are read at most once and components already proven acyclic are
/// not explored again.
#[derive(Debug)]
pub struct CycleDetector<'r> {
    registry: &'r ComponentRegistry,
    /// Nested references per component, in file order
    references: HashMap<String, Vec<String>>,
    /// Components whose whole subgraph has been explored without finding a cycle
    settled: HashSet<String>,
}

impl<'r> CycleDetector<'r> {
    pub fn new(registry: &'r ComponentRegistry) -> Self {
        Self {
            registry,
            references: HashMap::new(),
            settled: HashSet::new(),
        }
    }

    /// Check everything reachable from a registered component
    pub fn check_component(&mut self, name: &str) -> Result<CycleResult, DetectError> {
        if !self.registry.contains(name) {
            return Err(DetectError::UnknownComponent {
                name: name.to_string(),
                referenced_by: "<root>".to_string(),
            });
        }
        self.visit(name, &[])
    }

    /// Check everything reachable from a file
    ///
    /// If the file is itself a registered component it is the root of the
    /// search. Otherwise (an ordinary page) it is an anonymous root: nothing
    /// can reference it, so it never takes part in the ancestor path.
    pub fn check_file(&mut self, path: &Path) -> Result<CycleResult, DetectError> {
        let registry = self.registry;
        if let Some(name) = registry.name_for_path(path) {
            debug!("Checking component '{}' from {}", name, path.display());
            return self.visit(name, &[]);
        }

        debug!("Checking page {}", path.display());
        let content = fs::read_to_string(path).map_err(|source| DetectError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let referenced_by = path.display().to_string();
        let nested = self.collect_references(&content, &referenced_by)?;

        for child in &nested {
            let result = self.visit(child, &[])?;
            if result.is_cycle() {
                return Ok(result);
            }
        }
        Ok(CycleResult::NoCycle)
    }

    /// Check every file directly inside `dir`, stopping at the first cycle
    ///
    /// Files are visited in name order. Subdirectories are not descended into.
    pub fn check_dir(&mut self, dir: &Path) -> Result<CycleResult, DetectError> {
        let read_err = |source| DetectError::Read {
            path: dir.to_path_buf(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(read_err)? {
            let entry = entry.map_err(read_err)?;
            if entry.file_type().map_err(read_err)?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();

        for file in files {
            let result = self.check_file(&file)?;
            if result.is_cycle() {
                return Ok(result);
            }
        }
        Ok(CycleResult::NoCycle)
    }

    /// Check every registered component, in name order
    pub fn check_all(&mut self) -> Result<CycleResult, DetectError> {
        let registry = self.registry;
        for name in registry.names() {
            let result = self.visit(name, &[])?;
            if result.is_cycle() {
                return Ok(result);
            }
        }
        Ok(CycleResult::NoCycle)
    }

    /// Enter `name` with the given ancestors
    ///
    /// `ancestors` is never mutated; the path extended with `name` is a fresh
    /// copy handed to each child in turn.
    fn visit(&mut self, name: &str, ancestors: &[String]) -> Result<CycleResult, DetectError> {
        if let Some(cycle) = find_cycle(ancestors, name) {
            return Ok(cycle);
        }
        if self.settled.contains(name) {
            trace!("'{}' already proven acyclic", name);
            return Ok(CycleResult::NoCycle);
        }

        let mut path = ancestors.to_vec();
        path.push(name.to_string());
        trace!("Visiting {}", path.join(" --> "));

        let nested = self.nested_references(name)?;
        if nested.is_empty() {
            self.settled.insert(name.to_string());
            return Ok(CycleResult::NoCycle);
        }

        // A direct back-reference is reported without descending further
        for child in &nested {
            if let Some(cycle) = find_cycle(&path, child) {
                return Ok(cycle);
            }
        }

        for child in &nested {
            let result = self.visit(child, &path)?;
            if result.is_cycle() {
                return Ok(result);
            }
        }

        self.settled.insert(name.to_string());
        Ok(CycleResult::NoCycle)
    }

    /// References made by a component's fragment, read once and cached
    fn nested_references(&mut self, name: &str) -> Result<Vec<String>, DetectError> {
        if let Some(cached) = self.references.get(name) {
            return Ok(cached.clone());
        }

        let path = self
            .registry
            .get(name)
            .ok_or_else(|| DetectError::UnknownComponent {
                name: name.to_string(),
                referenced_by: "<root>".to_string(),
            })?;
        let content = fs::read_to_string(path).map_err(|source| DetectError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let nested = self.collect_references(&content, name)?;
        self.references.insert(name.to_string(), nested.clone());
        Ok(nested)
    }

    /// Distinct component names referenced in `content`, in first-use order
    fn collect_references(
        &self,
        content: &str,
        referenced_by: &str,
    ) -> Result<Vec<String>, DetectError> {
        let mut names: Vec<String> = Vec::new();
        for reference in self.registry.syntax().scan(content) {
            if !self.registry.contains(&reference.component_name) {
                return Err(DetectError::UnknownComponent {
                    name: reference.component_name,
                    referenced_by: referenced_by.to_string(),
                });
            }
            if !names.contains(&reference.component_name) {
                names.push(reference.component_name);
            }
        }
        Ok(names)
    }
}

/// If `name` is already on `path`, the cycle from its first occurrence back to it
fn find_cycle(path: &[String], name: &str) -> Option<CycleResult> {
    let start = path.iter().position(|ancestor| ancestor == name)?;
    let mut chain = path[start..].to_vec();
    chain.push(name.to_string());
    Some(CycleResult::Cycle(chain))
}

/// Check everything reachable from `root`, a component fragment or a page
pub fn detect_cycle(root: &Path, registry: &ComponentRegistry) -> Result<CycleResult, DetectError> {
    CycleDetector::new(registry).check_file(root)
}

/// Check everything reachable from the component called `name`
pub fn detect_cycle_from(
    name: &str,
    registry: &ComponentRegistry,
) -> Result<CycleResult, DetectError> {
    CycleDetector::new(registry).check_component(name)
}

/// Check every file directly inside `dir`
pub fn detect_cycles_in_dir(
    dir: &Path,
    registry: &ComponentRegistry,
) -> Result<CycleResult, DetectError> {
    CycleDetector::new(registry).check_dir(dir)
}

/// Check every registered component
pub fn validate_registry(registry: &ComponentRegistry) -> Result<CycleResult, DetectError> {
    CycleDetector::new(registry).check_all()
}
