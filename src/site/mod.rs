//! Whole-site build: validate components, then mirror the tree with tags substituted

mod walker;

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::component::{validate_registry, ComponentRegistry, CycleResult};
use crate::config::SiteConfig;
use crate::error::BuildError;
use crate::renderer::Renderer;

pub use walker::{collect_files, output_path, FileKind, SourceFile};

/// Summary of a finished build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Markup files rendered
    pub rendered: usize,
    /// Other files copied unchanged
    pub copied: usize,
}

/// Load the registry and build the site described by `config`
pub fn build(config: &SiteConfig) -> Result<BuildReport, BuildError> {
    let registry = config.load_registry()?;
    build_with_registry(config, &registry)
}

/// Build the site using an already loaded registry
///
/// Nothing is written for a file whose rendering fails, and the build stops
/// at the first failure.
pub fn build_with_registry(
    config: &SiteConfig,
    registry: &ComponentRegistry,
) -> Result<BuildReport, BuildError> {
    if config.validate {
        check(registry)?;
    }

    let renderer = Renderer::new(registry);
    let mut report = BuildReport::default();

    for file in collect_files(config)? {
        match file.kind {
            FileKind::Markup => {
                let content = if config.nested {
                    renderer.render_nested(&file.source)?
                } else {
                    renderer.render_file(&file.source)?
                };
                write(&file.destination, content.as_bytes())?;
                report.rendered += 1;
            }
            FileKind::Asset => {
                let bytes = fs::read(&file.source).map_err(|source| BuildError::Read {
                    path: file.source.clone(),
                    source,
                })?;
                write(&file.destination, &bytes)?;
                report.copied += 1;
            }
        }
        debug!("Wrote {}", file.destination.display());
    }

    info!(
        "Built {} into {} ({} rendered, {} copied)",
        config.base_dir.display(),
        config.output_dir.display(),
        report.rendered,
        report.copied
    );
    Ok(report)
}

/// Fail with [`BuildError::Cycle`] if any registered component is part of a cycle
pub fn check(registry: &ComponentRegistry) -> Result<(), BuildError> {
    match validate_registry(registry)? {
        CycleResult::NoCycle => {
            debug!("{} components validated, no cycles", registry.len());
            Ok(())
        }
        cycle => Err(BuildError::Cycle(cycle)),
    }
}

fn write(destination: &Path, bytes: &[u8]) -> Result<(), BuildError> {
    let write_err = |source| BuildError::Write {
        path: destination.to_path_buf(),
        source,
    };
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(destination, bytes).map_err(write_err)
}
