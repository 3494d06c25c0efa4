//! Curvature - a static HTML component preprocessor
//!
//! Curvature walks a source tree, replaces component tags in markup files
//! with the contents of registered fragment files, and writes the result to a
//! mirrored output tree. Before rendering, the component set can be checked
//! for circular references so that expansion is known to terminate.
//!
//! # Example
//!
//! ```rust
//! use std::path::Path;
//! use curvature::{ComponentRegistry, Renderer};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let nav = dir.path().join("nav.html");
//! std::fs::write(&nav, "<a href=\"/\">Home</a>\n<a href=\"/blog\">Blog</a>\n").unwrap();
//!
//! let mut registry = ComponentRegistry::new();
//! registry.register("nav", nav).unwrap();
//!
//! let page = "<nav>\n  <curvature-nav></curvature-nav>\n</nav>\n";
//! let html = Renderer::new(&registry)
//!     .render_str(page, Path::new("index.html"))
//!     .unwrap();
//!
//! assert_eq!(
//!     html,
//!     "<nav>\n  <a href=\"/\">Home</a>\n  <a href=\"/blog\">Blog</a>\n</nav>\n"
//! );
//! ```

pub mod component;
pub mod config;
pub mod error;
pub mod renderer;
pub mod site;

pub use component::{
    detect_cycle, detect_cycle_from, detect_cycles_in_dir, validate_registry, ComponentRegistry,
    CycleDetector, CycleResult, TagReference, TagSyntax,
};
pub use config::SiteConfig;
pub use error::{BuildError, ConfigError, DetectError, RenderError};
pub use renderer::{render_file, Renderer};
pub use site::{build, build_with_registry, check, BuildReport};

use thiserror::Error;

/// Any error the preprocessor can produce
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Detect(#[from] DetectError),

    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Check the component set under `base_dir` for circular references
///
/// Loads the registry with the conventional layout and validates every
/// registered component.
///
/// # Example
///
/// ```rust
/// let dir = tempfile::tempdir().unwrap();
/// std::fs::create_dir(dir.path().join("components")).unwrap();
/// std::fs::write(dir.path().join("components/a.html"), "<curvature-b/>").unwrap();
/// std::fs::write(dir.path().join("components/b.html"), "<curvature-a/>").unwrap();
/// std::fs::write(
///     dir.path().join("curvature.toml"),
///     "[components]\na = \"a.html\"\nb = \"b.html\"\n",
/// )
/// .unwrap();
///
/// let result = curvature::check_site(dir.path()).unwrap();
/// assert_eq!(result.to_string(), "a --> b --> a");
/// ```
pub fn check_site(base_dir: impl Into<std::path::PathBuf>) -> Result<CycleResult, Error> {
    let registry = SiteConfig::new(base_dir).load_registry()?;
    Ok(validate_registry(&registry)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_check_site_without_cycles() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("components")).unwrap();
        fs::write(dir.path().join("components/a.html"), "<p>a</p>").unwrap();
        fs::write(dir.path().join("curvature.toml"), "[components]\na = \"a.html\"\n").unwrap();

        assert_eq!(check_site(dir.path()).unwrap(), CycleResult::NoCycle);
    }

    #[test]
    fn test_check_site_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            check_site(dir.path()),
            Err(Error::Config(ConfigError::NotFound { .. }))
        ));
    }
}
