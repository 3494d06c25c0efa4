//! Tag renderer that substitutes component references in markup files
//!
//! Rendering works line by line. A line holding a complete tag is replaced by
//! the referenced fragment, with every fragment line prefixed by the spaces
//! that started the original line. All other lines are copied byte for byte.
//!
//! Known limitations, kept on purpose:
//! - only the first tag on a line is expanded and the rest of that line is dropped
//! - a tag split across two lines is not recognized and passes through as-is
//! - tab indentation is not carried over to the fragment

mod lines;

use std::fs;
use std::path::Path;

use tracing::{debug, trace};

use crate::component::{leading_spaces, ComponentRegistry, CycleDetector};
use crate::error::RenderError;

pub use lines::{split_terminator, LineEnding};

/// Renders markup files against a component registry
///
/// One call expands a single level of references. Tags appearing inside a
/// substituted fragment are left as they are; [`Renderer::render_nested`]
/// repeats the pass until no tags remain.
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'r> {
    registry: &'r ComponentRegistry,
}

impl<'r> Renderer<'r> {
    pub fn new(registry: &'r ComponentRegistry) -> Self {
        Self { registry }
    }

    /// Read `path` and expand one level of component references
    pub fn render_file(&self, path: &Path) -> Result<String, RenderError> {
        let content = read(path)?;
        self.render_str(&content, path)
    }

    /// Expand one level of component references in `content`
    ///
    /// `file` is only used for diagnostics.
    pub fn render_str(&self, content: &str, file: &Path) -> Result<String, RenderError> {
        let syntax = self.registry.syntax();
        let newline = LineEnding::detect(content).as_str();
        let mut output = String::with_capacity(content.len());
        let mut offset = 0;

        for (index, raw) in content.split_inclusive('\n').enumerate() {
            let (line, ending) = split_terminator(raw);

            let Some(tag) = syntax.find_in_line(line) else {
                output.push_str(raw);
                offset += raw.len();
                continue;
            };

            let fragment_path =
                self.registry
                    .get(tag.name)
                    .ok_or_else(|| RenderError::UnknownComponent {
                        name: tag.name.to_string(),
                        file: file.to_path_buf(),
                        line: index + 1,
                        span: offset + tag.span.start..offset + tag.span.end,
                    })?;
            trace!("{}:{} -> {}", file.display(), index + 1, tag.name);
            let fragment = read(fragment_path)?;

            let indent = leading_spaces(line);
            let separator = if ending.is_empty() { newline } else { ending };
            for (i, fragment_line) in fragment.lines().enumerate() {
                if i > 0 {
                    output.push_str(separator);
                }
                output.push_str(indent);
                output.push_str(fragment_line);
            }
            output.push_str(ending);
            offset += raw.len();
        }

        Ok(output)
    }

    /// Expand references repeatedly until none remain
    ///
    /// The file is checked for circular dependencies first, so the expansion
    /// is known to terminate.
    pub fn render_nested(&self, path: &Path) -> Result<String, RenderError> {
        let result = CycleDetector::new(self.registry).check_file(path)?;
        if result.is_cycle() {
            return Err(RenderError::Cycle {
                file: path.to_path_buf(),
                cycle: result,
            });
        }

        let syntax = self.registry.syntax();
        let mut content = read(path)?;
        let mut depth = 0;
        while depth <= self.registry.len() && !syntax.scan(&content).is_empty() {
            content = self.render_str(&content, path)?;
            depth += 1;
        }
        debug!("Expanded {} over {} passes", path.display(), depth);
        Ok(content)
    }
}

/// Expand one level of component references in the file at `path`
pub fn render_file(path: &Path, registry: &ComponentRegistry) -> Result<String, RenderError> {
    Renderer::new(registry).render_file(path)
}

fn read(path: &Path) -> Result<String, RenderError> {
    fs::read_to_string(path).map_err(|source| RenderError::Read {
        path: path.to_path_buf(),
        source,
    })
}
