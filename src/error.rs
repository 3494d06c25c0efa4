//! Error types for configuration, rendering, cycle detection and site builds

use std::path::PathBuf;

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::component::CycleResult;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Errors that can occur while loading the component registry
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse config JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Neither `curvature.toml` nor `curvature-config.json` exists
    #[error("no config file found in {dir} (expected curvature.toml or curvature-config.json)")]
    NotFound { dir: PathBuf },

    /// The `components` mapping is absent
    #[error("\"components\" property missing in {path}")]
    MissingComponents { path: PathBuf },

    #[error("invalid component entry '{name}': {reason}")]
    InvalidEntry { name: String, reason: String },

    #[error("invalid tag prefix '{prefix}': {reason}")]
    InvalidPrefix { prefix: String, reason: String },
}

/// Errors that can occur while rendering a markup file
#[derive(Debug, Error)]
pub enum RenderError {
    /// A tag names a component that is not in the registry
    #[error("unknown component '{name}' referenced at {file}:{line}")]
    UnknownComponent {
        name: String,
        file: PathBuf,
        line: usize,
        span: Span,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Nested expansion was requested for a file whose components form a cycle
    #[error("circular component dependency in {file}: {cycle}")]
    Cycle { file: PathBuf, cycle: CycleResult },

    #[error(transparent)]
    Detect(#[from] DetectError),
}

impl RenderError {
    /// Format the error with source context using ariadne
    ///
    /// Only unknown-component errors carry a span; everything else falls back
    /// to the plain display form.
    pub fn format(&self, source: &str) -> String {
        let RenderError::UnknownComponent {
            name, file, span, ..
        } = self
        else {
            return self.to_string();
        };

        let filename = file.display().to_string();

        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename.as_str(), span.start)
            .with_message(format!("unknown component '{}'", name))
            .with_label(
                Label::new((filename.as_str(), span.clone()))
                    .with_message("not registered in the components mapping")
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename.as_str(), Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}

/// Errors that can occur during cycle detection
///
/// A detected cycle is not an error; it is reported as [`CycleResult::Cycle`].
#[derive(Debug, Error)]
pub enum DetectError {
    /// A nested reference names a component that is not in the registry
    #[error("unknown component '{name}' referenced by '{referenced_by}'")]
    UnknownComponent { name: String, referenced_by: String },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while building a site
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Detect(#[from] DetectError),

    /// The registry failed validation
    #[error("circular component dependency detected: {0}")]
    Cycle(CycleResult),

    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_component_display() {
        let err = RenderError::UnknownComponent {
            name: "navbar".to_string(),
            file: PathBuf::from("index.html"),
            line: 3,
            span: 4..40,
        };
        insta::assert_snapshot!(err.to_string(), @"unknown component 'navbar' referenced at index.html:3");
    }

    #[test]
    fn test_missing_components_display() {
        let err = ConfigError::MissingComponents {
            path: PathBuf::from("site/curvature.toml"),
        };
        insta::assert_snapshot!(err.to_string(), @r#""components" property missing in site/curvature.toml"#);
    }

    #[test]
    fn test_format_with_source_context() {
        let source = "<body>\n    <curvature-navbar></curvature-navbar>\n</body>\n";
        let start = source.find("<curvature").unwrap();
        let end = source.find("\n</body>").unwrap();
        let err = RenderError::UnknownComponent {
            name: "navbar".to_string(),
            file: PathBuf::from("index.html"),
            line: 2,
            span: start..end,
        };
        let formatted = err.format(source);
        assert!(formatted.contains("unknown component 'navbar'"));
        assert!(formatted.contains("index.html"));
    }

    #[test]
    fn test_format_falls_back_to_display() {
        let err = RenderError::Read {
            path: PathBuf::from("missing.html"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.format(""), err.to_string());
    }
}
