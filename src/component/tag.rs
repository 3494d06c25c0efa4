//! Line-level parser for component reference tags
//!
//! Two forms are recognized, both of which must sit on a single line:
//!
//! ```text
//! <curvature-navbar></curvature-navbar>
//! <curvature-navbar/>
//! ```
//!
//! A tag whose opening and closing halves are on different lines is not a tag.
//! Indentation is the run of ASCII spaces at the start of the line; tabs are
//! not counted.

use crate::error::{ConfigError, Span};

/// Prefix used when the configuration does not name one
pub const DEFAULT_PREFIX: &str = "curvature";

/// Which of the two tag forms was matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagForm {
    /// `<prefix-name></prefix-name>`
    Paired,
    /// `<prefix-name/>`
    SelfClosing,
}

/// A tag found within a single line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag<'a> {
    pub name: &'a str,
    /// Byte range of the whole tag within the line
    pub span: Span,
    pub form: TagForm,
}

/// A component use extracted from one line of source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagReference {
    pub component_name: String,
    /// Spaces preceding the tag's line, used to re-indent the fragment
    pub leading_whitespace: String,
    pub source_line: String,
    /// 1-based line number
    pub line_number: usize,
    /// Byte range of the tag within the whole source text
    pub span: Span,
}

/// The tag grammar for one run, parameterized by its prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSyntax {
    prefix: String,
    open: String,
}

impl Default for TagSyntax {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            open: format!("<{}-", DEFAULT_PREFIX),
        }
    }
}

impl TagSyntax {
    /// Create a syntax for the given prefix
    pub fn new(prefix: impl Into<String>) -> Result<Self, ConfigError> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(ConfigError::InvalidPrefix {
                prefix,
                reason: "prefix must not be empty".to_string(),
            });
        }
        if let Some(c) = prefix
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(ConfigError::InvalidPrefix {
                reason: format!("unexpected character '{}'", c),
                prefix,
            });
        }

        let open = format!("<{}-", prefix);
        Ok(Self { prefix, open })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Find the first complete tag on a line
    pub fn find_in_line<'a>(&self, line: &'a str) -> Option<Tag<'a>> {
        self.tags_in_line(line).next()
    }

    /// Iterate over every complete tag on a line, left to right
    pub fn tags_in_line<'s, 'a>(&'s self, line: &'a str) -> impl Iterator<Item = Tag<'a>> + 's
    where
        'a: 's,
    {
        line.match_indices(self.open.as_str())
            .filter_map(move |(start, _)| self.parse_at(line, start))
    }

    /// Collect every reference in a block of text, in source order
    pub fn scan(&self, content: &str) -> Vec<TagReference> {
        let mut refs = Vec::new();
        let mut offset = 0;

        for (index, raw) in content.split('\n').enumerate() {
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            for tag in self.tags_in_line(line) {
                refs.push(TagReference {
                    component_name: tag.name.to_string(),
                    leading_whitespace: leading_spaces(line).to_string(),
                    source_line: line.to_string(),
                    line_number: index + 1,
                    span: offset + tag.span.start..offset + tag.span.end,
                });
            }
            offset += raw.len() + 1;
        }

        refs
    }

    /// Try to parse a tag starting at byte `start`, which must begin with the open marker
    fn parse_at<'a>(&self, line: &'a str, start: usize) -> Option<Tag<'a>> {
        let after_open = start + self.open.len();
        let rest = &line[after_open..];

        let name_len = rest
            .find(|c: char| !is_name_char(c))
            .unwrap_or(rest.len());
        if name_len == 0 {
            return None;
        }
        let name = &rest[..name_len];
        let tail = &rest[name_len..];

        let trimmed = tail.trim_start_matches(' ');
        if trimmed.starts_with("/>") {
            let end = line.len() - trimmed.len() + 2;
            return Some(Tag {
                name,
                span: start..end,
                form: TagForm::SelfClosing,
            });
        }

        let close = format!("></{}-{}>", self.prefix, name);
        if tail.starts_with(&close) {
            let end = after_open + name_len + close.len();
            return Some(Tag {
                name,
                span: start..end,
                form: TagForm::Paired,
            });
        }

        None
    }
}

/// The run of ASCII spaces at the start of a line
pub fn leading_spaces(line: &str) -> &str {
    let end = line.find(|c: char| c != ' ').unwrap_or(line.len());
    &line[..end]
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}
