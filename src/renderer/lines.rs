//! Line splitting that keeps each line's own terminator

/// Line separator used by a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    /// Guess the separator from the first line break in `content`
    pub fn detect(content: &str) -> Self {
        match content.find('\n') {
            Some(i) if i > 0 && content.as_bytes()[i - 1] == b'\r' => LineEnding::CrLf,
            _ => LineEnding::Lf,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// Split one raw line (as produced by `split_inclusive('\n')`) into text and terminator
pub fn split_terminator(raw: &str) -> (&str, &str) {
    if let Some(text) = raw.strip_suffix("\r\n") {
        (text, &raw[text.len()..])
    } else if let Some(text) = raw.strip_suffix('\n') {
        (text, &raw[text.len()..])
    } else {
        (raw, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        assert_eq!(LineEnding::detect("a\nb"), LineEnding::Lf);
        assert_eq!(LineEnding::detect("a\r\nb"), LineEnding::CrLf);
        assert_eq!(LineEnding::detect("single line"), LineEnding::Lf);
        assert_eq!(LineEnding::detect("\n"), LineEnding::Lf);
    }

    #[test]
    fn test_split_terminator() {
        assert_eq!(split_terminator("abc\r\n"), ("abc", "\r\n"));
        assert_eq!(split_terminator("abc\n"), ("abc", "\n"));
        assert_eq!(split_terminator("abc"), ("abc", ""));
        assert_eq!(split_terminator("\n"), ("", "\n"));
    }
}
