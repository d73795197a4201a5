//! Error types and reporting

use crate::config::ConfigError;
use crate::interp::RuntimeError;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, RockstarError>;

/// Anything that can stop a program from running to completion
#[derive(Debug, Error)]
pub enum RockstarError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Parse error reported by a parser, positioned by 1-based line and column
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Parse error at line {line}, column {column}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    /// Source text the parser stopped at, if any
    pub token: String,
    pub message: String,
}

impl ParseError {
    pub fn new(
        line: usize,
        column: usize,
        token: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ParseError {
            line,
            column,
            token: token.into(),
            message: message.into(),
        }
    }

    /// Render an ariadne report pointing at the error position
    pub fn render(&self, source: &str) -> String {
        use ariadne::{Config, Label, Report, ReportKind, Source};

        const FILENAME: &str = "program";
        let start = char_offset(source, self.line, self.column);
        let width = self.token.chars().count().max(1);
        let end = (start + width).min(source.chars().count()).max(start);
        let label = if self.token.is_empty() {
            self.message.clone()
        } else {
            format!("{} (at '{}')", self.message, self.token)
        };

        let mut out = Vec::new();
        let written = Report::build(ReportKind::Error, (FILENAME, start..end))
            .with_config(Config::default().with_color(false))
            .with_message("Parse error")
            .with_label(Label::new((FILENAME, start..end)).with_message(label))
            .finish()
            .write((FILENAME, Source::from(source)), &mut out);
        match written {
            Ok(()) => String::from_utf8_lossy(&out).into_owned(),
            Err(_) => format!("{self}\n"),
        }
    }
}

/// Character offset of a 1-based line and column, clamped to the source
fn char_offset(source: &str, line: usize, column: usize) -> usize {
    let mut offset = 0;
    for (number, text) in source.split_inclusive('\n').enumerate() {
        let length = text.chars().count();
        if number + 1 == line {
            return offset + column.saturating_sub(1).min(length);
        }
        offset += length;
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_display() {
        let err = ParseError::new(2, 5, "shout", "unexpected word");
        assert_eq!(
            err.to_string(),
            "Parse error at line 2, column 5: unexpected word"
        );
    }

    #[test]
    fn test_char_offset() {
        let source = "say 1\nsay 2\n";
        assert_eq!(char_offset(source, 1, 1), 0);
        assert_eq!(char_offset(source, 2, 5), 10);
        assert_eq!(char_offset(source, 9, 1), source.len());
    }

    #[test]
    fn test_render_mentions_message_and_token() {
        let source = "say 1\nshout 2\n";
        let report = ParseError::new(2, 1, "shout", "unexpected word").render(source);
        assert!(report.contains("Parse error"));
        assert!(report.contains("unexpected word (at 'shout')"));
        assert!(report.contains("shout 2"));
    }

    #[test]
    fn test_render_past_end_of_source() {
        let report = ParseError::new(5, 1, "", "unexpected end of input").render("say 1");
        assert!(report.contains("unexpected end of input"));
    }

    #[test]
    fn test_runtime_error_converts() {
        let err: RockstarError = RuntimeError::division_by_zero().into();
        assert!(matches!(err, RockstarError::Runtime(_)));
        assert_eq!(err.to_string(), "Runtime error: division by zero");
    }
}
