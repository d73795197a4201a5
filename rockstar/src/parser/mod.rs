//! Parser seam
//!
//! Rockstar's grammar lives outside this crate. Anything that turns source
//! text into a [`Program`] plugs in through [`Parse`]; [`JsonParser`] reads
//! a tree that an external parser has already serialized.

use crate::ast::Program;
use crate::error::ParseError;

/// Source text to syntax tree
pub trait Parse {
    fn parse(&self, source: &str) -> Result<Program, ParseError>;
}

impl<F> Parse for F
where
    F: Fn(&str) -> Result<Program, ParseError>,
{
    fn parse(&self, source: &str) -> Result<Program, ParseError> {
        self(source)
    }
}

/// Reads a JSON-serialized [`Program`]
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonParser;

impl Parse for JsonParser {
    fn parse(&self, source: &str) -> Result<Program, ParseError> {
        serde_json::from_str(source).map_err(|e| {
            let token = source
                .lines()
                .nth(e.line().saturating_sub(1))
                .and_then(|line| line.chars().nth(e.column().saturating_sub(1)))
                .map(String::from)
                .unwrap_or_default();
            ParseError::new(e.line(), e.column(), token, e.to_string())
        })
    }
}
