//! Parser error types.

use crate::Span;
use kompile_definition::DefinitionError;
use std::fmt;

/// A parse error with location information.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
    pub source_name: Option<String>,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            source_name: None,
        }
    }

    /// Tag the error with the name of the text it came from.
    pub fn in_source(mut self, source: impl Into<String>) -> Self {
        self.source_name = Some(source.into());
        self
    }

    pub fn unexpected_token(span: Span, expected: &str, found: &str) -> Self {
        Self::new(format!("expected {}, found {}", expected, found), span)
    }

    /// The parsed modules do not form a valid definition.
    pub fn definition(err: DefinitionError) -> Self {
        Self::new(err.to_string(), Span::default())
    }

    pub fn line(&self) -> usize {
        self.span.line
    }

    pub fn column(&self) -> usize {
        self.span.column
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source_name {
            write!(f, "{}: ", source)?;
        }
        write!(
            f,
            "Parse error at line {}, column {}: {}",
            self.span.line, self.span.column, self.message
        )
    }
}

impl std::error::Error for ParseError {}

impl From<DefinitionError> for ParseError {
    fn from(err: DefinitionError) -> Self {
        Self::definition(err)
    }
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;
