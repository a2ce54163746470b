//! Kompile Parser
//!
//! This crate provides parsing for KAST-style definition text:
//! - Modules with imports and sentences (syntax, rule, context, configuration)
//! - Prefix-application terms with cells, rewrites, sequences and casts
//! - Attribute lists
//! - Error handling with location information

mod error;
mod lexer;
mod parser;
mod span;

pub use error::*;
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{parse_definition, parse_module, parse_modules, parse_rule, parse_term, Parser};
pub use span::Span;
