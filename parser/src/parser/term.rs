//! Term parsing.
//!
//! Precedence, loosest first: `=>`, `~>`, juxtaposition, `:` casts.

use super::module::is_sort_name;
use super::Parser;
use crate::error::{ParseError, ParseResult};
use crate::lexer::TokenKind;
use kompile_core::{Attributes, Sort};
use kompile_definition::{labels, Cell, Term};

/// Variables start with an uppercase letter or `_`, or carry one of the
/// `!`, `?`, `$` prefixes. An uppercase name applied to arguments, as in
/// `ListItem(X)`, is a label.
fn is_variable_name(name: &str) -> bool {
    match name.chars().next() {
        Some(c) if c.is_uppercase() || c == '_' => true,
        Some(labels::FRESH_PREFIX) | Some(labels::EXISTENTIAL_PREFIX) | Some(labels::CONFIG_VAR_PREFIX) => true,
        _ => false,
    }
}

impl Parser {
    /// Parse a full term.
    pub fn parse_term(&mut self) -> ParseResult<Term> {
        let lhs = self.parse_sequence()?;
        if self.eat(&TokenKind::Arrow) {
            let rhs = self.parse_sequence()?;
            return Ok(Term::rewrite(lhs, rhs));
        }
        Ok(lhs)
    }

    fn parse_sequence(&mut self) -> ParseResult<Term> {
        let first = self.parse_juxtaposition()?;
        if !self.check(&TokenKind::Then) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&TokenKind::Then) {
            items.push(self.parse_juxtaposition()?);
        }
        Ok(Term::sequence(items))
    }

    fn parse_juxtaposition(&mut self) -> ParseResult<Term> {
        let first = self.parse_cast()?;
        if !self.peek().kind.starts_term() {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.peek().kind.starts_term() {
            items.push(self.parse_cast()?);
        }
        Ok(Term::Bag(items))
    }

    fn parse_cast(&mut self) -> ParseResult<Term> {
        let mut term = self.parse_primary()?;
        while self.eat(&TokenKind::Colon) {
            let span = self.current_span();
            let sort = self.expect_ident()?;
            if !is_sort_name(&sort) {
                return Err(ParseError::new(format!("'{}' is not a sort name", sort), span));
            }
            term = Term::apply(labels::semantic_cast(&sort), vec![term]);
        }
        Ok(term)
    }

    fn parse_primary(&mut self) -> ParseResult<Term> {
        match self.peek().kind.clone() {
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_term()?;
                self.expect(&TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::CellOpen(name, attributes) => {
                self.advance();
                self.parse_cell(name, attributes)
            }
            TokenKind::Int(n) => {
                self.advance();
                Ok(Term::int(n))
            }
            TokenKind::String(s) => {
                self.advance();
                Ok(Term::token(s, Sort::new(kompile_core::sorts::STRING)))
            }
            TokenKind::Ident(name) if name == "true" || name == "false" => {
                self.advance();
                Ok(Term::bool(name == "true"))
            }
            TokenKind::Ident(name) if name == ".K" => {
                self.advance();
                Ok(Term::Sequence(Vec::new()))
            }
            TokenKind::Ident(name)
                if is_variable_name(&name) && self.peek_second().kind != TokenKind::LParen =>
            {
                self.advance();
                Ok(Term::var(name))
            }
            TokenKind::Ident(label) | TokenKind::Quoted(label) => {
                self.advance();
                let args = if self.eat(&TokenKind::LParen) {
                    self.parse_arguments()?
                } else {
                    Vec::new()
                };
                Ok(Term::apply(label, args))
            }
            _ => Err(self.unexpected("term")),
        }
    }

    fn parse_arguments(&mut self) -> ParseResult<Vec<Term>> {
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            args.push(self.parse_term()?);
            while self.eat(&TokenKind::Comma) {
                args.push(self.parse_term()?);
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(args)
    }

    /// After `<name>`: `...`? content `...`? `</name>`.
    fn parse_cell(&mut self, name: String, tag: Vec<(String, String)>) -> ParseResult<Term> {
        let left_open = self.eat(&TokenKind::Ellipsis);
        let body = if self.peek().kind.starts_term() {
            self.parse_term()?
        } else {
            Term::Bag(Vec::new())
        };
        let right_open = self.eat(&TokenKind::Ellipsis);

        let span = self.current_span();
        match self.peek().kind.clone() {
            TokenKind::CellClose(closing) if closing == name => {
                self.advance();
            }
            TokenKind::CellClose(closing) => {
                return Err(ParseError::new(
                    format!("cell <{}> closed by </{}>", name, closing),
                    span,
                ))
            }
            _ => return Err(self.unexpected(&format!("</{}>", name))),
        }

        Ok(Term::Cell(Cell {
            name,
            attributes: tag
                .into_iter()
                .fold(Attributes::new(), |attrs, (key, value)| attrs.with(key, value)),
            left_open,
            right_open,
            body: Box::new(body),
        }))
    }
}
