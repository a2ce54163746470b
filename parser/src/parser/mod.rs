//! Parser for definition source text.
//!
//! This module is organized into submodules by parsing category:
//! - `module`: modules, sentences and attribute lists
//! - `term`: rule, context and configuration bodies

mod module;
mod term;

use crate::error::{ParseError, ParseResult};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::Span;
use kompile_core::{keys, Attributes};
use kompile_definition::{Definition, Module, Rule, Term};

// ==================== PARSER STATE ====================

/// Parser state.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    eof: Token,
}

impl Parser {
    /// Create a new parser from source text.
    pub fn new(input: &str) -> ParseResult<Self> {
        let tokens = Lexer::new(input).tokenize()?;
        let eof = tokens
            .last()
            .cloned()
            .unwrap_or_else(|| Token::eof(input.len(), 1, 1));
        Ok(Self {
            tokens,
            pos: 0,
            eof,
        })
    }
}

// ==================== TOKEN HELPERS ====================

impl Parser {
    pub(crate) fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    /// The token after the next one.
    pub(crate) fn peek_second(&self) -> &Token {
        self.tokens.get(self.pos + 1).unwrap_or(&self.eof)
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
    }

    /// Consume the next token if it has the given kind.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: &TokenKind) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(kind.name()))
        }
    }

    pub(crate) fn expect_ident(&mut self) -> ParseResult<String> {
        match self.peek().kind.clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    pub(crate) fn unexpected(&self, expected: &str) -> ParseError {
        let token = self.peek();
        ParseError::unexpected_token(token.span, expected, token.kind.name())
    }

    pub(crate) fn at_eof(&self) -> bool {
        self.check(&TokenKind::Eof)
    }

    pub(crate) fn expect_eof(&mut self) -> ParseResult<()> {
        if self.at_eof() {
            Ok(())
        } else {
            Err(self.unexpected("end of input"))
        }
    }

    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }
}

// ==================== PUBLIC API ====================

/// Parse every module in `input` and assemble them into a definition.
pub fn parse_definition(input: &str, main_module: &str) -> ParseResult<Definition> {
    let modules = parse_modules(input)?;
    Ok(Definition::new(main_module, modules, Attributes::new())?)
}

/// Parse every module in `input` without resolving imports.
pub fn parse_modules(input: &str) -> ParseResult<Vec<Module>> {
    let mut parser = Parser::new(input)?;
    let mut modules = Vec::new();
    while !parser.at_eof() {
        modules.push(parser.parse_module()?);
    }
    Ok(modules)
}

/// Parse a single module.
pub fn parse_module(input: &str) -> ParseResult<Module> {
    let mut parser = Parser::new(input)?;
    let module = parser.parse_module()?;
    parser.expect_eof()?;
    Ok(module)
}

/// Parse one rule. The leading `rule` keyword is optional.
///
/// The rule carries `source` and `location` attributes.
pub fn parse_rule(input: &str, source: &str) -> ParseResult<Rule> {
    let mut parser = Parser::new(input).map_err(|e| e.in_source(source))?;
    let start = parser.current_span();
    parser.eat(&TokenKind::Rule);
    let rule = parser
        .parse_rule_body()
        .and_then(|rule| parser.expect_eof().map(|_| rule))
        .map_err(|e| e.in_source(source))?;
    let attributes = rule
        .attributes
        .with(keys::SOURCE, source)
        .with(keys::LOCATION, start.location());
    Ok(rule.with_attributes(attributes))
}

/// Parse a term.
pub fn parse_term(input: &str) -> ParseResult<Term> {
    let mut parser = Parser::new(input)?;
    let term = parser.parse_term()?;
    parser.expect_eof()?;
    Ok(term)
}

// ==================== TESTS ====================

#[cfg(test)]
mod tests {
    use super::*;
    use kompile_core::{Location, Sort};
    use kompile_definition::{labels, Sentence};

    const IMP: &str = r#"
        module IMP-SYNTAX
          syntax AExp
          syntax AExp ::= Int
          syntax AExp ::= plus(AExp, AExp) [strict]
        endmodule

        module IMP
          imports IMP-SYNTAX
          syntax KResult ::= Int
          configuration <T> <k> $PGM:AExp </k> <state> .Map </state> </T>
          rule [plus]: <k> plus(I1:Int, I2:Int) => `_+Int_`(I1, I2) ...</k>
          context foo(HOLE, _) requires true
        endmodule
    "#;

    #[test]
    fn test_parse_definition() {
        // GIVEN a two-module definition
        let def = parse_definition(IMP, "IMP").unwrap();

        // THEN both modules and their sentences are present
        assert_eq!(def.module_count(), 2);
        assert_eq!(def.main_module().imports, vec!["IMP-SYNTAX"]);
        assert_eq!(def.module("IMP-SYNTAX").unwrap().sentences.len(), 3);
        assert_eq!(def.main_module().sentences.len(), 4);
    }

    #[test]
    fn test_parse_definition_unknown_main() {
        let err = parse_definition(IMP, "NOPE").unwrap_err();
        assert!(err.message.contains("NOPE"));
    }

    #[test]
    fn test_rule_label_attribute() {
        let def = parse_definition(IMP, "IMP").unwrap();
        let rule = def.main_module().local_rules().next().unwrap();
        assert_eq!(rule.attributes.get_str(keys::LABEL).unwrap(), Some("plus"));
        assert!(rule.body.has_cells());
    }

    #[test]
    fn test_parse_rule_attaches_source_and_location() {
        // GIVEN rule text on its second line
        let rule = parse_rule("\n  rule <k> X => 1 ...</k> requires isInt(X)", "repl").unwrap();

        // THEN the rule records where it came from
        assert_eq!(rule.attributes.source(), Some("repl"));
        assert_eq!(rule.attributes.location(), Some(Location::new(2, 3)));
        assert!(rule.requires.is_some());
    }

    #[test]
    fn test_parse_rule_error_names_source() {
        let err = parse_rule("rule <k> X => </k>", "input.k").unwrap_err();
        assert_eq!(err.source_name.as_deref(), Some("input.k"));
        assert!(err.to_string().starts_with("input.k: "));
    }

    #[test]
    fn test_parse_term_cast() {
        let term = parse_term("X:Int").unwrap();
        assert_eq!(
            term,
            Term::apply(labels::semantic_cast("Int"), vec![Term::var("X")])
        );
    }

    #[test]
    fn test_parse_module_rejects_trailing_input() {
        assert!(parse_module("module A endmodule module").is_err());
    }

    #[test]
    fn test_parse_module_sentence_kinds() {
        let module = parse_module(
            "module M syntax S syntax Bool ::= isS(K) [function, predicate(S)] endmodule",
        )
        .unwrap();
        assert!(matches!(module.sentences[0], Sentence::SortDecl(_)));
        let production = module.sentences[1].as_production().unwrap();
        assert_eq!(production.klabel.as_deref(), Some("isS"));
        assert_eq!(production.params, vec![Sort::k()]);
        assert_eq!(
            production.attributes.get_str(keys::PREDICATE).unwrap(),
            Some("S")
        );
    }
}
