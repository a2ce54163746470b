//! Module and sentence parsing.

use super::Parser;
use crate::error::{ParseError, ParseResult};
use crate::lexer::TokenKind;
use kompile_core::{keys, AttrValue, Attributes, Sort};
use kompile_definition::{
    Configuration, Context, Module, Production, Rule, Sentence, SortDecl,
};

/// Sorts start with an uppercase letter, optionally behind a `#`.
pub(crate) fn is_sort_name(name: &str) -> bool {
    name.trim_start_matches('#')
        .chars()
        .next()
        .map(|c| c.is_uppercase())
        .unwrap_or(false)
}

impl Parser {
    // ==================== MODULES ====================

    /// Parse `module NAME sentence* endmodule`.
    pub fn parse_module(&mut self) -> ParseResult<Module> {
        self.expect(&TokenKind::Module)?;
        let name = self.expect_ident()?;
        let mut module = Module::new(name);

        loop {
            match self.peek().kind {
                TokenKind::EndModule => {
                    self.advance();
                    break;
                }
                TokenKind::Imports => {
                    self.advance();
                    module.imports.push(self.expect_ident()?);
                }
                TokenKind::Eof => return Err(self.unexpected("endmodule")),
                _ => {
                    let sentence = self.parse_sentence()?;
                    module.sentences.push(sentence);
                }
            }
        }

        if self.check(&TokenKind::LBracket) {
            module.attributes = self.parse_attributes()?;
        }
        Ok(module)
    }

    // ==================== SENTENCES ====================

    fn parse_sentence(&mut self) -> ParseResult<Sentence> {
        match self.peek().kind {
            TokenKind::Syntax => {
                self.advance();
                self.parse_syntax()
            }
            TokenKind::Rule => {
                self.advance();
                Ok(Sentence::Rule(self.parse_rule_body()?))
            }
            TokenKind::Context => {
                self.advance();
                let body = self.parse_term()?;
                let mut context = Context::new(body);
                if self.eat(&TokenKind::Requires) {
                    context.requires = Some(self.parse_term()?);
                }
                context.attributes = self.parse_optional_attributes()?;
                Ok(Sentence::Context(context))
            }
            TokenKind::Configuration => {
                self.advance();
                let body = self.parse_term()?;
                let mut configuration = Configuration::new(body);
                configuration.attributes = self.parse_optional_attributes()?;
                Ok(Sentence::Configuration(configuration))
            }
            _ => Err(self.unexpected("sentence")),
        }
    }

    fn parse_sort(&mut self) -> ParseResult<Sort> {
        let span = self.current_span();
        let name = self.expect_ident()?;
        if !is_sort_name(&name) {
            return Err(ParseError::new(format!("'{}' is not a sort name", name), span));
        }
        Ok(Sort::new(name))
    }

    /// After `syntax`: a sort declaration or a production.
    fn parse_syntax(&mut self) -> ParseResult<Sentence> {
        let sort = self.parse_sort()?;
        if !self.eat(&TokenKind::DefinedAs) {
            let mut decl = SortDecl::new(sort);
            decl.attributes = self.parse_optional_attributes()?;
            return Ok(Sentence::SortDecl(decl));
        }

        let production = match self.peek().kind.clone() {
            TokenKind::Ident(name) if is_sort_name(&name) => {
                self.advance();
                Production::subsort(sort, name)
            }
            TokenKind::Ident(label) | TokenKind::Quoted(label) => {
                self.advance();
                let mut params = Vec::new();
                if self.eat(&TokenKind::LParen) {
                    if !self.check(&TokenKind::RParen) {
                        params.push(self.parse_sort()?);
                        while self.eat(&TokenKind::Comma) {
                            params.push(self.parse_sort()?);
                        }
                    }
                    self.expect(&TokenKind::RParen)?;
                }
                Production::new(sort, label, params)
            }
            _ => return Err(self.unexpected("production")),
        };
        let attributes = self.parse_optional_attributes()?;
        Ok(Sentence::Production(production.with_attributes(attributes)))
    }

    /// After `rule`: `[label]:`? term (`requires` term)? (`ensures` term)? attributes?
    pub(crate) fn parse_rule_body(&mut self) -> ParseResult<Rule> {
        let mut attributes = Attributes::new();
        if self.eat(&TokenKind::LBracket) {
            let label = self.expect_ident()?;
            self.expect(&TokenKind::RBracket)?;
            self.expect(&TokenKind::Colon)?;
            attributes = attributes.with(keys::LABEL, label);
        }

        let body = self.parse_term()?;
        let mut rule = Rule::new(body);
        if self.eat(&TokenKind::Requires) {
            rule.requires = Some(self.parse_term()?);
        }
        if self.eat(&TokenKind::Ensures) {
            rule.ensures = Some(self.parse_term()?);
        }
        let trailing = self.parse_optional_attributes()?;
        Ok(rule.with_attributes(attributes.merge(&trailing)))
    }

    // ==================== ATTRIBUTES ====================

    fn parse_optional_attributes(&mut self) -> ParseResult<Attributes> {
        if self.check(&TokenKind::LBracket) {
            self.parse_attributes()
        } else {
            Ok(Attributes::new())
        }
    }

    /// Parse `[key, key(value), ...]`.
    pub(crate) fn parse_attributes(&mut self) -> ParseResult<Attributes> {
        self.expect(&TokenKind::LBracket)?;
        let mut attributes = Attributes::new();
        loop {
            let key = self.expect_ident()?;
            let value = if self.eat(&TokenKind::LParen) {
                let value = self.parse_attribute_value(&key)?;
                self.expect(&TokenKind::RParen)?;
                value
            } else {
                AttrValue::Marker
            };
            attributes = attributes.with(key, value);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBracket)?;
        Ok(attributes)
    }

    /// The payload of `key(...)`: a string, a name, a boolean, a list of
    /// positions `1, 2`, or a relation `0 1, 2 3`.
    fn parse_attribute_value(&mut self, key: &str) -> ParseResult<AttrValue> {
        let span = self.current_span();
        match self.peek().kind.clone() {
            TokenKind::RParen => Ok(AttrValue::Marker),
            TokenKind::String(s) => {
                self.advance();
                Ok(AttrValue::Str(s))
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(match name.as_str() {
                    "true" => AttrValue::Bool(true),
                    "false" => AttrValue::Bool(false),
                    _ => AttrValue::Str(name),
                })
            }
            TokenKind::Int(_) => {
                let mut groups = Vec::new();
                loop {
                    let mut group = Vec::new();
                    while let TokenKind::Int(n) = self.peek().kind {
                        self.advance();
                        group.push(n);
                    }
                    groups.push(group);
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
                ints_or_relation(groups).ok_or_else(|| {
                    ParseError::new(format!("malformed value for attribute '{}'", key), span)
                })
            }
            _ => Err(self.unexpected("attribute value")),
        }
    }
}

fn ints_or_relation(groups: Vec<Vec<i64>>) -> Option<AttrValue> {
    let to_u32 = |n: i64| u32::try_from(n).ok();
    if groups.iter().all(|g| g.len() == 1) {
        let positions: Option<Vec<u32>> = groups.iter().map(|g| to_u32(g[0])).collect();
        return positions.map(AttrValue::Ints);
    }
    if groups.iter().all(|g| g.len() == 2) {
        let pairs: Option<Vec<(u32, u32)>> = groups
            .iter()
            .map(|g| Some((to_u32(g[0])?, to_u32(g[1])?)))
            .collect();
        return pairs.map(AttrValue::Relation);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::super::parse_module;
    use super::*;

    #[test]
    fn test_strict_positions() {
        // GIVEN a production with explicit strict positions
        let module = parse_module("module M syntax E ::= f(E, E, E) [strict(1, 3)] endmodule").unwrap();

        // THEN the positions are read as an integer list
        let production = module.sentences[0].as_production().unwrap();
        assert_eq!(production.attributes.get_ints(keys::STRICT).unwrap(), Some(&[1u32, 3][..]));
    }

    #[test]
    fn test_binder_relation() {
        let module = parse_module("module M syntax E ::= lam(Id, E) [binder(0 1)] endmodule").unwrap();
        let production = module.sentences[0].as_production().unwrap();
        assert_eq!(
            production.attributes.get_relation(keys::BINDER).unwrap(),
            Some(&[(0u32, 1u32)][..])
        );
    }

    #[test]
    fn test_mixed_groups_rejected() {
        assert!(parse_module("module M syntax E ::= f(E) [binder(0 1, 2)] endmodule").is_err());
    }

    #[test]
    fn test_constant_production() {
        let module = parse_module("module M syntax Stream ::= stdin endmodule").unwrap();
        let production = module.sentences[0].as_production().unwrap();
        assert_eq!(production.klabel.as_deref(), Some("stdin"));
        assert!(production.params.is_empty());
    }

    #[test]
    fn test_lowercase_sort_rejected() {
        let err = parse_module("module M syntax exp endmodule").unwrap_err();
        assert!(err.message.contains("not a sort"));
    }

    #[test]
    fn test_sort_names() {
        assert!(is_sort_name("Int"));
        assert!(is_sort_name("#Layout"));
        assert!(!is_sort_name("#istream"));
        assert!(!is_sort_name(".Map"));
    }
}
