//! Sentences: the top-level declarations of a module.

use crate::Term;
use kompile_core::{keys, Attributes, Sort, SortSignature};
use std::fmt;

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Sentence {
    SortDecl(SortDecl),
    Production(Production),
    Rule(Rule),
    Context(Context),
    Configuration(Configuration),
}

impl Sentence {
    pub fn attributes(&self) -> &Attributes {
        match self {
            Sentence::SortDecl(s) => &s.attributes,
            Sentence::Production(p) => &p.attributes,
            Sentence::Rule(r) => &r.attributes,
            Sentence::Context(c) => &c.attributes,
            Sentence::Configuration(c) => &c.attributes,
        }
    }

    /// A short name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Sentence::SortDecl(_) => "syntax",
            Sentence::Production(_) => "production",
            Sentence::Rule(_) => "rule",
            Sentence::Context(_) => "context",
            Sentence::Configuration(_) => "configuration",
        }
    }

    pub fn as_production(&self) -> Option<&Production> {
        match self {
            Sentence::Production(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_rule(&self) -> Option<&Rule> {
        match self {
            Sentence::Rule(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_context(&self) -> Option<&Context> {
        match self {
            Sentence::Context(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_configuration(&self) -> Option<&Configuration> {
        match self {
            Sentence::Configuration(c) => Some(c),
            _ => None,
        }
    }
}

/// `syntax S` with no right-hand side.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortDecl {
    pub sort: Sort,
    pub attributes: Attributes,
}

impl SortDecl {
    pub fn new(sort: impl Into<Sort>) -> Self {
        Self {
            sort: sort.into(),
            attributes: Attributes::new(),
        }
    }
}

/// `syntax S ::= label(P1, ..., Pn) [attrs]`, or `syntax S ::= P` for a
/// subsort production.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Production {
    pub sort: Sort,
    pub klabel: Option<String>,
    pub params: Vec<Sort>,
    pub attributes: Attributes,
}

impl Production {
    pub fn new(sort: impl Into<Sort>, klabel: impl Into<String>, params: Vec<Sort>) -> Self {
        Self {
            sort: sort.into(),
            klabel: Some(klabel.into()),
            params,
            attributes: Attributes::new(),
        }
    }

    /// `syntax sort ::= sub`.
    pub fn subsort(sort: impl Into<Sort>, sub: impl Into<Sort>) -> Self {
        Self {
            sort: sort.into(),
            klabel: None,
            params: vec![sub.into()],
            attributes: Attributes::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn signature(&self) -> SortSignature {
        SortSignature::new(self.params.clone(), self.sort.clone())
    }

    pub fn is_subsort(&self) -> bool {
        self.klabel.is_none() && self.params.len() == 1
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn is_function(&self) -> bool {
        self.attributes.contains(keys::FUNCTION) || self.attributes.contains(keys::PREDICATE)
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "syntax {} ::= ", self.sort)?;
        let params: Vec<&str> = self.params.iter().map(Sort::name).collect();
        match &self.klabel {
            Some(label) => write!(f, "{}({})", label, params.join(", "))?,
            None => write!(f, "{}", params.join(" "))?,
        }
        if !self.attributes.is_empty() {
            write!(f, " {}", self.attributes)?;
        }
        Ok(())
    }
}

/// A rewrite rule with optional side conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    pub body: Term,
    pub requires: Option<Term>,
    pub ensures: Option<Term>,
    pub attributes: Attributes,
}

impl Rule {
    pub fn new(body: Term) -> Self {
        Self {
            body,
            requires: None,
            ensures: None,
            attributes: Attributes::new(),
        }
    }

    pub fn with_requires(mut self, requires: Term) -> Self {
        self.requires = Some(requires);
        self
    }

    pub fn with_ensures(mut self, ensures: Term) -> Self {
        self.ensures = Some(ensures);
        self
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn is_heat(&self) -> bool {
        self.attributes.contains(keys::HEAT)
    }

    pub fn is_cool(&self) -> bool {
        self.attributes.contains(keys::COOL)
    }

    /// The terms making up the rule, in order: body, requires, ensures.
    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        std::iter::once(&self.body)
            .chain(self.requires.iter())
            .chain(self.ensures.iter())
    }

    /// Every variable name mentioned anywhere in the rule.
    pub fn all_variable_names(&self) -> std::collections::BTreeSet<String> {
        self.terms().flat_map(Term::variables).collect()
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule {}", self.body)?;
        if let Some(requires) = &self.requires {
            write!(f, " requires {}", requires)?;
        }
        if let Some(ensures) = &self.ensures {
            write!(f, " ensures {}", ensures)?;
        }
        if !self.attributes.is_empty() {
            write!(f, " {}", self.attributes)?;
        }
        Ok(())
    }
}

/// An evaluation context with a `HOLE`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Context {
    pub body: Term,
    pub requires: Option<Term>,
    pub attributes: Attributes,
}

impl Context {
    pub fn new(body: Term) -> Self {
        Self {
            body,
            requires: None,
            attributes: Attributes::new(),
        }
    }

    pub fn with_requires(mut self, requires: Term) -> Self {
        self.requires = Some(requires);
        self
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "context {}", self.body)?;
        if let Some(requires) = &self.requires {
            write!(f, " requires {}", requires)?;
        }
        Ok(())
    }
}

/// The initial configuration: a tree of cells.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Configuration {
    pub body: Term,
    pub attributes: Attributes,
}

impl Configuration {
    pub fn new(body: Term) -> Self {
        Self {
            body,
            attributes: Attributes::new(),
        }
    }
}

impl From<Production> for Sentence {
    fn from(p: Production) -> Self {
        Sentence::Production(p)
    }
}

impl From<Rule> for Sentence {
    fn from(r: Rule) -> Self {
        Sentence::Rule(r)
    }
}

impl From<Context> for Sentence {
    fn from(c: Context) -> Self {
        Sentence::Context(c)
    }
}

impl From<SortDecl> for Sentence {
    fn from(s: SortDecl) -> Self {
        Sentence::SortDecl(s)
    }
}

impl From<Configuration> for Sentence {
    fn from(c: Configuration) -> Self {
        Sentence::Configuration(c)
    }
}
