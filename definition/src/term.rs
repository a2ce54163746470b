//! Terms: the bodies of rules, contexts and configurations.
//!
//! Terms form a closed sum type. Passes dispatch by pattern matching and
//! rebuild terms bottom-up with [`Term::transform`] / [`Term::try_transform`].

use kompile_core::{sorts, Attributes, Sort};
use std::collections::BTreeSet;
use std::fmt;

/// Labels and variable names the compiler generates or recognises.
pub mod labels {
    /// Prefix of semantic cast labels: `#SemanticCastToInt(X)`.
    pub const SEMANTIC_CAST_PREFIX: &str = "#SemanticCastTo";
    pub const AND_BOOL: &str = "_andBool_";
    pub const NOT_BOOL: &str = "notBool";
    pub const IS_KRESULT: &str = "isKResult";
    pub const PLUS_INT: &str = "_+Int_";
    pub const FREEZER_PREFIX: &str = "#freezer";
    pub const ISTREAM: &str = "#istream";
    pub const OSTREAM: &str = "#ostream";
    pub const LIST_ITEM: &str = "ListItem";
    pub const LIST_CONCAT: &str = "_List_";
    pub const HEAT_MARKER: &str = "#heat";
    pub const COOL_MARKER: &str = "#cool";

    /// The placeholder variable of contexts and heat/cool rules.
    pub const HOLE: &str = "HOLE";
    /// The anonymous variable.
    pub const ANONYMOUS: &str = "_";
    pub const FRESH_PREFIX: char = '!';
    pub const EXISTENTIAL_PREFIX: char = '?';
    pub const CONFIG_VAR_PREFIX: char = '$';
    /// The configuration variable holding the program.
    pub const PGM: &str = "$PGM";

    /// The cast label for `sort`.
    pub fn semantic_cast(sort: &str) -> String {
        format!("{SEMANTIC_CAST_PREFIX}{sort}")
    }

    /// The label of the cell named `name`.
    pub fn cell(name: &str) -> String {
        format!("<{name}>")
    }
}

/// A term.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    /// Application of a label to arguments.
    Apply(Apply),
    /// A variable, optionally annotated with a sort.
    Variable(Variable),
    /// A literal token of a sort.
    Token(Token),
    /// A local rewrite `lhs => rhs`.
    Rewrite(Box<Rewrite>),
    /// A computation sequence `a ~> b`; empty is `.K`.
    Sequence(Vec<Term>),
    /// A configuration cell.
    Cell(Cell),
    /// Juxtaposed cells.
    Bag(Vec<Term>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Apply {
    pub label: String,
    pub args: Vec<Term>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable {
    pub name: String,
    pub sort: Option<Sort>,
}

impl Variable {
    pub fn is_anonymous(&self) -> bool {
        self.name == labels::ANONYMOUS
    }

    pub fn is_fresh(&self) -> bool {
        self.name.starts_with(labels::FRESH_PREFIX)
    }

    pub fn is_existential(&self) -> bool {
        self.name.starts_with(labels::EXISTENTIAL_PREFIX)
    }

    pub fn is_config_var(&self) -> bool {
        self.name.starts_with(labels::CONFIG_VAR_PREFIX)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub text: String,
    pub sort: Sort,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rewrite {
    pub lhs: Term,
    pub rhs: Term,
}

/// A cell. `left_open`/`right_open` record the `...` frames a rule writes
/// around the cell content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cell {
    pub name: String,
    pub attributes: Attributes,
    pub left_open: bool,
    pub right_open: bool,
    pub body: Box<Term>,
}

impl Cell {
    pub fn label(&self) -> String {
        labels::cell(&self.name)
    }
}

// ==================== Construction ====================

impl Term {
    pub fn apply(label: impl Into<String>, args: Vec<Term>) -> Self {
        Term::Apply(Apply {
            label: label.into(),
            args,
        })
    }

    pub fn constant(label: impl Into<String>) -> Self {
        Self::apply(label, Vec::new())
    }

    pub fn var(name: impl Into<String>) -> Self {
        Term::Variable(Variable {
            name: name.into(),
            sort: None,
        })
    }

    pub fn sorted_var(name: impl Into<String>, sort: Sort) -> Self {
        Term::Variable(Variable {
            name: name.into(),
            sort: Some(sort),
        })
    }

    pub fn token(text: impl Into<String>, sort: Sort) -> Self {
        Term::Token(Token {
            text: text.into(),
            sort,
        })
    }

    pub fn int(value: i64) -> Self {
        Self::token(value.to_string(), Sort::int())
    }

    pub fn bool(value: bool) -> Self {
        Self::token(value.to_string(), Sort::bool())
    }

    pub fn rewrite(lhs: Term, rhs: Term) -> Self {
        Term::Rewrite(Box::new(Rewrite { lhs, rhs }))
    }

    /// A closed cell.
    pub fn cell(name: impl Into<String>, body: Term) -> Self {
        Term::Cell(Cell {
            name: name.into(),
            attributes: Attributes::new(),
            left_open: false,
            right_open: false,
            body: Box::new(body),
        })
    }

    /// A cell whose content continues to the right (`<k> X ...</k>`).
    pub fn open_cell(name: impl Into<String>, body: Term) -> Self {
        Term::Cell(Cell {
            name: name.into(),
            attributes: Attributes::new(),
            left_open: false,
            right_open: true,
            body: Box::new(body),
        })
    }

    /// Conjunction that drops a literal `true` operand.
    pub fn and_bool(left: Option<Term>, right: Term) -> Term {
        match left {
            None => right,
            Some(left) if left.is_true() => right,
            Some(left) => Term::apply(labels::AND_BOOL, vec![left, right]),
        }
    }

    /// Flattens nested sequences and drops empty ones.
    pub fn sequence(items: Vec<Term>) -> Term {
        let mut flat = Vec::new();
        for item in items {
            match item {
                Term::Sequence(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        if flat.len() == 1 {
            flat.pop().unwrap_or(Term::Sequence(Vec::new()))
        } else {
            Term::Sequence(flat)
        }
    }
}

// ==================== Inspection ====================

impl Term {
    pub fn is_true(&self) -> bool {
        matches!(self, Term::Token(t) if t.text == "true" && t.sort.name() == sorts::BOOL)
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Term::Variable(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_apply(&self) -> Option<&Apply> {
        match self {
            Term::Apply(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_cell(&self) -> Option<&Cell> {
        match self {
            Term::Cell(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_cell(&self) -> bool {
        matches!(self, Term::Cell(_))
    }

    /// Direct children, left to right.
    pub fn children(&self) -> Vec<&Term> {
        match self {
            Term::Apply(a) => a.args.iter().collect(),
            Term::Variable(_) | Term::Token(_) => Vec::new(),
            Term::Rewrite(r) => vec![&r.lhs, &r.rhs],
            Term::Sequence(items) | Term::Bag(items) => items.iter().collect(),
            Term::Cell(c) => vec![c.body.as_ref()],
        }
    }

    /// Pre-order traversal.
    pub fn visit<F: FnMut(&Term)>(&self, f: &mut F) {
        f(self);
        for child in self.children() {
            child.visit(f);
        }
    }

    /// Returns true if any subterm satisfies `pred`.
    pub fn any<F: Fn(&Term) -> bool>(&self, pred: &F) -> bool {
        pred(self) || self.children().into_iter().any(|c| c.any(pred))
    }

    /// Returns true if the term mentions a cell anywhere.
    pub fn has_cells(&self) -> bool {
        self.any(&Term::is_cell)
    }

    /// Names of all variables occurring in the term.
    pub fn variables(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.visit(&mut |t| {
            if let Term::Variable(v) = t {
                names.insert(v.name.clone());
            }
        });
        names
    }

    /// All variable occurrences in pre-order.
    pub fn variable_occurrences(&self) -> Vec<&Variable> {
        let mut out = Vec::new();
        collect_variables(self, &mut out);
        out
    }

    /// The term with every rewrite replaced by its left-hand side.
    pub fn lhs(&self) -> Term {
        self.clone().transform(&mut |t| match t {
            Term::Rewrite(r) => r.lhs,
            other => other,
        })
    }

    /// The term with every rewrite replaced by its right-hand side.
    pub fn rhs(&self) -> Term {
        self.clone().transform(&mut |t| match t {
            Term::Rewrite(r) => r.rhs,
            other => other,
        })
    }

    /// The label at the top of the left-hand side, looking through rewrites.
    pub fn top_label(&self) -> Option<&str> {
        match self {
            Term::Apply(a) => Some(&a.label),
            Term::Rewrite(r) => r.lhs.top_label(),
            _ => None,
        }
    }
}

fn collect_variables<'t>(term: &'t Term, out: &mut Vec<&'t Variable>) {
    if let Term::Variable(v) = term {
        out.push(v);
    }
    for child in term.children() {
        collect_variables(child, out);
    }
}

// ==================== Transformation ====================

impl Term {
    /// Rebuilds the term with `f` applied to each direct child.
    pub fn map_children<F: FnMut(Term) -> Term>(self, mut f: F) -> Term {
        match self {
            Term::Apply(a) => Term::Apply(Apply {
                label: a.label,
                args: a.args.into_iter().map(&mut f).collect(),
            }),
            Term::Rewrite(r) => {
                let Rewrite { lhs, rhs } = *r;
                Term::rewrite(f(lhs), f(rhs))
            }
            Term::Sequence(items) => Term::Sequence(items.into_iter().map(&mut f).collect()),
            Term::Bag(items) => Term::Bag(items.into_iter().map(&mut f).collect()),
            Term::Cell(c) => Term::Cell(Cell {
                body: Box::new(f(*c.body)),
                ..c
            }),
            leaf => leaf,
        }
    }

    /// Fallible variant of [`Term::map_children`].
    pub fn try_map_children<E, F: FnMut(Term) -> Result<Term, E>>(self, mut f: F) -> Result<Term, E> {
        Ok(match self {
            Term::Apply(a) => Term::Apply(Apply {
                label: a.label,
                args: a.args.into_iter().map(&mut f).collect::<Result<_, _>>()?,
            }),
            Term::Rewrite(r) => {
                let Rewrite { lhs, rhs } = *r;
                Term::rewrite(f(lhs)?, f(rhs)?)
            }
            Term::Sequence(items) => {
                Term::Sequence(items.into_iter().map(&mut f).collect::<Result<_, _>>()?)
            }
            Term::Bag(items) => Term::Bag(items.into_iter().map(&mut f).collect::<Result<_, _>>()?),
            Term::Cell(c) => Term::Cell(Cell {
                body: Box::new(f(*c.body)?),
                ..c
            }),
            leaf => leaf,
        })
    }

    /// Bottom-up rewrite: children first, then `f` on the rebuilt node.
    pub fn transform<F: FnMut(Term) -> Term>(self, f: &mut F) -> Term {
        let rebuilt = self.map_children(|child| child.transform(f));
        f(rebuilt)
    }

    /// Fallible bottom-up rewrite.
    pub fn try_transform<E, F: FnMut(Term) -> Result<Term, E>>(self, f: &mut F) -> Result<Term, E> {
        let rebuilt = self.try_map_children(|child| child.try_transform(f))?;
        f(rebuilt)
    }
}

// ==================== Display ====================

fn is_plain_label(label: &str) -> bool {
    let mut chars = label.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '#' || c == '.' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn write_label(f: &mut fmt::Formatter<'_>, label: &str) -> fmt::Result {
    if is_plain_label(label) {
        write!(f, "{}", label)
    } else {
        write!(f, "`{}`", label)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Apply(a) => {
                write_label(f, &a.label)?;
                if !a.args.is_empty() {
                    write!(f, "(")?;
                    for (i, arg) in a.args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, ")")?;
                }
                Ok(())
            }
            Term::Variable(v) => match &v.sort {
                Some(sort) => write!(f, "{}:{}", v.name, sort),
                None => write!(f, "{}", v.name),
            },
            Term::Token(t) => match t.sort.name() {
                sorts::INT | sorts::BOOL => write!(f, "{}", t.text),
                sorts::STRING => write!(f, "\"{}\"", t.text),
                other => write!(f, "#token(\"{}\", \"{}\")", t.text, other),
            },
            Term::Rewrite(r) => write!(f, "({} => {})", r.lhs, r.rhs),
            Term::Sequence(items) => {
                if items.is_empty() {
                    return write!(f, ".K");
                }
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ~> ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            Term::Cell(c) => {
                write!(f, "<{}>", c.name)?;
                if c.left_open {
                    write!(f, "... ")?;
                } else {
                    write!(f, " ")?;
                }
                write!(f, "{}", c.body)?;
                if c.right_open {
                    write!(f, " ...")?;
                } else {
                    write!(f, " ")?;
                }
                write!(f, "</{}>", c.name)
            }
            Term::Bag(items) => {
                if items.is_empty() {
                    return write!(f, ".Bag");
                }
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}
