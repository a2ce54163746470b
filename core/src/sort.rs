//! Sorts and sort signatures.
//!
//! A sort names a syntactic category. A sort signature is the
//! argument-sorts/result-sort shape of one production for a label.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Names of the sorts the compiler itself relies on.
pub mod sorts {
    /// The sort of computation sequences.
    pub const K: &str = "K";
    /// The generic term sort every semantic sort is injected into.
    pub const KITEM: &str = "KItem";
    /// The sort of fully evaluated results.
    pub const KRESULT: &str = "KResult";
    pub const BOOL: &str = "Bool";
    pub const INT: &str = "Int";
    pub const STRING: &str = "String";
    pub const LIST: &str = "List";
    pub const STREAM: &str = "Stream";
}

/// Prefix that marks a sort as internal to the parser.
pub const PARSER_SORT_PREFIX: char = '#';

/// A syntactic category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sort(String);

impl Sort {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn k() -> Self {
        Self::new(sorts::K)
    }

    pub fn kitem() -> Self {
        Self::new(sorts::KITEM)
    }

    pub fn kresult() -> Self {
        Self::new(sorts::KRESULT)
    }

    pub fn bool() -> Self {
        Self::new(sorts::BOOL)
    }

    pub fn int() -> Self {
        Self::new(sorts::INT)
    }

    /// Returns true if this sort only exists to drive parsing.
    pub fn is_parser_sort(&self) -> bool {
        self.0.starts_with(PARSER_SORT_PREFIX)
    }

    /// The label of the sort-membership predicate for this sort.
    pub fn predicate_label(&self) -> String {
        format!("is{}", self.0)
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Sort {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Sort {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// The argument sorts and result sort of one production.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SortSignature {
    pub args: Vec<Sort>,
    pub result: Sort,
}

impl SortSignature {
    pub fn new(args: Vec<Sort>, result: Sort) -> Self {
        Self { args, result }
    }

    /// A signature with no arguments.
    pub fn constant(result: Sort) -> Self {
        Self {
            args: Vec::new(),
            result,
        }
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }
}

impl fmt::Display for SortSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: Vec<&str> = self.args.iter().map(Sort::name).collect();
        write!(f, "({}) -> {}", args.join(", "), self.result)
    }
}
