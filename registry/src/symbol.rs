//! Interned labels.

use kompile_core::{keys, AttrValue, Attributes, Sort, SortSignature};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[derive(Debug)]
struct SymbolData {
    label: String,
    ordinal: usize,
    signatures: BTreeSet<SortSignature>,
    attributes: Attributes,
    is_function: bool,
    is_pattern: bool,
    predicate_sort: Option<Sort>,
    smtlib: Option<String>,
}

/// The canonical representation of a label.
///
/// Symbols are only created by [`crate::SymbolRegistry`]. Two symbols are
/// equal only if they are the same interned instance; the hash is the hash
/// of the raw label.
#[derive(Clone)]
pub struct Symbol(Arc<SymbolData>);

impl Symbol {
    /// Derives the flags of a new symbol. Only the registry calls this, with
    /// the ordinal it reserved.
    pub(crate) fn create(
        label: &str,
        ordinal: usize,
        signatures: BTreeSet<SortSignature>,
        attributes: Attributes,
        all_sorts: &BTreeSet<Sort>,
    ) -> Self {
        let predicate_sort = label
            .strip_prefix("is")
            .map(Sort::new)
            .filter(|sort| all_sorts.contains(sort));

        let data = match predicate_sort {
            Some(sort) => SymbolData {
                label: label.to_string(),
                ordinal,
                signatures,
                attributes,
                is_function: true,
                is_pattern: false,
                predicate_sort: Some(sort),
                smtlib: None,
            },
            None => {
                let is_function =
                    attributes.contains(keys::FUNCTION) || attributes.contains(keys::PREDICATE);
                let is_pattern = attributes.contains(keys::PATTERN);
                let smtlib = attributes
                    .get_str(keys::SMTLIB)
                    .ok()
                    .flatten()
                    .map(str::to_string);
                SymbolData {
                    label: label.to_string(),
                    ordinal,
                    signatures,
                    attributes,
                    is_function,
                    is_pattern,
                    predicate_sort: None,
                    smtlib,
                }
            }
        };
        Symbol(Arc::new(data))
    }

    pub fn label(&self) -> &str {
        &self.0.label
    }

    /// Dense index assigned at creation.
    pub fn ordinal(&self) -> usize {
        self.0.ordinal
    }

    pub fn signatures(&self) -> &BTreeSet<SortSignature> {
        &self.0.signatures
    }

    pub fn attributes(&self) -> &Attributes {
        &self.0.attributes
    }

    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.0.attributes.get(key)
    }

    pub fn is_function(&self) -> bool {
        self.0.is_function
    }

    pub fn is_constructor(&self) -> bool {
        !self.0.is_function
    }

    pub fn is_pattern(&self) -> bool {
        self.0.is_pattern
    }

    /// Returns true if this is the membership predicate `is<S>` of a sort.
    pub fn is_sort_predicate(&self) -> bool {
        self.0.predicate_sort.is_some()
    }

    pub fn predicate_sort(&self) -> Option<&Sort> {
        self.0.predicate_sort.as_ref()
    }

    /// The SMT-LIB name, if the label has one.
    pub fn smtlib(&self) -> Option<&str> {
        self.0.smtlib.as_deref()
    }

    pub fn is_binder(&self) -> bool {
        self.0.attributes.contains(keys::BINDER)
    }

    pub fn is_meta_binder(&self) -> bool {
        self.0.attributes.contains(keys::METABINDER)
    }

    /// Bound-position to body-position pairs, if a binder map was given.
    pub fn binder_map(&self) -> Option<&[(u32, u32)]> {
        self.0.attributes.get(keys::BINDER).and_then(AttrValue::as_relation)
    }

    pub fn meta_binder_map(&self) -> Option<&[(u32, u32)]> {
        self.0
            .attributes
            .get(keys::METABINDER)
            .and_then(AttrValue::as_relation)
    }

    /// Identity comparison, the same test `==` performs.
    pub fn same(&self, other: &Symbol) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// The persisted form of this symbol.
    pub fn to_record(&self) -> SymbolRecord {
        SymbolRecord {
            label: self.0.label.clone(),
            ordinal: self.0.ordinal,
            signatures: self.0.signatures.clone(),
            attributes: self.0.attributes.clone(),
            predicate_sort: self.0.predicate_sort.clone(),
        }
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.label.hash(state);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.0.label, self.0.ordinal)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.label)
    }
}

/// A symbol as written to persistent storage.
///
/// Records are never used directly: pass them to
/// [`crate::SymbolRegistry::canonicalize`] to obtain the live instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolRecord {
    pub label: String,
    pub ordinal: usize,
    pub signatures: BTreeSet<SortSignature>,
    pub attributes: Attributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate_sort: Option<Sort>,
}
