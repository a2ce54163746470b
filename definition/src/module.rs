//! Modules.

use crate::{Production, Rule, Sentence};
use kompile_core::{Attributes, Sort};
use std::collections::BTreeSet;

/// A named group of sentences with imports.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Module {
    pub name: String,
    pub imports: Vec<String>,
    pub sentences: Vec<Sentence>,
    pub attributes: Attributes,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            imports: Vec::new(),
            sentences: Vec::new(),
            attributes: Attributes::new(),
        }
    }

    /// Add an import.
    pub fn import(mut self, name: impl Into<String>) -> Self {
        self.imports.push(name.into());
        self
    }

    /// Add a sentence.
    pub fn sentence(mut self, sentence: impl Into<Sentence>) -> Self {
        self.sentences.push(sentence.into());
        self
    }

    /// Returns a copy with `extra` appended to the local sentences.
    pub fn with_sentences(&self, extra: impl IntoIterator<Item = Sentence>) -> Self {
        let mut module = self.clone();
        module.sentences.extend(extra);
        module
    }

    /// Returns a copy with every local sentence replaced by `f`'s output.
    pub fn map_sentences<E, F>(&self, mut f: F) -> Result<Self, E>
    where
        F: FnMut(&Sentence) -> Result<Vec<Sentence>, E>,
    {
        let mut sentences = Vec::with_capacity(self.sentences.len());
        for sentence in &self.sentences {
            sentences.extend(f(sentence)?);
        }
        Ok(Self {
            name: self.name.clone(),
            imports: self.imports.clone(),
            sentences,
            attributes: self.attributes.clone(),
        })
    }

    pub fn local_productions(&self) -> impl Iterator<Item = &Production> {
        self.sentences.iter().filter_map(Sentence::as_production)
    }

    pub fn local_rules(&self) -> impl Iterator<Item = &Rule> {
        self.sentences.iter().filter_map(Sentence::as_rule)
    }

    /// Sorts declared or produced by this module's own sentences.
    pub fn local_sorts(&self) -> BTreeSet<Sort> {
        let mut sorts = BTreeSet::new();
        for sentence in &self.sentences {
            match sentence {
                Sentence::SortDecl(decl) => {
                    sorts.insert(decl.sort.clone());
                }
                Sentence::Production(p) => {
                    sorts.insert(p.sort.clone());
                }
                _ => {}
            }
        }
        sorts
    }
}
