//! The Definition - an immutable set of modules with structural queries.

use crate::{DefinitionError, DefinitionResult, Module, Production, Sentence};
use kompile_core::{keys, Attributes, Sort, SortSignature};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

/// A language definition.
///
/// Construction checks that module names are unique, that the main module
/// exists and that imports resolve without cycles. Modules are held behind
/// `Arc` so that a pass rewriting one module shares every other module
/// with its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    main_module: String,
    modules: BTreeMap<String, Arc<Module>>,
    attributes: Attributes,
}

impl Definition {
    /// Assemble a definition from modules.
    pub fn new(
        main_module: impl Into<String>,
        modules: impl IntoIterator<Item = Module>,
        attributes: Attributes,
    ) -> DefinitionResult<Self> {
        let mut by_name = BTreeMap::new();
        for module in modules {
            if by_name.contains_key(&module.name) {
                return Err(DefinitionError::DuplicateModule(module.name));
            }
            by_name.insert(module.name.clone(), Arc::new(module));
        }
        Self::from_shared(main_module.into(), by_name, attributes)
    }

    fn from_shared(
        main_module: String,
        modules: BTreeMap<String, Arc<Module>>,
        attributes: Attributes,
    ) -> DefinitionResult<Self> {
        let definition = Self {
            main_module,
            modules,
            attributes,
        };
        definition.check_structure()?;
        Ok(definition)
    }

    fn check_structure(&self) -> DefinitionResult<()> {
        if !self.modules.contains_key(&self.main_module) {
            return Err(DefinitionError::UnknownMainModule(self.main_module.clone()));
        }
        for module in self.modules.values() {
            for import in &module.imports {
                if !self.modules.contains_key(import) {
                    return Err(DefinitionError::unresolved_import(&module.name, import));
                }
            }
        }

        // Depth-first search with an explicit "on stack" set
        let mut done = HashSet::new();
        for name in self.modules.keys() {
            let mut on_stack = HashSet::new();
            self.visit_for_cycles(name, &mut on_stack, &mut done)?;
        }
        Ok(())
    }

    fn visit_for_cycles<'a>(
        &'a self,
        name: &'a str,
        on_stack: &mut HashSet<&'a str>,
        done: &mut HashSet<&'a str>,
    ) -> DefinitionResult<()> {
        if done.contains(name) {
            return Ok(());
        }
        if !on_stack.insert(name) {
            return Err(DefinitionError::ImportCycle(name.to_string()));
        }
        if let Some(module) = self.modules.get(name) {
            for import in &module.imports {
                self.visit_for_cycles(import, on_stack, done)?;
            }
        }
        on_stack.remove(name);
        done.insert(name);
        Ok(())
    }

    // ==================== Rebuilding ====================

    /// Returns a copy with `module` added, or replacing the module of the
    /// same name.
    pub fn with_module(&self, module: Module) -> DefinitionResult<Self> {
        let mut modules = self.modules.clone();
        modules.insert(module.name.clone(), Arc::new(module));
        Self::from_shared(self.main_module.clone(), modules, self.attributes.clone())
    }

    /// Returns a copy whose main module is `name`.
    pub fn with_main_module(&self, name: impl Into<String>) -> DefinitionResult<Self> {
        Self::from_shared(name.into(), self.modules.clone(), self.attributes.clone())
    }

    /// Rebuilds the definition module by module.
    ///
    /// `f` returns `None` to keep a module as is; kept modules are shared
    /// with `self`.
    pub fn map_modules<E, F>(&self, mut f: F) -> Result<Self, E>
    where
        E: From<DefinitionError>,
        F: FnMut(&Definition, &Module) -> Result<Option<Module>, E>,
    {
        let mut modules = BTreeMap::new();
        for (name, module) in &self.modules {
            let mapped = match f(self, module)? {
                Some(rewritten) => Arc::new(rewritten),
                None => Arc::clone(module),
            };
            modules.insert(name.clone(), mapped);
        }
        Ok(Self::from_shared(
            self.main_module.clone(),
            modules,
            self.attributes.clone(),
        )?)
    }

    // ==================== Module Lookups ====================

    pub fn main_module_name(&self) -> &str {
        &self.main_module
    }

    /// The main module. Always present by construction.
    pub fn main_module(&self) -> &Arc<Module> {
        &self.modules[&self.main_module]
    }

    pub fn module(&self, name: &str) -> Option<&Arc<Module>> {
        self.modules.get(name)
    }

    pub fn modules(&self) -> impl Iterator<Item = &Arc<Module>> {
        self.modules.values()
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// `name` and every module it imports transitively, in depth-first
    /// pre-order starting with `name`. Empty for unknown names.
    pub fn import_closure(&self, name: &str) -> Vec<&Arc<Module>> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut stack = vec![name];
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            if let Some(module) = self.modules.get(current) {
                order.push(module);
                for import in module.imports.iter().rev() {
                    stack.push(import);
                }
            }
        }
        order
    }

    /// Sentences of `name` and of everything it imports.
    pub fn sentences_of<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Sentence> + 'a {
        self.import_closure(name)
            .into_iter()
            .flat_map(|module| module.sentences.iter())
    }

    /// Productions visible from module `name`.
    pub fn visible_productions<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Production> + 'a {
        self.sentences_of(name).filter_map(Sentence::as_production)
    }

    /// Sorts defined by `name` or any module it imports.
    pub fn defined_sorts(&self, name: &str) -> BTreeSet<Sort> {
        self.import_closure(name)
            .into_iter()
            .flat_map(|module| module.local_sorts())
            .collect()
    }

    /// Sorts defined by the module's own sentences.
    pub fn local_sorts(&self, name: &str) -> BTreeSet<Sort> {
        self.modules
            .get(name)
            .map(|module| module.local_sorts())
            .unwrap_or_default()
    }

    // ==================== Label Lookups ====================

    fn all_productions(&self) -> impl Iterator<Item = &Production> {
        self.modules.values().flat_map(|m| m.local_productions())
    }

    /// Every production declaring `label`, across all modules.
    pub fn productions_for(&self, label: &str) -> Vec<&Production> {
        self.all_productions()
            .filter(|p| p.klabel.as_deref() == Some(label))
            .collect()
    }

    /// The signatures `label` is declared with.
    pub fn signatures_of(&self, label: &str) -> BTreeSet<SortSignature> {
        self.productions_for(label)
            .into_iter()
            .map(Production::signature)
            .collect()
    }

    /// The merged attributes of every production of `label`, without the
    /// per-declaration `source` and `location` keys.
    pub fn attributes_of(&self, label: &str) -> Attributes {
        self.productions_for(label)
            .into_iter()
            .fold(Attributes::new(), |acc, p| acc.merge(&p.attributes))
            .without(keys::SOURCE)
            .without(keys::LOCATION)
    }

    /// Every sort mentioned by a sort declaration or production.
    pub fn all_sorts(&self) -> BTreeSet<Sort> {
        let mut sorts = BTreeSet::new();
        for module in self.modules.values() {
            sorts.extend(module.local_sorts());
            for production in module.local_productions() {
                sorts.extend(production.params.iter().cloned());
            }
        }
        sorts
    }

    /// Every label declared by a production.
    pub fn labels(&self) -> BTreeSet<String> {
        self.all_productions()
            .filter_map(|p| p.klabel.clone())
            .collect()
    }
}
