//! Cell layout derived from a `configuration` sentence.

use crate::{labels, Definition, DefinitionError, DefinitionResult, Sentence, Term};
use kompile_core::{Attributes, Sort};
use std::collections::BTreeMap;

/// One declared cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellInfo {
    pub name: String,
    pub parent: Option<String>,
    /// Child cell names in declaration order. Empty for leaf cells.
    pub children: Vec<String>,
    /// The initial content of a leaf cell.
    pub initializer: Option<Term>,
    pub attributes: Attributes,
}

impl CellInfo {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// The cell tree of a definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationInfo {
    top: String,
    cells: BTreeMap<String, CellInfo>,
}

/// The computation cell of the default configuration.
pub const COMPUTATION_CELL: &str = "k";

/// The configuration used when a definition declares none: a single
/// `computation_cell` holding the program.
pub fn default_configuration(computation_cell: &str) -> Term {
    Term::cell(computation_cell, Term::sorted_var(labels::PGM, Sort::k()))
}

impl ConfigurationInfo {
    /// Reads the cell tree of a configuration body.
    pub fn from_term(body: &Term) -> DefinitionResult<Self> {
        let top = match body {
            Term::Cell(cell) => cell,
            Term::Bag(items) if items.len() == 1 => items[0].as_cell().ok_or_else(|| {
                DefinitionError::malformed_configuration("top level must be a single cell")
            })?,
            _ => {
                return Err(DefinitionError::malformed_configuration(
                    "top level must be a single cell",
                ))
            }
        };

        let mut info = Self {
            top: top.name.clone(),
            cells: BTreeMap::new(),
        };
        info.add_cell(body_cell(body)?, None)?;
        Ok(info)
    }

    fn add_cell(&mut self, cell: &Term, parent: Option<&str>) -> DefinitionResult<()> {
        let Some(cell) = cell.as_cell() else {
            return Err(DefinitionError::malformed_configuration(format!(
                "expected a cell, found {}",
                cell
            )));
        };
        if self.cells.contains_key(&cell.name) {
            return Err(DefinitionError::malformed_configuration(format!(
                "cell <{}> declared twice",
                cell.name
            )));
        }

        let nested: Vec<&Term> = match cell.body.as_ref() {
            inner @ Term::Cell(_) => vec![inner],
            Term::Bag(items) if items.iter().all(Term::is_cell) => items.iter().collect(),
            Term::Bag(items) if items.iter().any(Term::is_cell) => {
                return Err(DefinitionError::malformed_configuration(format!(
                    "cell <{}> mixes cells and content",
                    cell.name
                )))
            }
            _ => Vec::new(),
        };

        let children: Vec<String> = nested
            .iter()
            .filter_map(|t| t.as_cell().map(|c| c.name.clone()))
            .collect();
        let initializer = if nested.is_empty() {
            Some(cell.body.as_ref().clone())
        } else {
            None
        };
        self.cells.insert(
            cell.name.clone(),
            CellInfo {
                name: cell.name.clone(),
                parent: parent.map(str::to_string),
                children,
                initializer,
                attributes: cell.attributes.clone(),
            },
        );
        for child in nested {
            self.add_cell(child, Some(&cell.name))?;
        }
        Ok(())
    }

    /// The cell tree visible from `module`, or the default one when no
    /// configuration is in scope.
    pub fn for_module(definition: &Definition, module: &str) -> DefinitionResult<Self> {
        let declared = definition
            .sentences_of(module)
            .find_map(Sentence::as_configuration);
        match declared {
            Some(configuration) => Self::from_term(&configuration.body),
            None => Self::from_term(&default_configuration(COMPUTATION_CELL)),
        }
    }

    pub fn top_cell(&self) -> &str {
        &self.top
    }

    pub fn top_cell_label(&self) -> String {
        labels::cell(&self.top)
    }

    pub fn cell(&self, name: &str) -> Option<&CellInfo> {
        self.cells.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cells.contains_key(name)
    }

    pub fn cells(&self) -> impl Iterator<Item = &CellInfo> {
        self.cells.values()
    }

    pub fn parent(&self, name: &str) -> Option<&str> {
        self.cells.get(name).and_then(|c| c.parent.as_deref())
    }

    pub fn children(&self, name: &str) -> &[String] {
        self.cells
            .get(name)
            .map(|c| c.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_leaf(&self, name: &str) -> bool {
        self.children(name).is_empty()
    }

    /// Cell names from the top cell down to `name`, inclusive.
    pub fn path(&self, name: &str) -> Vec<String> {
        let mut path = Vec::new();
        let mut current = Some(name);
        while let Some(cell) = current {
            if !self.contains(cell) {
                break;
            }
            path.push(cell.to_string());
            current = self.parent(cell);
        }
        path.reverse();
        path
    }

    /// The sort of the program held in `$PGM`, if the configuration casts it.
    pub fn program_sort(&self) -> Option<Sort> {
        self.cells
            .values()
            .filter_map(|c| c.initializer.as_ref())
            .find_map(|init| {
                init.variable_occurrences()
                    .into_iter()
                    .find(|v| v.name == labels::PGM)
                    .and_then(|v| v.sort.clone())
                    .or_else(|| pgm_cast_sort(init))
            })
    }
}

fn body_cell(body: &Term) -> DefinitionResult<&Term> {
    match body {
        Term::Bag(items) => items
            .first()
            .ok_or_else(|| DefinitionError::malformed_configuration("empty configuration")),
        other => Ok(other),
    }
}

fn pgm_cast_sort(term: &Term) -> Option<Sort> {
    let mut found = None;
    term.visit(&mut |t| {
        if let Term::Apply(apply) = t {
            let pgm = apply
                .args
                .first()
                .and_then(Term::as_variable)
                .map(|v| v.name == labels::PGM)
                .unwrap_or(false);
            if pgm && found.is_none() {
                if let Some(sort) = apply.label.strip_prefix(labels::SEMANTIC_CAST_PREFIX) {
                    found = Some(Sort::new(sort));
                }
            }
        }
    });
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn imp_configuration() -> Term {
        Term::cell(
            "T",
            Term::Bag(vec![
                Term::cell("k", Term::sorted_var("$PGM", Sort::new("Stmt"))),
                Term::cell("state", Term::constant(".Map")),
            ]),
        )
    }

    #[test]
    fn test_cell_tree() {
        // GIVEN <T> <k/> <state/> </T>
        let info = ConfigurationInfo::from_term(&imp_configuration()).unwrap();

        // THEN the tree is recorded with parents and children
        assert_eq!(info.top_cell(), "T");
        assert_eq!(info.top_cell_label(), "<T>");
        assert_eq!(info.children("T"), &["k".to_string(), "state".to_string()]);
        assert_eq!(info.parent("k"), Some("T"));
        assert!(info.is_leaf("state"));
        assert_eq!(info.path("k"), vec!["T", "k"]);
    }

    #[test]
    fn test_program_sort() {
        let info = ConfigurationInfo::from_term(&imp_configuration()).unwrap();
        assert_eq!(info.program_sort(), Some(Sort::new("Stmt")));
    }

    #[test]
    fn test_program_sort_from_cast() {
        let config = Term::cell(
            "k",
            Term::apply(labels::semantic_cast("Pgm"), vec![Term::var("$PGM")]),
        );
        let info = ConfigurationInfo::from_term(&config).unwrap();
        assert_eq!(info.program_sort(), Some(Sort::new("Pgm")));
    }

    #[test]
    fn test_duplicate_cell_rejected() {
        let config = Term::cell(
            "T",
            Term::Bag(vec![
                Term::cell("k", Term::var("X")),
                Term::cell("k", Term::var("Y")),
            ]),
        );
        assert!(ConfigurationInfo::from_term(&config).is_err());
    }

    #[test]
    fn test_default_configuration() {
        let info =
            ConfigurationInfo::from_term(&default_configuration(COMPUTATION_CELL)).unwrap();
        assert_eq!(info.top_cell(), "k");
        assert_eq!(info.program_sort(), Some(Sort::k()));

        let thread = ConfigurationInfo::from_term(&default_configuration("thread")).unwrap();
        assert_eq!(thread.top_cell(), "thread");
    }
}
