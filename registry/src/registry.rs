//! The SymbolRegistry - canonical label interning.

use crate::{RegistryError, RegistryResult, Symbol, SymbolRecord};
use kompile_core::{Attributes, Sort, SortSignature};
use kompile_definition::Definition;
use log::{debug, error};
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};

/// Symbols are bucketed by the context they were declared in first, then
/// by label.
type BucketKey = (BTreeSet<SortSignature>, Attributes);

#[derive(Debug, Default)]
struct RegistryState {
    buckets: HashMap<BucketKey, HashMap<String, Symbol>>,
    /// Number of symbols ever created; also the next ordinal.
    count: usize,
}

/// Interns labels into canonical [`Symbol`]s.
///
/// Every lookup and insertion happens under one lock, so concurrent callers
/// asking for the same key observe one instance and ordinals stay dense.
#[derive(Debug, Default)]
pub struct SymbolRegistry {
    state: Mutex<RegistryState>,
}

impl SymbolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the canonical symbol for `label` in the given context,
    /// creating it on first request.
    ///
    /// `all_sorts` decides whether an `is<S>` label is a sort predicate.
    pub fn intern(
        &self,
        label: &str,
        signatures: BTreeSet<SortSignature>,
        attributes: Attributes,
        all_sorts: &BTreeSet<Sort>,
    ) -> Symbol {
        let mut state = self.state.lock();
        let ordinal = state.count;
        let bucket = state
            .buckets
            .entry((signatures.clone(), attributes.clone()))
            .or_default();

        if let Some(existing) = bucket.get(label) {
            return existing.clone();
        }

        let symbol = Symbol::create(label, ordinal, signatures, attributes, all_sorts);
        bucket.insert(label.to_string(), symbol.clone());
        state.count += 1;
        debug!("Interned symbol {:?}", symbol);
        symbol
    }

    /// Intern `label` with the signatures and merged attributes `definition`
    /// declares for it.
    pub fn intern_from(&self, definition: &Definition, label: &str) -> Symbol {
        self.intern(
            label,
            definition.signatures_of(label),
            definition.attributes_of(label),
            &definition.all_sorts(),
        )
    }

    /// Look up an existing symbol without creating one.
    pub fn lookup(
        &self,
        label: &str,
        signatures: &BTreeSet<SortSignature>,
        attributes: &Attributes,
    ) -> Option<Symbol> {
        let state = self.state.lock();
        state
            .buckets
            .get(&(signatures.clone(), attributes.clone()))
            .and_then(|bucket| bucket.get(label))
            .cloned()
    }

    /// Total number of symbols interned.
    pub fn size(&self) -> usize {
        self.state.lock().count
    }

    /// Replace a persisted symbol by the live canonical instance.
    ///
    /// If the key is already interned, its ordinal must match the record's.
    /// Otherwise the record is adopted, which requires its ordinal to be the
    /// next free one.
    pub fn canonicalize(&self, record: SymbolRecord) -> RegistryResult<Symbol> {
        let mut state = self.state.lock();
        let next = state.count;
        let key: BucketKey = (record.signatures.clone(), record.attributes.clone());

        let live = state.buckets.get(&key).and_then(|bucket| bucket.get(&record.label));
        if let Some(existing) = live {
            if existing.ordinal() != record.ordinal {
                error!(
                    "Critical registry inconsistency for '{}': live ordinal {}, persisted {}",
                    record.label,
                    existing.ordinal(),
                    record.ordinal
                );
                return Err(RegistryError::ordinal_mismatch(
                    &record.label,
                    existing.ordinal(),
                    record.ordinal,
                ));
            }
            return Ok(existing.clone());
        }

        if record.ordinal != next {
            error!(
                "Critical registry inconsistency for '{}': persisted ordinal {}, next free {}",
                record.label, record.ordinal, next
            );
            return Err(RegistryError::ordinal_gap(&record.label, record.ordinal, next));
        }

        let all_sorts: BTreeSet<Sort> = record.predicate_sort.iter().cloned().collect();
        let symbol = Symbol::create(
            &record.label,
            next,
            record.signatures,
            record.attributes,
            &all_sorts,
        );
        state
            .buckets
            .entry(key)
            .or_default()
            .insert(record.label, symbol.clone());
        state.count += 1;
        Ok(symbol)
    }

    /// Canonicalize many records, in ordinal order.
    pub fn canonicalize_all(
        &self,
        records: impl IntoIterator<Item = SymbolRecord>,
    ) -> RegistryResult<Vec<Symbol>> {
        let mut records: Vec<SymbolRecord> = records.into_iter().collect();
        records.sort_by_key(|r| r.ordinal);
        records
            .into_iter()
            .map(|record| self.canonicalize(record))
            .collect()
    }
}
