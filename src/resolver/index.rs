//
//  index.rs
//  callmap
//
//  Created by hak (tharun)
//

//! Lookup tables over call-target symbols.

use std::collections::{HashMap, HashSet};

use super::types::{Symbol, SymbolKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub id: String,
    pub kind: SymbolKind,
}

/// Multimap `(module, short name) -> [entry]` over function, method and
/// class symbols, plus a flat short-name view for the global fallback.
///
/// Entries keep symbol-table order. Built once and shared read-only.
#[derive(Debug, Default)]
pub struct SymbolIndex {
    scoped: HashMap<String, HashMap<String, Vec<IndexEntry>>>,
    by_name: HashMap<String, Vec<IndexEntry>>,
    ids: HashSet<String>,
}

impl SymbolIndex {
    pub fn build<'a>(symbols: impl IntoIterator<Item = &'a Symbol>) -> Self {
        let mut index = Self::default();
        for symbol in symbols {
            if !symbol.kind.is_call_target() {
                continue;
            }
            let entry = IndexEntry {
                id: symbol.id.clone(),
                kind: symbol.kind,
            };
            index
                .scoped
                .entry(symbol.module.clone())
                .or_default()
                .entry(symbol.name.clone())
                .or_default()
                .push(entry.clone());
            index
                .by_name
                .entry(symbol.name.clone())
                .or_default()
                .push(entry);
            index.ids.insert(symbol.id.clone());
        }
        index
    }

    /// Best entry named `name` in `module`.
    pub fn lookup(&self, module: &str, name: &str) -> Option<&IndexEntry> {
        self.scoped
            .get(module)
            .and_then(|names| names.get(name))
            .and_then(|entries| pick_best(entries))
    }

    /// Every entry with this short name, project-wide.
    pub fn by_name(&self, name: &str) -> &[IndexEntry] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Prefer functions and methods over classes, then the first encountered.
pub fn pick_best(entries: &[IndexEntry]) -> Option<&IndexEntry> {
    entries
        .iter()
        .find(|e| e.kind.is_callable())
        .or_else(|| entries.first())
}
