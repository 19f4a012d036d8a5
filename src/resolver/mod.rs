//
//  mod.rs
//  callmap
//
//  Created by hak (tharun)
//

//! Two-pass resolution of a Python project.
//!
//! Pass one parses every file and extracts its symbols. Once all files are
//! done the [`SymbolIndex`] is built, and pass two walks every file again to
//! resolve its call sites. Both passes run per file on rayon and collect in
//! file order, so the result matches a sequential run.

pub mod calls;
pub mod index;
pub mod symbols;
pub mod types;
mod walk;

use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::{debug, info};
use std::path::{Path, PathBuf};

use crate::config::ResolverConfig;
use crate::discovery::{collect_sources, SourceFile};
use crate::error::Result;
use crate::parser::{parse_module, ParsedModule};

pub use calls::{format_callee, resolve_callee_id, AliasTable, Resolution};
pub use index::{pick_best, IndexEntry, SymbolIndex};
pub use symbols::extract_symbols;
pub use types::{
    AmbiguousReference, Call, ResolvedProject, SourceLocation, Symbol, SymbolKind,
    ATTRIBUTES_NAME, INIT_METHOD, UNKNOWN_CALLEE,
};

/// Resolve every `.py` file under `target` (a directory or a single file).
pub fn resolve_project(target: &Path, config: &ResolverConfig) -> Result<ResolvedProject> {
    let sources = collect_sources(target, config)?;
    resolve_sources(sources.root, sources.files)
}

/// Resolve in-memory sources. Paths in `files` are relative to `root`.
pub fn resolve_sources(root: PathBuf, files: Vec<SourceFile>) -> Result<ResolvedProject> {
    let file_count = files.len();

    let extracted: Vec<Result<(ParsedModule, Vec<Symbol>)>> = files
        .into_par_iter()
        .map(|file| -> Result<(ParsedModule, Vec<Symbol>)> {
            let parsed = parse_module(&file.rel_path, file.source)?;
            let symbols = extract_symbols(&parsed);
            Ok((parsed, symbols))
        })
        .collect();

    let mut modules = Vec::with_capacity(file_count);
    let mut symbols: IndexMap<String, Symbol> = IndexMap::new();
    for result in extracted {
        // The first broken file in order aborts the run.
        let (parsed, file_symbols) = result?;
        for symbol in file_symbols {
            if let Some(previous) = symbols.insert(symbol.id.clone(), symbol) {
                debug!(
                    id = %previous.id,
                    file = %previous.file.display(),
                    line = previous.start_line,
                    "Duplicate symbol id, later definition wins"
                );
            }
        }
        modules.push(parsed);
    }

    let index = SymbolIndex::build(symbols.values());
    debug!(targets = index.len(), "Built symbol index");

    let per_file: Vec<calls::FileCalls> = modules
        .par_iter()
        .map(|parsed| calls::resolve_calls(parsed, &index))
        .collect();

    let mut all_calls = Vec::new();
    let mut ambiguous = Vec::new();
    for file_calls in per_file {
        let offset = all_calls.len();
        ambiguous.extend(file_calls.ambiguous.into_iter().map(
            |(local_index, raw_callee, candidates)| AmbiguousReference {
                call_index: offset + local_index,
                raw_callee,
                candidates,
            },
        ));
        all_calls.extend(file_calls.calls);
    }

    let resolved = all_calls.iter().filter(|c| c.callee_id.is_some()).count();
    info!(
        root = %root.display(),
        files = file_count,
        symbols = symbols.len(),
        calls = all_calls.len(),
        resolved,
        ambiguous = ambiguous.len(),
        "Resolved project"
    );

    Ok(ResolvedProject::new(root, symbols, all_calls, ambiguous))
}
