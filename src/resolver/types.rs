//
//  types.rs
//  callmap
//
//  Created by hak (tharun)
//

//! Data model produced by the resolver.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Raw-callee marker for call targets that cannot be expressed as a dotted name.
pub const UNKNOWN_CALLEE: &str = "<unknown>";

/// Name of the synthetic symbol grouping a class's annotated attributes.
pub const ATTRIBUTES_NAME: &str = "<attributes>";

/// Constructor method linked when a class is instantiated.
pub const INIT_METHOD: &str = "__init__";

/// A concrete location in a source file, relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub file: PathBuf,
    /// 1-based line.
    pub lineno: usize,
    /// 0-based byte column.
    pub col_offset: usize,
}

impl SourceLocation {
    /// Absolute path of this location under a project root.
    pub fn with_project_root(&self, root: &Path) -> PathBuf {
        root.join(&self.file)
    }
}

/// What a symbol is. All kinds share one id space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Module,
    Function,
    Method,
    Class,
    /// Class-level annotated attributes, grouped per class.
    Attribute,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Module => "module",
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
            SymbolKind::Class => "class",
            SymbolKind::Attribute => "attribute",
        }
    }

    /// Functions and methods.
    pub fn is_callable(&self) -> bool {
        matches!(self, SymbolKind::Function | SymbolKind::Method)
    }

    /// Kinds a call expression can resolve to.
    pub fn is_call_target(&self) -> bool {
        matches!(
            self,
            SymbolKind::Function | SymbolKind::Method | SymbolKind::Class
        )
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named definition in the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Project-wide unique id, equal to `qualname`.
    pub id: String,
    pub kind: SymbolKind,
    pub name: String,
    pub qualname: String,
    pub module: String,
    pub file: PathBuf,
    pub start_line: usize,
    pub end_line: usize,
    pub snippet: Option<String>,
}

/// A call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub caller_id: String,
    pub location: SourceLocation,
    /// Dotted callee text after alias expansion, or [`UNKNOWN_CALLEE`].
    pub raw_callee: String,
    pub callee_id: Option<String>,
}

impl Call {
    pub fn is_unknown(&self) -> bool {
        self.raw_callee == UNKNOWN_CALLEE
    }
}

/// A bare name that matched several symbols project-wide and was left unresolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AmbiguousReference {
    /// Position of the call in [`ResolvedProject::calls`].
    pub call_index: usize,
    pub raw_callee: String,
    pub candidates: Vec<String>,
}

/// The resolver's output: symbols and call sites of one project.
///
/// Never mutated after construction. Filtering builds a new project.
#[derive(Debug, Clone)]
pub struct ResolvedProject {
    root: PathBuf,
    symbols: IndexMap<String, Symbol>,
    calls: Vec<Call>,
    ambiguous: Vec<AmbiguousReference>,
}

impl ResolvedProject {
    pub fn new(
        root: PathBuf,
        symbols: IndexMap<String, Symbol>,
        calls: Vec<Call>,
        ambiguous: Vec<AmbiguousReference>,
    ) -> Self {
        Self {
            root,
            symbols,
            calls,
            ambiguous,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn symbols(&self) -> &IndexMap<String, Symbol> {
        &self.symbols
    }

    pub fn symbol(&self, id: &str) -> Option<&Symbol> {
        self.symbols.get(id)
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn ambiguous(&self) -> &[AmbiguousReference] {
        &self.ambiguous
    }

    /// Function and method symbols.
    pub fn functions(&self) -> Vec<&Symbol> {
        self.symbols
            .values()
            .filter(|s| s.kind.is_callable())
            .collect()
    }

    /// Distinct module names, sorted.
    pub fn modules(&self) -> Vec<&str> {
        self.symbols
            .values()
            .map(|s| s.module.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Serializable view: symbols sorted by id, calls in order.
    pub fn to_export(&self) -> ProjectExport<'_> {
        let mut symbols: Vec<SymbolRecord<'_>> = self
            .symbols
            .values()
            .map(|s| SymbolRecord {
                id: &s.id,
                kind: s.kind,
                name: &s.name,
                qualname: &s.qualname,
                module: &s.module,
                file: slash_path(&s.file),
                start_line: s.start_line,
                end_line: s.end_line,
            })
            .collect();
        symbols.sort_by(|a, b| a.id.cmp(b.id));

        let calls = self
            .calls
            .iter()
            .map(|c| CallRecord {
                caller_id: &c.caller_id,
                raw_callee: &c.raw_callee,
                callee_id: c.callee_id.as_deref(),
                file: slash_path(&c.location.file),
                lineno: c.location.lineno,
                col_offset: c.location.col_offset,
            })
            .collect();

        ProjectExport {
            root: self.root.display().to_string(),
            symbols,
            calls,
        }
    }

    /// Pretty JSON of [`Self::to_export`].
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_export())?)
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectExport<'a> {
    pub root: String,
    pub symbols: Vec<SymbolRecord<'a>>,
    pub calls: Vec<CallRecord<'a>>,
}

#[derive(Debug, Serialize)]
pub struct SymbolRecord<'a> {
    pub id: &'a str,
    pub kind: SymbolKind,
    pub name: &'a str,
    pub qualname: &'a str,
    pub module: &'a str,
    pub file: String,
    pub start_line: usize,
    pub end_line: usize,
}

#[derive(Debug, Serialize)]
pub struct CallRecord<'a> {
    pub caller_id: &'a str,
    pub raw_callee: &'a str,
    pub callee_id: Option<&'a str>,
    pub file: String,
    pub lineno: usize,
    pub col_offset: usize,
}

/// Relative path with `/` separators on every platform.
pub(crate) fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
