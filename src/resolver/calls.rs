//
//  calls.rs
//  callmap
//
//  Created by hak (tharun)
//

//! Call-site discovery and callee resolution.
//!
//! A second walk over each file tracks the scope stack (for the caller id)
//! and a flat import-alias table, and turns every call expression into a
//! [`Call`] resolved through the [`SymbolIndex`].

use tree_sitter::Node;
use std::collections::HashMap;

use crate::parser::{node_text, ParsedModule};
use super::index::SymbolIndex;
use super::types::{Call, SourceLocation, SymbolKind, INIT_METHOD, UNKNOWN_CALLEE};
use super::walk::{scope_path, walk, Scope, ScopeVisitor};

/// Outcome of resolving one formatted callee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved { id: String, kind: SymbolKind },
    /// Several project-wide symbols share the short name.
    Ambiguous(Vec<String>),
    Unresolved,
}

impl Resolution {
    pub fn id(&self) -> Option<&str> {
        match self {
            Resolution::Resolved { id, .. } => Some(id),
            _ => None,
        }
    }
}

/// Calls found in one file, with ambiguity diagnostics keyed by the
/// position of the call in `calls`.
#[derive(Debug, Default)]
pub struct FileCalls {
    pub calls: Vec<Call>,
    pub ambiguous: Vec<(usize, String, Vec<String>)>,
}

/// Import bindings of one file, updated in document order.
#[derive(Debug, Default, Clone)]
pub struct AliasTable {
    bindings: HashMap<String, String>,
}

impl AliasTable {
    pub fn bind(&mut self, local: impl Into<String>, target: impl Into<String>) {
        self.bindings.insert(local.into(), target.into());
    }

    pub fn get(&self, local: &str) -> Option<&str> {
        self.bindings.get(local).map(String::as_str)
    }

    /// Record the bindings of an `import_statement` or `import_from_statement`.
    pub fn record_import(&mut self, node: &Node, source: &[u8]) {
        match node.kind() {
            "import_statement" => self.record_plain_import(node, source),
            "import_from_statement" => self.record_from_import(node, source),
            _ => {}
        }
    }

    fn record_plain_import(&mut self, node: &Node, source: &[u8]) {
        let mut cursor = node.walk();
        for name in node.children_by_field_name("name", &mut cursor) {
            match name.kind() {
                "dotted_name" => {
                    let full = node_text(&name, source);
                    let head = full.split('.').next().unwrap_or(full);
                    self.bind(head, head);
                }
                "aliased_import" => {
                    if let Some((target, alias)) = aliased(&name, source) {
                        self.bind(alias, target);
                    }
                }
                _ => {}
            }
        }
    }

    fn record_from_import(&mut self, node: &Node, source: &[u8]) {
        let mut cursor = node.walk();
        if node
            .named_children(&mut cursor)
            .any(|child| child.kind() == "wildcard_import")
        {
            return;
        }

        let module = node
            .child_by_field_name("module_name")
            .map(|m| from_module_text(&m, source))
            .unwrap_or_default();

        let mut cursor = node.walk();
        for name in node.children_by_field_name("name", &mut cursor) {
            let (imported, local) = match name.kind() {
                "dotted_name" => {
                    let text = node_text(&name, source).to_string();
                    (text.clone(), text)
                }
                "aliased_import" => match aliased(&name, source) {
                    Some((imported, alias)) => (imported, alias),
                    None => continue,
                },
                _ => continue,
            };
            let target = if module.is_empty() {
                imported
            } else {
                format!("{module}.{imported}")
            };
            self.bind(local, target);
        }
    }
}

/// `(name, alias)` of an `aliased_import` node.
fn aliased(node: &Node, source: &[u8]) -> Option<(String, String)> {
    let name = node.child_by_field_name("name")?;
    let alias = node.child_by_field_name("alias")?;
    Some((
        node_text(&name, source).to_string(),
        node_text(&alias, source).to_string(),
    ))
}

/// Module text of a `from` import with leading dots dropped.
fn from_module_text(node: &Node, source: &[u8]) -> String {
    match node.kind() {
        "relative_import" => {
            let mut cursor = node.walk();
            let dotted = node
                .named_children(&mut cursor)
                .find(|child| child.kind() == "dotted_name");
            dotted
                .map(|d| node_text(&d, source).to_string())
                .unwrap_or_default()
        }
        _ => node_text(node, source).to_string(),
    }
}

/// Dotted text of a callee expression, or `None` when its shape is dynamic.
pub fn format_callee(node: &Node, source: &[u8], aliases: &AliasTable) -> Option<String> {
    match node.kind() {
        "identifier" => {
            let name = node_text(node, source);
            Some(aliases.get(name).unwrap_or(name).to_string())
        }
        "attribute" => {
            let object = node.child_by_field_name("object")?;
            let attr = node.child_by_field_name("attribute")?;
            let base = format_callee(&object, source, aliases)?;
            Some(format!("{base}.{}", node_text(&attr, source)))
        }
        _ => None,
    }
}

/// Resolve a formatted callee to a symbol id.
///
/// Tried in order: the dotted prefix as a module, the current module, then a
/// unique project-wide short name.
pub fn resolve_callee_id(raw: &str, current_module: &str, index: &SymbolIndex) -> Resolution {
    if raw == UNKNOWN_CALLEE {
        return Resolution::Unresolved;
    }

    let name = match raw.rsplit_once('.') {
        Some((prefix, name)) => {
            if let Some(entry) = index.lookup(prefix, name) {
                return Resolution::Resolved {
                    id: entry.id.clone(),
                    kind: entry.kind,
                };
            }
            name
        }
        None => raw,
    };

    if let Some(entry) = index.lookup(current_module, name) {
        return Resolution::Resolved {
            id: entry.id.clone(),
            kind: entry.kind,
        };
    }

    match index.by_name(name) {
        [] => Resolution::Unresolved,
        [only] => Resolution::Resolved {
            id: only.id.clone(),
            kind: only.kind,
        },
        many => Resolution::Ambiguous(many.iter().map(|e| e.id.clone()).collect()),
    }
}

/// Collect and resolve every call in a parsed file.
pub fn resolve_calls(parsed: &ParsedModule, index: &SymbolIndex) -> FileCalls {
    let mut collector = CallCollector {
        parsed,
        index,
        aliases: AliasTable::default(),
        out: FileCalls::default(),
    };
    walk(parsed.root_node(), parsed.source_bytes(), &mut collector);
    collector.out
}

struct CallCollector<'a> {
    parsed: &'a ParsedModule,
    index: &'a SymbolIndex,
    aliases: AliasTable,
    out: FileCalls,
}

impl CallCollector<'_> {
    fn caller_id(&self, scopes: &[Scope]) -> String {
        scope_path(&self.parsed.module, scopes)
    }

    fn record_call(&mut self, node: &Node, scopes: &[Scope]) {
        let source = self.parsed.source_bytes();
        let raw_callee = node
            .child_by_field_name("function")
            .and_then(|f| format_callee(&f, source, &self.aliases))
            .unwrap_or_else(|| UNKNOWN_CALLEE.to_string());

        let caller_id = self.caller_id(scopes);
        let pos = node.start_position();
        let location = SourceLocation {
            file: self.parsed.rel_path.clone(),
            lineno: pos.row + 1,
            col_offset: pos.column,
        };

        let resolution = resolve_callee_id(&raw_callee, &self.parsed.module, self.index);
        if let Resolution::Ambiguous(candidates) = &resolution {
            tracing::debug!(
                caller = %caller_id,
                callee = %raw_callee,
                candidates = candidates.len(),
                "Ambiguous call target left unresolved"
            );
            self.out
                .ambiguous
                .push((self.out.calls.len(), raw_callee.clone(), candidates.clone()));
        }

        // Instantiating a class also calls its constructor.
        let init_call = match &resolution {
            Resolution::Resolved {
                id,
                kind: SymbolKind::Class,
            } => {
                let init_id = format!("{id}.{INIT_METHOD}");
                self.index.contains(&init_id).then(|| Call {
                    caller_id: caller_id.clone(),
                    location: location.clone(),
                    raw_callee: format!("{raw_callee}.{INIT_METHOD}"),
                    callee_id: Some(init_id),
                })
            }
            _ => None,
        };

        self.out.calls.push(Call {
            caller_id,
            location,
            callee_id: resolution.id().map(str::to_string),
            raw_callee,
        });
        if let Some(init_call) = init_call {
            self.out.calls.push(init_call);
        }
    }
}

impl<'tree> ScopeVisitor<'tree> for CallCollector<'_> {
    fn visit(&mut self, node: &Node<'tree>, scopes: &[Scope]) {
        match node.kind() {
            "import_statement" | "import_from_statement" => {
                self.aliases.record_import(node, self.parsed.source_bytes());
            }
            "call" => self.record_call(node, scopes),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_module;
    use crate::resolver::symbols::extract_symbols;
    use std::path::Path;

    fn aliases_of(src: &str) -> AliasTable {
        let parsed = parse_module(Path::new("m.py"), src.to_string()).unwrap();
        let mut table = AliasTable::default();
        let root = parsed.root_node();
        let mut cursor = root.walk();
        for stmt in root.named_children(&mut cursor) {
            table.record_import(&stmt, parsed.source_bytes());
        }
        table
    }

    fn calls_of(path: &str, src: &str) -> FileCalls {
        let parsed = parse_module(Path::new(path), src.to_string()).unwrap();
        let symbols = extract_symbols(&parsed);
        let index = SymbolIndex::build(&symbols);
        resolve_calls(&parsed, &index)
    }

    #[test]
    fn test_plain_imports_bind_head_or_alias() {
        let table = aliases_of("import a.b.c\nimport os.path as osp\nimport json\n");
        assert_eq!(table.get("a"), Some("a"));
        assert_eq!(table.get("osp"), Some("os.path"));
        assert_eq!(table.get("json"), Some("json"));
        assert_eq!(table.get("b"), None);
    }

    #[test]
    fn test_from_imports_bind_qualified_targets() {
        let table = aliases_of(
            "from pkg.a import f\nfrom pkg.a import g as h\nfrom .sibling import k\nfrom . import local\nfrom x import *\n",
        );
        assert_eq!(table.get("f"), Some("pkg.a.f"));
        assert_eq!(table.get("h"), Some("pkg.a.g"));
        assert_eq!(table.get("k"), Some("sibling.k"));
        assert_eq!(table.get("local"), Some("local"));
        assert_eq!(table.get("*"), None);
    }

    #[test]
    fn test_later_import_overrides_binding() {
        let table = aliases_of("from a import f\nfrom b import f\n");
        assert_eq!(table.get("f"), Some("b.f"));
    }

    #[test]
    fn test_format_callee_shapes() {
        let mut table = AliasTable::default();
        table.bind("m", "pkg.mod");
        let src = "m.g()\nfuncs[0]()\nobj.method().chain()\n";
        let parsed = parse_module(Path::new("t.py"), src.to_string()).unwrap();
        let root = parsed.root_node();
        let mut cursor = root.walk();
        let formatted: Vec<Option<String>> = root
            .named_children(&mut cursor)
            .filter_map(|stmt| stmt.named_child(0))
            .filter_map(|call| call.child_by_field_name("function"))
            .map(|f| format_callee(&f, parsed.source_bytes(), &table))
            .collect();
        assert_eq!(formatted, vec![Some("pkg.mod.g".to_string()), None, None]);
    }

    #[test]
    fn test_unknown_sentinel_never_resolves() {
        let index = SymbolIndex::default();
        assert_eq!(resolve_callee_id(UNKNOWN_CALLEE, "m", &index), Resolution::Unresolved);
    }

    #[test]
    fn test_caller_ids_follow_scopes() {
        let src = "\
setup()

def outer():
    helper()

class Widget:
    register()

    def draw(self):
        self.paint()
";
        let out = calls_of("ui.py", src);
        let callers: Vec<&str> = out.calls.iter().map(|c| c.caller_id.as_str()).collect();
        assert_eq!(callers, vec!["ui", "ui.outer", "ui.Widget", "ui.Widget.draw"]);
        assert_eq!(out.calls[3].raw_callee, "self.paint");
        assert_eq!(out.calls[0].location.lineno, 1);
        assert_eq!(out.calls[1].location.col_offset, 4);
    }

    #[test]
    fn test_outer_call_precedes_nested_calls() {
        let out = calls_of("n.py", "def f(x):\n    return x\n\nf(f(1))\n");
        assert_eq!(out.calls.len(), 2);
        assert_eq!(out.calls[0].location.col_offset, 0);
        assert_eq!(out.calls[1].location.col_offset, 2);
        assert!(out.calls.iter().all(|c| c.callee_id.as_deref() == Some("n.f")));
    }

    #[test]
    fn test_decorator_call_belongs_to_enclosing_scope() {
        let src = "\
def deco(arg):
    return lambda fn: fn

@deco(1)
def wrapped():
    pass
";
        let out = calls_of("d.py", src);
        assert_eq!(out.calls.len(), 1);
        assert_eq!(out.calls[0].caller_id, "d");
        assert_eq!(out.calls[0].callee_id.as_deref(), Some("d.deco"));
    }

    #[test]
    fn test_method_resolves_through_current_module() {
        let src = "\
class Service:
    def load(self):
        return self.parse()

    def parse(self):
        return 1
";
        let out = calls_of("svc.py", src);
        assert_eq!(out.calls[0].callee_id.as_deref(), Some("svc.Service.parse"));
    }

    #[test]
    fn test_class_instantiation_adds_init_call() {
        let src = "\
class MyClass:
    def __init__(self):
        self.value = 42

class Plain:
    pass

def create():
    a = MyClass()
    b = Plain()
";
        let out = calls_of("classes.py", src);
        let raws: Vec<&str> = out.calls.iter().map(|c| c.raw_callee.as_str()).collect();
        assert_eq!(raws, vec!["MyClass", "MyClass.__init__", "Plain"]);
        assert_eq!(out.calls[0].callee_id.as_deref(), Some("classes.MyClass"));
        assert_eq!(out.calls[1].callee_id.as_deref(), Some("classes.MyClass.__init__"));
        assert_eq!(out.calls[1].location, out.calls[0].location);
        assert_eq!(out.calls[2].callee_id.as_deref(), Some("classes.Plain"));
    }

    #[test]
    fn test_nested_class_instantiation_links_nested_init() {
        let src = "\
class Outer:
    class Inner:
        def __init__(self, val):
            self.val = val

def factory():
    return Outer.Inner(10)
";
        let out = calls_of("nested.py", src);
        let init: Vec<&Call> = out
            .calls
            .iter()
            .filter(|c| c.callee_id.as_deref() == Some("nested.Outer.Inner.__init__"))
            .collect();
        assert_eq!(init.len(), 1);
        assert_eq!(init[0].raw_callee, "Outer.Inner.__init__");
        assert_eq!(init[0].caller_id, "nested.factory");
    }

    #[test]
    fn test_lambda_call_is_unknown() {
        let out = calls_of("lam.py", "(lambda x: x)(1)\n");
        assert_eq!(out.calls.len(), 1);
        assert!(out.calls[0].is_unknown());
        assert_eq!(out.calls[0].callee_id, None);
    }
}
