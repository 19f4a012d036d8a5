//
//  symbols.rs
//  callmap
//
//  Created by hak (tharun)
//

//! Symbol extraction: one module symbol per file plus one symbol per
//! function, method, class and class attribute group.

use tree_sitter::Node;

use crate::parser::{end_line, line_count, line_snippet, start_line, ParsedModule};
use super::types::{Symbol, SymbolKind, ATTRIBUTES_NAME};
use super::walk::{qualify, walk, Scope, ScopeKind, ScopeVisitor};

/// Extract every symbol defined in a parsed file.
///
/// The module symbol comes first, the rest follow in pre-order.
pub fn extract_symbols(parsed: &ParsedModule) -> Vec<Symbol> {
    let mut collector = SymbolCollector {
        parsed,
        symbols: vec![module_symbol(parsed)],
        attribute_stack: Vec::new(),
    };
    walk(parsed.root_node(), parsed.source_bytes(), &mut collector);
    collector.symbols
}

fn module_symbol(parsed: &ParsedModule) -> Symbol {
    Symbol {
        id: parsed.module.clone(),
        kind: SymbolKind::Module,
        name: parsed.module.clone(),
        qualname: parsed.module.clone(),
        module: parsed.module.clone(),
        file: parsed.rel_path.clone(),
        start_line: 1,
        end_line: line_count(&parsed.source),
        snippet: Some(parsed.source.clone()),
    }
}

struct SymbolCollector<'a> {
    parsed: &'a ParsedModule,
    symbols: Vec<Symbol>,
    /// Declaration line ranges, one entry per open class.
    attribute_stack: Vec<Vec<(usize, usize)>>,
}

impl SymbolCollector<'_> {
    fn push_symbol(&mut self, kind: SymbolKind, name: &str, qualname: String, start: usize, end: usize) {
        self.symbols.push(Symbol {
            id: qualname.clone(),
            kind,
            name: name.to_string(),
            qualname,
            module: self.parsed.module.clone(),
            file: self.parsed.rel_path.clone(),
            start_line: start,
            end_line: end,
            snippet: Some(line_snippet(&self.parsed.source, start, end)),
        });
    }
}

impl<'tree> ScopeVisitor<'tree> for SymbolCollector<'_> {
    fn enter_scope(&mut self, node: &Node<'tree>, scope: &Scope, enclosing: &[Scope]) {
        let kind = match scope.kind {
            ScopeKind::Class => {
                self.attribute_stack.push(Vec::new());
                SymbolKind::Class
            }
            ScopeKind::Function if enclosing.is_empty() => SymbolKind::Function,
            ScopeKind::Function => SymbolKind::Method,
        };
        let qualname = qualify(&self.parsed.module, enclosing, &scope.name);
        self.push_symbol(kind, &scope.name, qualname, start_line(node), end_line(node));
    }

    fn leave_scope(&mut self, scope: &Scope, enclosing: &[Scope]) {
        if scope.kind != ScopeKind::Class {
            return;
        }
        let Some(ranges) = self.attribute_stack.pop() else {
            return;
        };
        let (Some(first), Some(last)) = (ranges.first(), ranges.last()) else {
            return;
        };

        let class_qualname = qualify(&self.parsed.module, enclosing, &scope.name);
        let snippet: String = ranges
            .iter()
            .map(|&(start, end)| line_snippet(&self.parsed.source, start, end))
            .collect();
        self.symbols.push(Symbol {
            id: format!("{class_qualname}.{ATTRIBUTES_NAME}"),
            kind: SymbolKind::Attribute,
            name: ATTRIBUTES_NAME.to_string(),
            qualname: format!("{class_qualname}.{ATTRIBUTES_NAME}"),
            module: self.parsed.module.clone(),
            file: self.parsed.rel_path.clone(),
            start_line: first.0,
            end_line: last.1,
            snippet: Some(snippet),
        });
    }

    fn visit(&mut self, node: &Node<'tree>, scopes: &[Scope]) {
        if node.kind() != "assignment" || !is_annotated_name(node) {
            return;
        }
        // Only declarations whose innermost scope is the class body itself.
        if scopes.last().map(|s| s.kind) != Some(ScopeKind::Class) {
            return;
        }
        if let Some(ranges) = self.attribute_stack.last_mut() {
            let range = (start_line(node), end_line(node));
            if ranges.last() != Some(&range) {
                ranges.push(range);
            }
        }
    }
}

/// `name: T` or `name: T = value` with a plain identifier target.
fn is_annotated_name(assignment: &Node) -> bool {
    assignment.child_by_field_name("type").is_some()
        && assignment
            .child_by_field_name("left")
            .is_some_and(|left| left.kind() == "identifier")
}
