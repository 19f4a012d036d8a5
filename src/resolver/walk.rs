//
//  walk.rs
//  callmap
//
//  Created by hak (tharun)
//

//! Scope-aware pre-order traversal shared by symbol extraction and call
//! resolution.
//!
//! The walk runs on an explicit worklist so deeply nested sources cannot
//! overflow the call stack. Function and class definitions push a scope
//! before their children are visited and pop it afterwards.

use tree_sitter::Node;

use crate::parser::node_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScopeKind {
    Function,
    Class,
}

#[derive(Debug, Clone)]
pub(crate) struct Scope {
    pub name: String,
    pub kind: ScopeKind,
}

/// Callbacks for [`walk`]. Every method has an empty default.
pub(crate) trait ScopeVisitor<'tree> {
    /// A definition is entered. `enclosing` does not include it yet.
    fn enter_scope(&mut self, _node: &Node<'tree>, _scope: &Scope, _enclosing: &[Scope]) {}

    /// A definition is left. `enclosing` no longer includes it.
    fn leave_scope(&mut self, _scope: &Scope, _enclosing: &[Scope]) {}

    /// Any node that is not a named definition.
    fn visit(&mut self, _node: &Node<'tree>, _scopes: &[Scope]) {}
}

enum Step<'tree> {
    Enter(Node<'tree>),
    Leave,
}

fn definition_kind(kind: &str) -> Option<ScopeKind> {
    match kind {
        "function_definition" => Some(ScopeKind::Function),
        "class_definition" => Some(ScopeKind::Class),
        _ => None,
    }
}

pub(crate) fn walk<'tree, V: ScopeVisitor<'tree>>(root: Node<'tree>, source: &[u8], visitor: &mut V) {
    let mut scopes: Vec<Scope> = Vec::new();
    let mut stack = vec![Step::Enter(root)];

    while let Some(step) = stack.pop() {
        let node = match step {
            Step::Enter(node) => node,
            Step::Leave => {
                if let Some(scope) = scopes.pop() {
                    visitor.leave_scope(&scope, &scopes);
                }
                continue;
            }
        };

        let scope = definition_kind(node.kind()).and_then(|kind| {
            node_name(&node, source).map(|name| Scope { name, kind })
        });

        match scope {
            Some(scope) => {
                visitor.enter_scope(&node, &scope, &scopes);
                scopes.push(scope);
                stack.push(Step::Leave);
            }
            None => visitor.visit(&node, &scopes),
        }

        let mut cursor = node.walk();
        let children: Vec<Node<'tree>> = node.named_children(&mut cursor).collect();
        stack.extend(children.into_iter().rev().map(Step::Enter));
    }
}

/// Dotted path `module.scope1.scope2`.
pub(crate) fn scope_path(module: &str, scopes: &[Scope]) -> String {
    let mut path = module.to_string();
    for scope in scopes {
        path.push('.');
        path.push_str(&scope.name);
    }
    path
}

/// Dotted path `module.scope1.scope2.name`.
pub(crate) fn qualify(module: &str, scopes: &[Scope], name: &str) -> String {
    let mut path = scope_path(module, scopes);
    path.push('.');
    path.push_str(name);
    path
}
