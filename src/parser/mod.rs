//
//  mod.rs
//  callmap
//
//  Created by hak (tharun)
//

//! Python parsing on top of tree-sitter.
//!
//! tree-sitter recovers from errors and always yields a tree. A project
//! with a broken file must not produce a partial graph, so any error or
//! missing node in the tree is turned into [`CallmapError::Syntax`].
//!
//! The grammar is also looser than Python 3: it accepts hard keywords as
//! identifiers and still knows the Python 2 `print` and `exec` statements.
//! Both are rejected as syntax errors too.

mod helpers;

use tree_sitter::{Language, Node, Parser, Tree};
use std::path::{Path, PathBuf};

use crate::error::{CallmapError, Result};

pub use helpers::{
    children, end_line, line_count, line_snippet, module_name_from_path, node_name, node_text,
    start_line,
};

/// Extension of recognized source files.
pub const SOURCE_EXTENSION: &str = "py";

/// Python 3 hard keywords. None of them may name anything.
pub const PY_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Python 2 statements the grammar still parses.
const LEGACY_STATEMENTS: &[&str] = &["print_statement", "exec_statement"];

/// Check whether a path names a Python source file.
pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == SOURCE_EXTENSION)
}

/// A parsed source file, ready for extraction and call resolution.
pub struct ParsedModule {
    /// Path relative to the project root.
    pub rel_path: PathBuf,
    /// Dotted module name derived from `rel_path`.
    pub module: String,
    pub source: String,
    pub tree: Tree,
}

impl ParsedModule {
    pub fn root_node(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn source_bytes(&self) -> &[u8] {
        self.source.as_bytes()
    }
}

fn python_language() -> Language {
    tree_sitter_python::LANGUAGE.into()
}

/// Parse one source file. Fails on the first syntax error in the file.
///
/// `\r\n` and bare `\r` line endings are rewritten to `\n` first, so line
/// numbers and block structure match what Python sees.
pub fn parse_module(rel_path: &Path, source: String) -> Result<ParsedModule> {
    let source = normalize_newlines(source);

    let mut parser = Parser::new();
    parser
        .set_language(&python_language())
        .map_err(|e| CallmapError::ParserInit(e.to_string()))?;

    let tree = parser.parse(&source, None).ok_or_else(|| {
        CallmapError::ParserInit(format!("no tree produced for {}", rel_path.display()))
    })?;

    if let Some(bad) = first_invalid_node(tree.root_node(), source.as_bytes()) {
        let pos = bad.start_position();
        return Err(CallmapError::Syntax {
            file: rel_path.to_path_buf(),
            line: pos.row + 1,
            column: pos.column,
        });
    }

    Ok(ParsedModule {
        rel_path: rel_path.to_path_buf(),
        module: module_name_from_path(rel_path),
        source,
        tree,
    })
}

/// Rewrite `\r\n` and lone `\r` to `\n`.
pub fn normalize_newlines(source: String) -> String {
    if !source.contains('\r') {
        return source;
    }
    source.replace("\r\n", "\n").replace('\r', "\n")
}

/// First node in document order that Python would reject.
fn first_invalid_node<'tree>(root: Node<'tree>, source: &[u8]) -> Option<Node<'tree>> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if is_invalid(&node, source) {
            return Some(node);
        }
        stack.extend(children(&node).into_iter().rev());
    }
    None
}

fn is_invalid(node: &Node, source: &[u8]) -> bool {
    if node.is_error() || node.is_missing() {
        return true;
    }
    match node.kind() {
        kind if LEGACY_STATEMENTS.contains(&kind) => true,
        "identifier" => is_keyword(node_text(node, source)),
        "function_definition" | "class_definition" => node
            .child_by_field_name("name")
            .is_some_and(|name| is_keyword(node_text(&name, source))),
        _ => false,
    }
}

fn is_keyword(text: &str) -> bool {
    PY_KEYWORDS.contains(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_module() {
        let parsed = parse_module(Path::new("pkg/a.py"), "def f():\n    return 1\n".into()).unwrap();
        assert_eq!(parsed.module, "pkg.a");
        assert_eq!(parsed.root_node().kind(), "module");
    }

    #[test]
    fn test_parse_reports_syntax_error_location() {
        let err = parse_module(Path::new("bad.py"), "x = 1\ndef broken(:\n    pass\n".into())
            .err()
            .unwrap();
        match err {
            CallmapError::Syntax { file, line, .. } => {
                assert_eq!(file, PathBuf::from("bad.py"));
                assert_eq!(line, 2);
            }
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_keyword_as_function_name_is_syntax_error() {
        for kw in PY_KEYWORDS {
            let source = format!("def {kw}():\n    pass\n");
            match parse_module(Path::new("m.py"), source) {
                Err(CallmapError::Syntax { line, .. }) => assert_eq!(line, 1, "keyword {kw}"),
                Err(other) => panic!("keyword {kw}: expected syntax error, got {other:?}"),
                Ok(_) => panic!("keyword {kw}: accepted as a function name"),
            }
        }
    }

    #[test]
    fn test_keyword_in_other_name_positions_is_syntax_error() {
        for source in ["class if:\n    pass\n", "x = 1\nif = 2\n", "def f(while):\n    pass\n"] {
            assert!(
                matches!(
                    parse_module(Path::new("m.py"), source.to_string()),
                    Err(CallmapError::Syntax { .. })
                ),
                "{source:?}"
            );
        }
    }

    #[test]
    fn test_python2_statements_are_syntax_errors() {
        let cases = [
            ("print 'hi'\n", 1),
            ("exec 'x = 1'\n", 1),
            ("import sys\nprint >>sys.stderr, 'x'\n", 2),
        ];
        for (source, expected_line) in cases {
            match parse_module(Path::new("old.py"), source.to_string()) {
                Err(CallmapError::Syntax { line, .. }) => assert_eq!(line, expected_line, "{source:?}"),
                other => panic!("{source:?}: expected syntax error, got {:?}", other.err()),
            }
        }
    }

    #[test]
    fn test_python3_print_and_soft_keywords_parse() {
        let source = "print('hi')\nexec('x = 1')\nmatch = 1\ntype = print\n";
        assert!(parse_module(Path::new("ok.py"), source.to_string()).is_ok());
    }

    #[test]
    fn test_carriage_returns_become_newlines() {
        let parsed = parse_module(Path::new("mac.py"), "def f():\r    pass\r".into()).unwrap();
        assert_eq!(parsed.source, "def f():\n    pass\n");
        let def = parsed.root_node().named_child(0).unwrap();
        assert_eq!(def.kind(), "function_definition");
        assert_eq!(end_line(&def), 2);

        let parsed = parse_module(Path::new("win.py"), "a = 1\r\nb = 2\r\n".into()).unwrap();
        assert_eq!(parsed.source, "a = 1\nb = 2\n");
        assert_eq!(normalize_newlines("a\r\n\rb".into()), "a\n\nb");
    }

    #[test]
    fn test_empty_source_parses() {
        let parsed = parse_module(Path::new("empty.py"), String::new()).unwrap();
        assert_eq!(parsed.module, "empty");
    }

    #[test]
    fn test_is_source_file() {
        assert!(is_source_file(Path::new("a/b.py")));
        assert!(!is_source_file(Path::new("a/b.txt")));
        assert!(!is_source_file(Path::new("a/py")));
    }
}
