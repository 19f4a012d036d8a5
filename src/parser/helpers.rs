//
//  helpers.rs
//  callmap
//
//  Created by hak (tharun)
//

use tree_sitter::Node;
use std::path::{Component, Path};

/// Get the text of a node, empty on invalid UTF-8.
pub fn node_text<'a>(node: &Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

/// Get the `name` field of a definition node.
pub fn node_name(node: &Node, source: &[u8]) -> Option<String> {
    let name_node = node.child_by_field_name("name")?;
    let name = node_text(&name_node, source);
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// All children of a node, named or not, in document order.
pub fn children<'tree>(node: &Node<'tree>) -> Vec<Node<'tree>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

/// 1-based first line of a node.
pub fn start_line(node: &Node) -> usize {
    node.start_position().row + 1
}

/// 1-based last line of a node (inclusive).
pub fn end_line(node: &Node) -> usize {
    node.end_position().row + 1
}

/// Verbatim source lines `start..=end` (1-based), clamped to the file.
pub fn line_snippet(source: &str, start: usize, end: usize) -> String {
    let start = start.max(1);
    source
        .split_inclusive('\n')
        .skip(start - 1)
        .take((end + 1).saturating_sub(start))
        .collect()
}

/// Number of lines in a source file, at least 1.
pub fn line_count(source: &str) -> usize {
    source.lines().count().max(1)
}

/// Convert a project-relative path to a dotted module name.
///
/// `pkg/sub/mod.py` becomes `pkg.sub.mod`.
pub fn module_name_from_path(rel_path: &Path) -> String {
    rel_path
        .with_extension("")
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_name_from_nested_path() {
        assert_eq!(module_name_from_path(Path::new("pkg/sub/mod.py")), "pkg.sub.mod");
        assert_eq!(module_name_from_path(Path::new("script.py")), "script");
        assert_eq!(module_name_from_path(Path::new("pkg/__init__.py")), "pkg.__init__");
    }

    #[test]
    fn test_line_snippet_clamps_bounds() {
        assert_eq!(line_snippet("line1\n", 0, 10), "line1\n");
        assert_eq!(line_snippet("a\nb\nc\n", 2, 3), "b\nc\n");
        assert_eq!(line_snippet("a\nb", 2, 2), "b");
    }

    #[test]
    fn test_line_count_never_zero() {
        assert_eq!(line_count(""), 1);
        assert_eq!(line_count("a\nb\n"), 2);
    }
}
