//
//  types.rs
//  callmap
//
//  Created by hak (tharun)
//

use indexmap::IndexMap;
use serde::Serialize;

/// What a graph node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Function,
    File,
    Attribute,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub module: Option<String>,
    /// Project-relative path with `/` separators.
    pub file: Option<String>,
    pub symbol_id: Option<String>,
    pub cluster: Option<String>,
}

/// Aggregated calls from `src` to `dst`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub src: String,
    pub dst: String,
    pub call_count: usize,
    /// One line per call, in call order, duplicates kept.
    pub line_numbers: Vec<usize>,
}

impl GraphEdge {
    fn new(src: &str, dst: &str) -> Self {
        Self {
            src: src.to_string(),
            dst: dst.to_string(),
            call_count: 0,
            line_numbers: Vec::new(),
        }
    }

    pub fn add_call(&mut self, lineno: usize) {
        self.call_count += 1;
        self.line_numbers.push(lineno);
    }
}

/// A directed call graph with insertion-ordered nodes and edges.
#[derive(Debug, Clone, Default)]
pub struct CallGraph {
    nodes: IndexMap<String, GraphNode>,
    edges: IndexMap<(String, String), GraphEdge>,
}

impl CallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &IndexMap<String, GraphNode> {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn edge(&self, src: &str, dst: &str) -> Option<&GraphEdge> {
        self.edges.get(&(src.to_string(), dst.to_string()))
    }

    pub fn iter_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub(crate) fn add_node(&mut self, node: GraphNode) {
        self.nodes.insert(node.id.clone(), node);
    }

    /// Count one call on the edge `src -> dst`, creating it if needed.
    ///
    /// Self-loops are ignored.
    pub(crate) fn record_call(&mut self, src: &str, dst: &str, lineno: usize) {
        if src == dst {
            return;
        }
        self.edges
            .entry((src.to_string(), dst.to_string()))
            .or_insert_with(|| GraphEdge::new(src, dst))
            .add_call(lineno);
    }

    /// Drop nodes not accepted by `keep` and every edge touching them.
    pub(crate) fn retain_nodes(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.nodes.retain(|id, _| keep(id));
        let nodes = &self.nodes;
        self.edges
            .retain(|(src, dst), _| nodes.contains_key(src) && nodes.contains_key(dst));
    }

    pub(crate) fn remove_edges(&mut self, keys: &[(String, String)]) {
        for key in keys {
            self.edges.shift_remove(key);
        }
    }

    pub fn to_export(&self) -> GraphExport<'_> {
        GraphExport {
            nodes: self.nodes.values().collect(),
            edges: self.edges.values().collect(),
        }
    }

    /// Pretty JSON with nodes and edges as lists.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_export())?)
    }
}

#[derive(Debug, Serialize)]
pub struct GraphExport<'a> {
    pub nodes: Vec<&'a GraphNode>,
    pub edges: Vec<&'a GraphEdge>,
}
