//
//  prune.rs
//  callmap
//
//  Created by hak (tharun)
//

//! Transitive reduction of call graphs.

use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, EdgeReference, NodeIndex};
use petgraph::visit::{EdgeFiltered, EdgeRef};
use tracing::debug;
use std::collections::HashMap;

use super::types::CallGraph;

/// Remove every edge `u -> v` that is implied by another path from `u` to `v`.
///
/// Redundancy is decided against the unmodified edge set and all redundant
/// edges are removed together, so the result does not depend on edge order.
pub fn prune_transitive_edges(graph: &mut CallGraph) {
    let redundant = redundant_edges(graph);
    debug!(removed = redundant.len(), "Pruned transitive edges");
    graph.remove_edges(&redundant);
}

fn redundant_edges(graph: &CallGraph) -> Vec<(String, String)> {
    let mut digraph: DiGraph<&str, ()> = DiGraph::with_capacity(graph.node_count(), graph.edge_count());
    let mut indices: HashMap<&str, NodeIndex> = HashMap::with_capacity(graph.node_count());
    for id in graph.nodes().keys() {
        indices.insert(id.as_str(), digraph.add_node(id.as_str()));
    }

    let mut edges = Vec::with_capacity(graph.edge_count());
    for edge in graph.iter_edges() {
        if let (Some(&src), Some(&dst)) = (indices.get(edge.src.as_str()), indices.get(edge.dst.as_str())) {
            let index = digraph.add_edge(src, dst, ());
            edges.push((index, src, dst, edge));
        }
    }

    let mut redundant = Vec::new();
    for (skip, src, dst, edge) in edges {
        let without = EdgeFiltered::from_fn(&digraph, |e: EdgeReference<'_, ()>| e.id() != skip);
        if has_path_connecting(&without, src, dst, None) {
            redundant.push((edge.src.clone(), edge.dst.clone()));
        }
    }
    redundant
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::{GraphNode, NodeKind};

    fn graph(nodes: &[&str], edges: &[(&str, &str)]) -> CallGraph {
        let mut graph = CallGraph::new();
        for id in nodes {
            graph.add_node(GraphNode {
                id: id.to_string(),
                label: id.to_string(),
                kind: NodeKind::Function,
                module: None,
                file: None,
                symbol_id: None,
                cluster: None,
            });
        }
        for (line, (src, dst)) in edges.iter().enumerate() {
            graph.record_call(src, dst, line + 1);
        }
        graph
    }

    fn edge_pairs(graph: &CallGraph) -> Vec<(&str, &str)> {
        graph
            .iter_edges()
            .map(|e| (e.src.as_str(), e.dst.as_str()))
            .collect()
    }

    #[test]
    fn test_shortcut_edge_is_removed() {
        let mut g = graph(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("a", "c")]);
        prune_transitive_edges(&mut g);
        assert_eq!(edge_pairs(&g), vec![("a", "b"), ("b", "c")]);
    }

    #[test]
    fn test_fan_out_is_kept() {
        let mut g = graph(&["a", "b", "c"], &[("a", "b"), ("a", "c")]);
        prune_transitive_edges(&mut g);
        assert_eq!(edge_pairs(&g), vec![("a", "b"), ("a", "c")]);
    }

    #[test]
    fn test_longer_alternate_path_counts() {
        let mut g = graph(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("b", "c"), ("c", "d"), ("a", "d")],
        );
        prune_transitive_edges(&mut g);
        assert!(g.edge("a", "d").is_none());
        assert_eq!(g.edge_count(), 3);
    }

    #[test]
    fn test_cycle_edges_judged_against_original_set() {
        // a -> c is implied by a -> b -> c and b -> c by b -> a -> c, so both
        // go in the same batch even though that leaves c unreachable.
        let mut g = graph(&["a", "b", "c"], &[("a", "b"), ("b", "a"), ("b", "c"), ("a", "c")]);
        prune_transitive_edges(&mut g);
        assert_eq!(edge_pairs(&g), vec![("a", "b"), ("b", "a")]);
    }

    #[test]
    fn test_empty_graph() {
        let mut g = CallGraph::new();
        prune_transitive_edges(&mut g);
        assert_eq!(g.edge_count(), 0);
    }
}
