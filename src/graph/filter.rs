//
//  filter.rs
//  callmap
//
//  Created by hak (tharun)
//

//! Keyword filtering of graphs and projects.

use tracing::debug;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::config::{GraphConfig, NodeGranularity};
use crate::resolver::types::{AmbiguousReference, ResolvedProject, SymbolKind};
use super::builder::build_call_graph;
use super::types::{CallGraph, GraphNode};

/// Case-sensitive substring match of any keyword against a node.
///
/// Function nodes match on short name or qualname, file nodes on module.
pub fn node_matches(node: &GraphNode, keywords: &[String], granularity: NodeGranularity) -> bool {
    let fields: [&str; 2] = match granularity {
        NodeGranularity::Function => [
            node.label.as_str(),
            node.symbol_id.as_deref().unwrap_or(&node.id),
        ],
        NodeGranularity::File => {
            let module = node.module.as_deref().unwrap_or(&node.id);
            [module, module]
        }
    };
    keywords
        .iter()
        .any(|kw| fields.iter().any(|field| field.contains(kw.as_str())))
}

/// Keep matching nodes, optionally grown along outgoing edges, and the
/// edges between kept nodes.
pub(crate) fn apply_keyword_filter(graph: &mut CallGraph, config: &GraphConfig) {
    let mut kept: HashSet<String> = graph
        .nodes()
        .values()
        .filter(|node| node_matches(node, &config.filter_keywords, config.node_granularity))
        .map(|node| node.id.clone())
        .collect();
    let matched = kept.len();

    if config.link_by_filter {
        let mut successors: HashMap<&str, Vec<&str>> = HashMap::new();
        for edge in graph.iter_edges() {
            successors
                .entry(edge.src.as_str())
                .or_default()
                .push(edge.dst.as_str());
        }
        let mut queue: VecDeque<String> = kept.iter().cloned().collect();
        while let Some(id) = queue.pop_front() {
            for &next in successors.get(id.as_str()).map(Vec::as_slice).unwrap_or(&[]) {
                if kept.insert(next.to_string()) {
                    queue.push_back(next.to_string());
                }
            }
        }
    }

    debug!(
        keywords = ?config.filter_keywords,
        matched,
        linked = kept.len() - matched,
        "Applied keyword filter"
    );
    graph.retain_nodes(|id| kept.contains(id));
}

/// A new project restricted to what a function-level keyword filter keeps.
///
/// Kept symbols are the filtered graph's nodes plus the module symbols of
/// their modules. Calls are kept when the caller is a node and the callee
/// is unresolved or a node.
pub fn filter_project(project: &ResolvedProject, keywords: &[String], link_by_filter: bool) -> ResolvedProject {
    let config = GraphConfig {
        node_granularity: NodeGranularity::Function,
        cluster_by_module: false,
        prune_transitive: false,
        filter_keywords: keywords.to_vec(),
        link_by_filter,
    };
    let node_ids: HashSet<&str> = if keywords.is_empty() {
        HashSet::new()
    } else {
        let graph = build_call_graph(project, &config);
        graph
            .nodes()
            .values()
            .filter_map(|node| node.symbol_id.as_deref())
            .filter_map(|id| project.symbol(id).map(|s| s.id.as_str()))
            .collect()
    };

    let kept_modules: HashSet<&str> = node_ids
        .iter()
        .filter_map(|id| project.symbol(id))
        .map(|symbol| symbol.module.as_str())
        .collect();

    let symbols = project
        .symbols()
        .iter()
        .filter(|(id, symbol)| {
            node_ids.contains(id.as_str())
                || (symbol.kind == SymbolKind::Module && kept_modules.contains(symbol.id.as_str()))
        })
        .map(|(id, symbol)| (id.clone(), symbol.clone()))
        .collect();

    let mut new_index: HashMap<usize, usize> = HashMap::new();
    let mut calls = Vec::new();
    for (index, call) in project.calls().iter().enumerate() {
        let callee_kept = call
            .callee_id
            .as_deref()
            .map_or(true, |id| node_ids.contains(id));
        if node_ids.contains(call.caller_id.as_str()) && callee_kept {
            new_index.insert(index, calls.len());
            calls.push(call.clone());
        }
    }

    let ambiguous = project
        .ambiguous()
        .iter()
        .filter_map(|amb| {
            new_index.get(&amb.call_index).map(|&call_index| AmbiguousReference {
                call_index,
                ..amb.clone()
            })
        })
        .collect();

    ResolvedProject::new(project.root().to_path_buf(), symbols, calls, ambiguous)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::SourceFile;
    use crate::resolver::resolve_sources;
    use std::path::PathBuf;

    const APP: &[(&str, &str)] = &[
        (
            "api.py",
            "from core import process\n\ndef api_handler():\n    return process()\n\ndef api_health():\n    return 1\n",
        ),
        (
            "core.py",
            "from store import save\n\ndef process():\n    return save()\n\ndef unused():\n    missing()\n",
        ),
        ("store.py", "def save():\n    return 1\n"),
    ];

    fn project() -> ResolvedProject {
        let files = APP
            .iter()
            .map(|(path, text)| SourceFile {
                rel_path: PathBuf::from(path),
                source: text.to_string(),
            })
            .collect();
        resolve_sources(PathBuf::from("/project"), files).unwrap()
    }

    fn config(keywords: &[&str], link: bool) -> GraphConfig {
        GraphConfig {
            filter_keywords: keywords.iter().map(|k| k.to_string()).collect(),
            link_by_filter: link,
            ..GraphConfig::default()
        }
    }

    fn node_ids(graph: &CallGraph) -> Vec<&str> {
        graph.nodes().keys().map(String::as_str).collect()
    }

    #[test]
    fn test_filter_keeps_matching_nodes_only() {
        let graph = build_call_graph(&project(), &config(&["api"], false));
        assert_eq!(node_ids(&graph), vec!["api.api_handler", "api.api_health"]);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_link_by_filter_follows_outgoing_edges() {
        let graph = build_call_graph(&project(), &config(&["handler"], true));
        assert_eq!(
            node_ids(&graph),
            vec!["api.api_handler", "core.process", "store.save"]
        );
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_link_by_filter_does_not_follow_incoming_edges() {
        let graph = build_call_graph(&project(), &config(&["save"], true));
        assert_eq!(node_ids(&graph), vec!["store.save"]);
    }

    #[test]
    fn test_filter_matches_qualname_and_is_case_sensitive() {
        let graph = build_call_graph(&project(), &config(&["core."], false));
        assert_eq!(node_ids(&graph), vec!["core.process", "core.unused"]);

        let graph = build_call_graph(&project(), &config(&["API"], false));
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn test_file_granularity_filters_on_module() {
        let config = GraphConfig {
            node_granularity: NodeGranularity::File,
            ..config(&["core"], true)
        };
        let graph = build_call_graph(&project(), &config);
        assert_eq!(node_ids(&graph), vec!["core", "store"]);
        assert!(graph.edge("core", "store").is_some());
    }

    #[test]
    fn test_filter_project_keeps_nodes_modules_and_calls() {
        let filtered = filter_project(&project(), &["process".to_string()], true);
        let ids: Vec<&str> = filtered.symbols().keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["core", "core.process", "store", "store.save"]);

        let calls: Vec<(&str, Option<&str>)> = filtered
            .calls()
            .iter()
            .map(|c| (c.caller_id.as_str(), c.callee_id.as_deref()))
            .collect();
        assert_eq!(calls, vec![("core.process", Some("store.save"))]);
        assert_eq!(filtered.root(), project().root());
    }

    #[test]
    fn test_filter_project_keeps_unresolved_calls_of_kept_callers() {
        let filtered = filter_project(&project(), &["unused".to_string()], false);
        assert_eq!(filtered.calls().len(), 1);
        assert_eq!(filtered.calls()[0].raw_callee, "missing");
        assert_eq!(filtered.calls()[0].callee_id, None);
    }

    #[test]
    fn test_filter_project_without_keywords_keeps_nothing() {
        let filtered = filter_project(&project(), &[], false);
        assert!(filtered.symbols().is_empty());
        assert!(filtered.calls().is_empty());
    }
}
