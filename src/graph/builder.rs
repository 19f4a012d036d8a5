//
//  builder.rs
//  callmap
//
//  Created by hak (tharun)
//

use tracing::{debug, info};

use crate::config::{GraphConfig, NodeGranularity};
use crate::resolver::types::{slash_path, ResolvedProject, Symbol, SymbolKind};
use super::filter::apply_keyword_filter;
use super::prune::prune_transitive_edges;
use super::types::{CallGraph, GraphNode, NodeKind};

/// Build a call graph from a resolved project.
///
/// Nodes are created first, then calls are aggregated into edges, then the
/// keyword filter and transitive reduction run in that order.
pub fn build_call_graph(project: &ResolvedProject, config: &GraphConfig) -> CallGraph {
    let mut graph = CallGraph::new();

    for symbol in project.symbols().values() {
        if let Some(node) = node_for_symbol(project, symbol, config) {
            graph.add_node(node);
        }
    }

    let mut dropped = 0usize;
    for call in project.calls() {
        let src = map_symbol(project, &call.caller_id, config.node_granularity);
        let dst = call
            .callee_id
            .as_deref()
            .and_then(|id| map_symbol(project, id, config.node_granularity));
        match (src, dst) {
            (Some(src), Some(dst)) if graph.contains_node(src) && graph.contains_node(dst) => {
                graph.record_call(src, dst, call.location.lineno);
            }
            _ => dropped += 1,
        }
    }
    debug!(
        granularity = %config.node_granularity,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        dropped_calls = dropped,
        "Aggregated calls into edges"
    );

    if !config.filter_keywords.is_empty() {
        apply_keyword_filter(&mut graph, config);
    }

    if config.prune_transitive {
        prune_transitive_edges(&mut graph);
    }

    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Built call graph"
    );
    graph
}

/// Node id a symbol maps to at the given granularity.
pub fn map_symbol<'p>(
    project: &'p ResolvedProject,
    symbol_id: &str,
    granularity: NodeGranularity,
) -> Option<&'p str> {
    let symbol = project.symbol(symbol_id)?;
    match granularity {
        NodeGranularity::Function => symbol.kind.is_callable().then_some(symbol.id.as_str()),
        NodeGranularity::File => Some(symbol.module.as_str()),
    }
}

fn node_for_symbol(
    project: &ResolvedProject,
    symbol: &Symbol,
    config: &GraphConfig,
) -> Option<GraphNode> {
    let kind = match (config.node_granularity, symbol.kind) {
        (NodeGranularity::Function, SymbolKind::Function | SymbolKind::Method) => NodeKind::Function,
        (NodeGranularity::Function, SymbolKind::Attribute) => NodeKind::Attribute,
        (NodeGranularity::File, SymbolKind::Module) => NodeKind::File,
        _ => return None,
    };
    let label = match kind {
        NodeKind::File => symbol.module.clone(),
        _ => symbol.name.clone(),
    };
    let cluster = config
        .cluster_by_module
        .then(|| cluster_for(project, symbol, config.node_granularity));

    Some(GraphNode {
        id: symbol.id.clone(),
        label,
        kind,
        module: Some(symbol.module.clone()),
        file: Some(slash_path(&symbol.file)),
        symbol_id: Some(symbol.id.clone()),
        cluster,
    })
}

/// Innermost enclosing class, else the module. At file granularity, the
/// top-level package.
fn cluster_for(project: &ResolvedProject, symbol: &Symbol, granularity: NodeGranularity) -> String {
    if granularity == NodeGranularity::File {
        return symbol
            .module
            .split('.')
            .next()
            .unwrap_or(&symbol.module)
            .to_string();
    }

    let mut current = symbol.qualname.as_str();
    while let Some((parent, _)) = current.rsplit_once('.') {
        if parent.len() <= symbol.module.len() {
            break;
        }
        if project
            .symbol(parent)
            .is_some_and(|s| s.kind == SymbolKind::Class)
        {
            return parent.to_string();
        }
        current = parent;
    }
    symbol.module.clone()
}
