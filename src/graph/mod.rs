//
//  mod.rs
//  callmap
//
//  Created by hak (tharun)
//

//! Call graph construction from a resolved project.
//!
//! Selects node granularity, aggregates calls into edges, assigns clusters,
//! and applies keyword filtering and transitive reduction.

pub mod builder;
pub mod filter;
pub mod prune;
pub mod types;

pub use builder::{build_call_graph, map_symbol};
pub use filter::{filter_project, node_matches};
pub use prune::prune_transitive_edges;
pub use types::{CallGraph, GraphEdge, GraphExport, GraphNode, NodeKind};
