//! # callmap
//!
//! Static symbol tables and call graphs for Python projects.
//!
//! Analysis runs in two stages:
//!
//! - **Resolver**: collects `.py` files, extracts modules, classes,
//!   functions, methods and class attribute groups, then resolves every
//!   call site through import aliases and a project-wide symbol index.
//! - **Graph builder**: turns the resolved project into a call graph at
//!   function or file granularity, with clustering, keyword filtering and
//!   optional transitive reduction.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use callmap::{build_call_graph, resolve_project, GraphConfig, ResolverConfig};
//!
//! let project = resolve_project("src".as_ref(), &ResolverConfig::default()).unwrap();
//! let graph = build_call_graph(&project, &GraphConfig::default());
//! println!("{}", graph.to_json().unwrap());
//! ```

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod graph;
pub mod parser;
pub mod resolver;

pub use config::{CallmapConfig, GraphConfig, NodeGranularity, ResolverConfig};
pub use discovery::{collect_sources, SourceFile, SourceSet};
pub use error::{CallmapError, Result};
pub use graph::{build_call_graph, filter_project, CallGraph, GraphEdge, GraphNode, NodeKind};
pub use resolver::{
    resolve_project, resolve_sources, AmbiguousReference, Call, ResolvedProject, SourceLocation,
    Symbol, SymbolKind,
};
