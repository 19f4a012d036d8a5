//
//  mod.rs
//  callmap
//
//  Created by hak (tharun)
//

//! Command line front end.
//!
//! Runs the resolver and graph builder over a project and prints a summary,
//! the resolved project as JSON, or the call graph as JSON.

use clap::{Parser, ValueEnum};
use tracing::info;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::config::CallmapConfig;
use crate::error::{CallmapError, Result};
use crate::graph::{build_call_graph, filter_project};
use crate::resolver::{resolve_project, ResolvedProject};

#[derive(Parser, Debug)]
#[command(name = "callmap")]
#[command(about = "Static call graphs for Python projects", long_about = None)]
pub struct Cli {
    /// Project directory or a single .py file
    pub root: PathBuf,

    /// What to print
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Summary)]
    pub format: OutputFormat,

    /// Node granularity for graph output: function or file
    #[arg(long = "node-type")]
    pub node_type: Option<String>,

    /// Do not assign clusters to graph nodes
    #[arg(long)]
    pub no_cluster: bool,

    /// Remove edges implied by longer paths
    #[arg(long)]
    pub prune_transitive: bool,

    /// Comma-separated keywords; keep only matching functions
    #[arg(long)]
    pub filter: Option<String>,

    /// Also keep everything reachable from filtered nodes
    #[arg(long)]
    pub link_by_filter: bool,

    /// Follow symlinked files and directories
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Extra directory names to skip (repeatable)
    #[arg(long = "exclude", value_name = "DIR")]
    pub exclude: Vec<String>,

    /// Config file (default: callmap.toml in the project root)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write output to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Counts and module list
    Summary,
    /// Resolved symbols and calls
    Json,
    /// Call graph nodes and edges
    Graph,
}

/// Run the command and write its output.
pub fn run(cli: &Cli) -> Result<()> {
    let output = render(cli)?;
    match &cli.output {
        Some(path) => {
            std::fs::write(path, &output)?;
            info!(path = %path.display(), "Wrote output");
        }
        None => print!("{output}"),
    }
    Ok(())
}

/// Produce the output text for a command line.
pub fn render(cli: &Cli) -> Result<String> {
    let config = effective_config(cli)?;
    let keywords = &config.graph.filter_keywords;

    let project = resolve_project(&cli.root, &config.resolver)?;

    match cli.format {
        OutputFormat::Summary => {
            let project = if keywords.is_empty() {
                project
            } else {
                filter_project(&project, keywords, config.graph.link_by_filter)
            };
            Ok(summary(&project))
        }
        OutputFormat::Json => {
            let project = if keywords.is_empty() {
                project
            } else {
                filter_project(&project, keywords, config.graph.link_by_filter)
            };
            Ok(format!("{}\n", project.to_json()?))
        }
        OutputFormat::Graph => {
            let graph = build_call_graph(&project, &config.graph);
            Ok(format!("{}\n", graph.to_json()?))
        }
    }
}

/// Config file values with command line flags applied on top.
pub fn effective_config(cli: &Cli) -> Result<CallmapConfig> {
    let mut config = match &cli.config {
        Some(path) => CallmapConfig::load(path)?,
        None => CallmapConfig::discover(&project_dir(&cli.root))?,
    };

    if cli.follow_symlinks {
        config.resolver.follow_symlinks = true;
    }
    config.resolver.exclude.extend(cli.exclude.iter().cloned());

    if let Some(node_type) = &cli.node_type {
        config.graph.node_granularity = node_type.parse()?;
    }
    if cli.no_cluster {
        config.graph.cluster_by_module = false;
    }
    if cli.prune_transitive {
        config.graph.prune_transitive = true;
    }
    if let Some(filter) = &cli.filter {
        config.graph.filter_keywords = parse_keywords(filter)?;
    }
    if cli.link_by_filter {
        config.graph.link_by_filter = true;
    }
    Ok(config)
}

/// Split a comma-separated filter into trimmed, non-empty keywords.
pub fn parse_keywords(filter: &str) -> Result<Vec<String>> {
    let keywords: Vec<String> = filter
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect();
    if keywords.is_empty() {
        return Err(CallmapError::EmptyFilter(filter.to_string()));
    }
    Ok(keywords)
}

fn project_dir(root: &Path) -> PathBuf {
    if root.is_file() {
        root.parent().map(Path::to_path_buf).unwrap_or_default()
    } else {
        root.to_path_buf()
    }
}

fn summary(project: &ResolvedProject) -> String {
    let modules = project.modules();
    let mut out = String::new();
    let _ = writeln!(out, "Project root: {}", project.root().display());
    let _ = writeln!(out, "  Symbols   : {}", project.symbols().len());
    let _ = writeln!(out, "  Functions : {}", project.functions().len());
    let _ = writeln!(out, "  Calls     : {}", project.calls().len());
    let _ = writeln!(out, "  Ambiguous : {}", project.ambiguous().len());
    let _ = writeln!(out, "  Modules   : {}", modules.len());
    for module in modules {
        let _ = writeln!(out, "    - {module}");
    }
    out
}
