//
//  config.rs
//  callmap
//
//  Created by hak (tharun)
//

//! Configuration for resolution and graph building.
//!
//! Values come from an optional `callmap.toml` and are overridden by CLI
//! flags. Every key has a serde default.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{CallmapError, Result};

/// File looked up in the project root when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "callmap.toml";

/// Directory names never descended into.
pub const DEFAULT_EXCLUDE: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "__pycache__",
    ".mypy_cache",
    ".pytest_cache",
    ".venv",
    "venv",
    "env",
];

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallmapConfig {
    pub resolver: ResolverConfig,
    pub graph: GraphConfig,
}

/// File collection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default)]
    pub follow_symlinks: bool,
    /// Directory names to skip anywhere in the tree.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

fn default_exclude() -> Vec<String> {
    DEFAULT_EXCLUDE.iter().map(|s| s.to_string()).collect()
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            exclude: default_exclude(),
        }
    }
}

/// What one graph node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeGranularity {
    #[default]
    Function,
    File,
}

impl NodeGranularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeGranularity::Function => "function",
            NodeGranularity::File => "file",
        }
    }
}

impl FromStr for NodeGranularity {
    type Err = CallmapError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "function" => Ok(NodeGranularity::Function),
            "file" => Ok(NodeGranularity::File),
            other => Err(CallmapError::UnsupportedGranularity(other.to_string())),
        }
    }
}

impl fmt::Display for NodeGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Graph building settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphConfig {
    pub node_granularity: NodeGranularity,
    pub cluster_by_module: bool,
    pub prune_transitive: bool,
    /// Empty means no filtering.
    pub filter_keywords: Vec<String>,
    /// Grow the filtered set along outgoing edges. No effect without keywords.
    pub link_by_filter: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            node_granularity: NodeGranularity::Function,
            cluster_by_module: true,
            prune_transitive: false,
            filter_keywords: Vec::new(),
            link_by_filter: false,
        }
    }
}

/// `[graph]` as written in the file, before validation.
#[derive(Debug, Deserialize)]
struct GraphSection {
    #[serde(default = "default_granularity")]
    node_granularity: String,
    #[serde(default = "default_true")]
    cluster_by_module: bool,
    #[serde(default)]
    prune_transitive: bool,
    #[serde(default)]
    filter_keywords: Vec<String>,
    #[serde(default)]
    link_by_filter: bool,
}

fn default_granularity() -> String {
    NodeGranularity::default().as_str().to_string()
}

fn default_true() -> bool {
    true
}

impl Default for GraphSection {
    fn default() -> Self {
        Self {
            node_granularity: default_granularity(),
            cluster_by_module: true,
            prune_transitive: false,
            filter_keywords: Vec::new(),
            link_by_filter: false,
        }
    }
}

impl TryFrom<GraphSection> for GraphConfig {
    type Error = CallmapError;

    fn try_from(section: GraphSection) -> Result<Self> {
        Ok(Self {
            node_granularity: section.node_granularity.parse()?,
            cluster_by_module: section.cluster_by_module,
            prune_transitive: section.prune_transitive,
            filter_keywords: section.filter_keywords,
            link_by_filter: section.link_by_filter,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    resolver: ResolverConfig,
    #[serde(default)]
    graph: GraphSection,
}

impl CallmapConfig {
    /// Parse TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents)?;
        Ok(Self {
            resolver: file.resolver,
            graph: file.graph.try_into()?,
        })
    }

    /// Load a config file that must exist.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Load `callmap.toml` from a project directory, or defaults when absent.
    pub fn discover(project_dir: &Path) -> Result<Self> {
        let path = project_dir.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            return Ok(Self::default());
        }
        tracing::debug!(path = %path.display(), "Loading config");
        Self::load(&path)
    }
}
