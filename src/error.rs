//
//  error.rs
//  callmap
//
//  Created by hak (tharun)
//

//! Error types for callmap.
//!
//! Unresolved and ambiguous call targets are not errors: they are recorded
//! as data on the resolved project. Everything here is fatal for the run.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CallmapError {
    #[error("Project root does not exist or is not a directory: {0}")]
    InvalidRoot(PathBuf),

    #[error("Target is not a .py file: {0}")]
    NotSourceFile(PathBuf),

    #[error("Syntax error in {file}:{line}:{column}")]
    Syntax {
        file: PathBuf,
        line: usize,
        column: usize,
    },

    #[error("Unsupported node granularity: {0}")]
    UnsupportedGranularity(String),

    #[error("Filter contains no keywords: {0:?}")]
    EmptyFilter(String),

    #[error("Failed to initialize Python parser: {0}")]
    ParserInit(String),

    #[error("Directory walk failed: {0}")]
    Walk(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, CallmapError>;
