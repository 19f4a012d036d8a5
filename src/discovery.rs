//
//  discovery.rs
//  callmap
//
//  Created by hak (tharun)
//

//! Source file collection.

use ignore::WalkBuilder;
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ResolverConfig;
use crate::error::{CallmapError, Result};
use crate::parser::is_source_file;

/// One source file, path relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub rel_path: PathBuf,
    pub source: String,
}

/// All sources of a project, in file-name order.
#[derive(Debug, Clone)]
pub struct SourceSet {
    /// Absolute project root.
    pub root: PathBuf,
    pub files: Vec<SourceFile>,
}

/// Collect the sources under `target`.
///
/// A directory is walked recursively. A single `.py` file is accepted as
/// well: its parent becomes the root and the file is the only source.
pub fn collect_sources(target: &Path, config: &ResolverConfig) -> Result<SourceSet> {
    if !target.exists() {
        return Err(CallmapError::InvalidRoot(target.to_path_buf()));
    }
    let target = fs::canonicalize(target)?;

    if target.is_file() {
        if !is_source_file(&target) {
            return Err(CallmapError::NotSourceFile(target));
        }
        let root = target
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| CallmapError::InvalidRoot(target.clone()))?;
        let rel_path = PathBuf::from(target.file_name().unwrap_or_default());
        let source = fs::read_to_string(&target)?;
        return Ok(SourceSet {
            root,
            files: vec![SourceFile { rel_path, source }],
        });
    }

    if !target.is_dir() {
        return Err(CallmapError::InvalidRoot(target));
    }

    let paths = walk_source_paths(&target, config)?;
    tracing::debug!(root = %target.display(), file_count = paths.len(), "Collected source files");

    let files = paths
        .par_iter()
        .map(|path| -> Result<SourceFile> {
            let source = fs::read_to_string(path)?;
            let rel_path = path.strip_prefix(&target).unwrap_or(path).to_path_buf();
            Ok(SourceFile { rel_path, source })
        })
        .collect::<Result<Vec<SourceFile>>>()?;

    Ok(SourceSet {
        root: target,
        files,
    })
}

fn walk_source_paths(root: &Path, config: &ResolverConfig) -> Result<Vec<PathBuf>> {
    let excluded: HashSet<String> = config.exclude.iter().cloned().collect();

    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(config.follow_symlinks)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            entry.depth() == 0
                || !is_dir
                || !excluded.contains(entry.file_name().to_string_lossy().as_ref())
        })
        .build();

    let mut paths = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| CallmapError::Walk(e.to_string()))?;
        // Symlinked files report a symlink file type unless links are followed.
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        if is_source_file(entry.path()) {
            paths.push(entry.into_path());
        }
    }
    Ok(paths)
}
