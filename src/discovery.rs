//! Candidate file discovery.

use crate::config::DiscoveryConfig;
use crate::ts::Grammar;
use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("invalid glob: {0}")]
    Glob(#[from] globset::Error),

    #[error("invalid skip pattern: {0}")]
    Regex(#[from] regex::Error),
}

/// Compiled inclusion rules from the `[discovery]` config section.
#[derive(Debug, Clone)]
pub struct FileFilter {
    include: GlobSet,
    exclude: GlobSet,
    skip: Vec<Regex>,
}

impl FileFilter {
    pub fn from_config(config: &DiscoveryConfig) -> Result<Self, DiscoveryError> {
        Ok(Self {
            include: build_glob_set(&config.include)?,
            exclude: build_glob_set(&config.exclude)?,
            skip: config
                .skip_patterns
                .iter()
                .map(|p| Regex::new(p))
                .collect::<Result<_, _>>()?,
        })
    }

    /// Decide on a path relative to the discovery root.
    pub fn matches(&self, relative: &Path) -> bool {
        if !Grammar::supports(relative) {
            return false;
        }
        if !self.include.is_match(relative) || self.exclude.is_match(relative) {
            return false;
        }

        let normalized = relative.to_string_lossy().replace('\\', "/");
        !self.skip.iter().any(|re| re.is_match(&normalized))
    }
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet, globset::Error> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    builder.build()
}

/// Dependency trees and hidden directories are never searched.
fn is_pruned(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name == "node_modules" || name.starts_with('.'))
}

/// Walk `root` and hand every matching file to `emit`.
///
/// Walk errors are handed over too rather than aborting the walk. Stops early
/// when `emit` returns `false`.
pub fn discover<F>(root: &Path, filter: &FileFilter, mut emit: F)
where
    F: FnMut(Result<PathBuf, walkdir::Error>) -> bool,
{
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_pruned(entry));

    for entry in walker {
        let keep_going = match entry {
            Ok(entry) => {
                if !entry.file_type().is_file() {
                    continue;
                }
                let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
                if !filter.matches(relative) {
                    continue;
                }
                emit(Ok(entry.into_path()))
            }
            Err(err) => emit(Err(err)),
        };

        if !keep_going {
            break;
        }
    }
}
