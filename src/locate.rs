//! Source discovery.
//!
//! Walks the site directory and returns every regular file whose absolute
//! path matches the include pattern and does not match the exclude pattern.
//! Patterns are regular expressions applied to the whole path string, so
//! `org$` picks up `posts/hello.org` anywhere in the tree and an exclude
//! such as `/drafts/` drops an entire subtree's files.
//!
//! The walk is iterative (walkdir keeps its own stack of open directories)
//! and never descends into an entry whose path ends in the current-directory
//! marker `.`, which would otherwise walk the same directory forever.
//! Symbolic links are not followed.
//!
//! Results are sorted by file name within each directory so repeated runs
//! write files in the same order; nothing downstream relies on that order.

use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum LocateError {
    #[error("cannot walk source directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Collect every qualifying file below `dir`.
///
/// Any I/O failure during the walk (missing directory, permission denied)
/// aborts the whole search; there is no partial result.
pub fn locate(dir: &Path, include: &Regex, exclude: &Regex) -> Result<Vec<PathBuf>, LocateError> {
    let walker = WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_self_reference(e));

    let mut found = Vec::new();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path().to_string_lossy();
        if include.is_match(&path) && !exclude.is_match(&path) {
            debug!(path = %path, "located source");
            found.push(entry.into_path());
        }
    }
    Ok(found)
}

/// `Path::components` silently drops interior `.` segments, so the check
/// runs on the raw path bytes.
fn is_self_reference(entry: &DirEntry) -> bool {
    let raw = entry.path().as_os_str().as_encoded_bytes();
    raw == b"." || raw.ends_with(b"/.") || (cfg!(windows) && raw.ends_with(b"\\."))
}
