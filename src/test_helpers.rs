//! Shared test utilities for the orgpress test suite.
//!
//! Provides throwaway site builders and report lookups so generation tests
//! can describe a site inline and assert on what came out.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let site = SiteBuilder::new()
//!     .template("post.html", "<h1>{{ post.title }}</h1>{{ post.html }}")
//!     .post("posts/hello.org", "#+TITLE: Hello\n\nWorld\n")
//!     .build();
//!
//! let report = generate(&site.config("post.html")).unwrap();
//! assert_eq!(page_slugs(&report), vec!["hello"]);
//! assert!(read_output(&site, "output/hello.html").contains("World"));
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::Config;
use crate::generate::{GeneratedPage, Report};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Inline sites
// =========================================================================

/// Builds a site in a temp directory, one file at a time.
#[derive(Default)]
pub struct SiteBuilder {
    files: Vec<(PathBuf, String)>,
}

impl SiteBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `templates/<name>`.
    pub fn template(self, name: &str, body: &str) -> Self {
        self.file(&format!("templates/{name}"), body)
    }

    /// Add a source post at `rel`.
    pub fn post(self, rel: &str, body: &str) -> Self {
        self.file(rel, body)
    }

    /// Add any file at `rel`.
    pub fn file(mut self, rel: &str, body: &str) -> Self {
        self.files.push((PathBuf::from(rel), body.to_string()));
        self
    }

    pub fn build(self) -> Site {
        let tmp = TempDir::new().unwrap();
        for (rel, body) in self.files {
            let path = tmp.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, body).unwrap();
        }
        Site { tmp }
    }
}

/// A site on disk. Deleted when dropped.
pub struct Site {
    tmp: TempDir,
}

impl Site {
    pub fn path(&self) -> &Path {
        self.tmp.path()
    }

    /// Stock config for this site with `template` as the content template.
    pub fn config(&self, template: &str) -> Config {
        Config::new(self.path(), template)
    }
}

// =========================================================================
// Report lookups (panic with a clear message on miss)
// =========================================================================

/// Read a generated file relative to the site root. Panics if missing.
pub fn read_output(site: &Site, rel: &str) -> String {
    let path = site.path().join(rel);
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read output {}: {e}", path.display()))
}

/// Slugs of all written pages, in processing order.
pub fn page_slugs(report: &Report) -> Vec<&str> {
    report.pages.iter().map(|p| p.slug.as_str()).collect()
}

/// Find a generated page by slug. Panics if not found.
pub fn find_page<'a>(report: &'a Report, slug: &str) -> &'a GeneratedPage {
    report
        .pages
        .iter()
        .find(|p| p.slug == slug)
        .unwrap_or_else(|| panic!("page '{slug}' not found. Available: {:?}", page_slugs(report)))
}
