//! CLI output formatting for generation runs.
//!
//! # Information-First Display
//!
//! Every page is shown by its identity (positional index and slug) with the
//! output path on the same line and the source file as an indented context
//! line. Paths are shown relative to the base directory when possible.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Template: templates/post.html
//! 001 hello → output/hello.html
//!     Source: posts/hello.org
//! 002 second-post → output/second-post.html
//!     Source: posts/Second Post.org
//!
//! Skipped by filter
//!     posts/draft.org
//!
//! Generated 2 pages
//! ```
//!
//! ## Check
//!
//! Same listing, with a `Would generate` summary since nothing is written.
//!
//! # Architecture
//!
//! `format_*` functions return `Vec<String>` and do no I/O, which keeps them
//! testable. `print_*` wrappers write the lines to stdout.

use crate::generate::Report;
use crate::templates::TemplateOrigin;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Display `path` relative to `base`, or as-is when it lies elsewhere.
fn display_relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn pluralize(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Page listing shared by build and check output.
fn page_lines(report: &Report) -> Vec<String> {
    let base = report.base_dir.as_path();
    let template = match &report.content_template {
        TemplateOrigin::File(path) => display_relative(path, base),
        builtin => builtin.to_string(),
    };
    let mut lines = vec![format!("Template: {template}")];

    for (i, page) in report.pages.iter().enumerate() {
        lines.push(format!(
            "{} {} → {}",
            format_index(i + 1),
            page.slug,
            display_relative(&page.output, base)
        ));
        lines.push(format!(
            "{}Source: {}",
            indent(1),
            display_relative(&page.source, base)
        ));
    }

    if !report.filtered.is_empty() {
        lines.push(String::new());
        lines.push("Skipped by filter".to_string());
        for source in &report.filtered {
            lines.push(format!("{}{}", indent(1), display_relative(source, base)));
        }
    }

    lines
}

// ============================================================================
// Build
// ============================================================================

pub fn format_report(report: &Report) -> Vec<String> {
    let mut lines = page_lines(report);
    lines.push(String::new());
    lines.push(format!("Generated {}", pluralize(report.pages.len(), "page")));
    lines
}

pub fn print_report(report: &Report) {
    for line in format_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

pub fn format_plan(report: &Report) -> Vec<String> {
    let mut lines = page_lines(report);
    lines.push(String::new());
    lines.push(format!(
        "Would generate {}",
        pluralize(report.pages.len(), "page")
    ));
    lines
}

pub fn print_plan(report: &Report) {
    for line in format_plan(report) {
        println!("{}", line);
    }
}
