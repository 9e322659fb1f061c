//! Slug derivation for output paths.
//!
//! A post's slug comes from its `#+TITLE:` keyword when one is declared,
//! otherwise from the source file name. Both go through the same minimal
//! transform:
//!
//! - `"/posts/My Post.org"` → `"my-post"` (directory and extension dropped)
//! - `"Hello World"` → `"hello-world"`
//! - `"Émile Zola"` → `"émile-zola"` (no transliteration)
//!
//! Punctuation and non-ASCII characters are kept as-is. This is deliberately
//! not a general slugification library: existing sites depend on the exact
//! output.

use std::path::Path;

/// Derive a slug from an optional title, falling back to a source path.
///
/// A blank title counts as absent. The chosen string is treated as a path:
/// only its file-name portion is used, the final extension is stripped, the
/// result is lower-cased, and every whitespace character becomes `-`.
///
/// Returns an empty string when neither input has a usable file name
/// (e.g. a title of `".."`); callers enforce non-empty slugs.
pub fn slugify(title: Option<&str>, fallback: &Path) -> String {
    let stem = title
        .filter(|t| !t.trim().is_empty())
        .and_then(|t| file_stem(Path::new(t)))
        .or_else(|| file_stem(fallback))
        .unwrap_or_default();

    stem.to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect()
}

fn file_stem(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}
