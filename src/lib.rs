//! # orgpress
//!
//! A minimal static site generator for Org mode posts. The site directory is
//! the data source: every file whose path matches the input pattern becomes
//! one page, rendered through a Jinja-style content template and written to
//! a path produced by a second, one-line template.
//!
//! # Pipeline
//!
//! ```text
//! locate   base-dir  →  source paths        (regex include/exclude)
//! extract  source    →  Document            (Org → HTML fragment + keywords)
//! render   Document  →  page HTML           (content template, `post.*`)
//! write    page      →  <base-dir><output>  (output template, metadata)
//! ```
//!
//! Posts are processed one at a time; the first failure stops the run.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`locate`] | Recursive source search with include/exclude regexes |
//! | [`resolve`] | First-match template lookup over an ordered directory list |
//! | [`org`] | Org → HTML exporter with per-thread content and keyword hooks |
//! | [`extract`] | Runs the exporter with both hooks installed to build a [`extract::Document`] |
//! | [`slug`] | URL-safe post identifiers from a title or file name |
//! | [`templates`] | minijinja environment whose imports go through [`resolve`] |
//! | [`generate`] | The run itself: template setup, locate, extract, render, write |
//! | [`config`] | `orgpress.toml` loading, layering and validation |
//! | [`output`] | CLI output formatting for build and check runs |
//!
//! # Design Decisions
//!
//! ## Metadata Through Exporter Hooks
//!
//! The Org exporter returns finished pages. Rather than re-parsing keywords
//! on the side, [`extract::OrgConverter`] hooks the exporter's final page
//! assembly and its keyword handling for exactly one conversion. The hooks
//! are scoped by guards, so a failed conversion never leaves them behind.
//!
//! ## Templates on Disk
//!
//! Unlike the page wrapper the exporter builds with Maud, post pages come
//! from template files users edit. Site templates in `<base-dir>/templates`
//! shadow the theme, and anything a template extends or includes is looked
//! up the same way.
//!
//! ## Output Path Concatenation
//!
//! Output paths are appended to the base directory as text (see
//! [`generate::legacy_join`]). Existing sites depend on the exact layout this
//! produces.

pub mod config;
pub mod extract;
pub mod generate;
pub mod locate;
pub mod org;
pub mod output;
pub mod resolve;
pub mod slug;
pub mod templates;

#[cfg(test)]
pub(crate) mod test_helpers;
