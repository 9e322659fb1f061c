//! Per-post extraction: source file → [`Document`].
//!
//! The Org exporter only hands back a finished HTML page. What a post page
//! needs is the body fragment plus the `#+KEY: VALUE` keywords, which the
//! exporter only exposes through its hooks (see [`crate::org`]).
//! [`OrgConverter`] installs both hooks for the duration of one export and
//! collects what they see; the hooks are removed again before `convert`
//! returns, on the error path too.
//!
//! ## Metadata order
//!
//! Keywords are accumulated front-first, so a post declaring
//!
//! ```text
//! #+TITLE: Hello
//! #+DATE: 2024-05-01
//! #+TAGS: rust
//! ```
//!
//! yields the metadata order `tags, date, title, slug, html`. Existing
//! templates iterate `post|items` in this order, so it is kept rather than
//! sorted. When a key is declared twice, the later declaration wins.

use crate::org::{self, ConvertError};
use crate::slug::slugify;
use indexmap::IndexMap;
use minijinja::{Value, context};
use serde::Serialize;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot convert {path}: {source}")]
    Conversion {
        path: PathBuf,
        #[source]
        source: ConvertError,
    },
    #[error("cannot derive a slug for {path}")]
    EmptySlug { path: PathBuf },
}

/// Output of one conversion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Converted {
    /// Body fragment, without any page wrapper.
    pub html: String,
    /// Declared keywords as `(lower-cased key, value)`, last declared first.
    pub keywords: Vec<(String, String)>,
}

/// Markup engine adapter.
pub trait Converter {
    fn convert(&self, source: &str) -> Result<Converted, ConvertError>;
}

/// Org mode through [`crate::org::export_html`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OrgConverter;

impl Converter for OrgConverter {
    fn convert(&self, source: &str) -> Result<Converted, ConvertError> {
        intercept(source, org::export_html)
    }
}

/// Run `export` with both hooks installed and return what they captured.
fn intercept<F>(source: &str, export: F) -> Result<Converted, ConvertError>
where
    F: FnOnce(&str) -> Result<String, ConvertError>,
{
    let interception = Interception::install();
    export(source)?;
    Ok(interception.finish())
}

/// Both exporter hooks, wired to shared capture buffers.
///
/// Dropping this value removes the hooks.
struct Interception {
    html: Rc<RefCell<String>>,
    keywords: Rc<RefCell<Vec<(String, String)>>>,
    _content: org::ContentHookGuard,
    _keyword: org::KeywordHookGuard,
}

impl Interception {
    fn install() -> Self {
        let html = Rc::new(RefCell::new(String::new()));
        let keywords = Rc::new(RefCell::new(Vec::new()));

        let html_sink = Rc::clone(&html);
        let content = org::install_content_hook(Box::new(move |fragment| {
            *html_sink.borrow_mut() = fragment.to_string();
            fragment.to_string()
        }));

        let keyword_sink = Rc::clone(&keywords);
        let keyword = org::install_keyword_hook(Box::new(move |key, value| {
            keyword_sink
                .borrow_mut()
                .insert(0, (key.to_lowercase(), value.to_string()));
        }));

        Self {
            html,
            keywords,
            _content: content,
            _keyword: keyword,
        }
    }

    fn finish(self) -> Converted {
        Converted {
            html: self.html.take(),
            keywords: self.keywords.take(),
        }
    }
}

/// Ordered keyword map exposed to templates as `post`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Metadata(IndexMap<String, String>);

impl Metadata {
    /// Build from keywords that are already last-declared-first.
    fn from_keywords(keywords: Vec<(String, String)>) -> Self {
        let mut map = IndexMap::with_capacity(keywords.len() + 2);
        for (key, value) in keywords {
            map.entry(key).or_insert(value);
        }
        Self(map)
    }

    fn set(&mut self, key: &str, value: String) {
        self.0.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// One post, as extracted from its source file.
#[derive(Debug, Clone)]
pub struct Document {
    pub source_path: PathBuf,
    pub html: String,
    /// Declared keywords plus the synthetic `slug` and `html` entries.
    pub metadata: Metadata,
}

impl Document {
    pub fn slug(&self) -> &str {
        self.metadata.get("slug").unwrap_or_default()
    }

    /// Template context for the content template: `{ post: metadata }`.
    pub fn render_variables(&self) -> Value {
        context! { post => &self.metadata }
    }
}

/// Read `path` and run it through `converter`.
///
/// `slug` and `html` are appended after the declared keywords and replace
/// any declared keyword of the same name.
pub fn extract<C: Converter + ?Sized>(path: &Path, converter: &C) -> Result<Document, ExtractError> {
    let source = fs::read_to_string(path).map_err(|source| ExtractError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let converted = converter
        .convert(&source)
        .map_err(|source| ExtractError::Conversion {
            path: path.to_path_buf(),
            source,
        })?;

    let mut metadata = Metadata::from_keywords(converted.keywords);
    let slug = slugify(metadata.get("title"), path);
    if slug.is_empty() {
        return Err(ExtractError::EmptySlug {
            path: path.to_path_buf(),
        });
    }
    metadata.0.shift_remove("slug");
    metadata.0.shift_remove("html");
    metadata.set("slug", slug);
    metadata.set("html", converted.html.clone());

    Ok(Document {
        source_path: path.to_path_buf(),
        html: converted.html,
        metadata,
    })
}
