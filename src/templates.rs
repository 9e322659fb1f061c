//! Template environment for a generation run.
//!
//! Templates use [minijinja](https://docs.rs/minijinja) (Jinja2 syntax). The
//! content template is registered up front; anything it pulls in through
//! `{% extends %}`, `{% include %}` or `{% import %}` is loaded on demand by
//! the environment's loader, which looks names up with
//! [`crate::resolve::resolve`] against the run's search path:
//!
//! ```text
//! <base-dir>/templates/       site overrides, always first
//! <template-dirs...>          configured dirs, in order
//! built-in theme              compiled into the binary, only when no
//!                             template dirs are configured
//! ```
//!
//! Auto-escaping is off: `post.html` is already-rendered markup and the
//! templates decide what to escape (`{{ post.title|e }}`).
//!
//! ## Missing templates
//!
//! minijinja reports a failed `{% include %}` or `{% import %}` with its own
//! `TemplateNotFound` error and drops whatever the loader returned. The
//! loader therefore records the name it could not resolve, and engine errors
//! of that kind are turned back into [`TemplateError::NotFound`] with it.

use crate::resolve::{ResolveError, resolve};
use minijinja::{AutoEscape, Environment, Error, ErrorKind};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("template not found: {name}")]
    NotFound { name: String },
    #[error("cannot read template {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Raised by the engine while parsing or rendering.
    #[error("template error: {0}")]
    Syntax(#[source] Error),
}

impl From<ResolveError> for TemplateError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::TemplateNotFound { name } => TemplateError::NotFound { name },
            ResolveError::Io { path, source } => TemplateError::Read { path, source },
        }
    }
}

// ============================================================================
// Built-in theme
// ============================================================================

const BUILTIN_THEME: &[(&str, &str)] = &[
    (
        "layout.html",
        include_str!("../themes/default/templates/layout.html"),
    ),
    (
        "post.html",
        include_str!("../themes/default/templates/post.html"),
    ),
];

/// Look up a template of the built-in theme by name.
pub fn builtin_template(name: &str) -> Option<(&'static str, &'static str)> {
    BUILTIN_THEME
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .copied()
}

/// Where a template's source came from.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateOrigin {
    File(PathBuf),
    BuiltIn(&'static str),
}

impl fmt::Display for TemplateOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateOrigin::File(path) => write!(f, "{}", path.display()),
            TemplateOrigin::BuiltIn(name) => write!(f, "built-in {name}"),
        }
    }
}

/// Template directories for a site: `<base_dir>/templates`, then `configured`.
pub fn search_path(base_dir: &Path, configured: &[PathBuf]) -> Vec<PathBuf> {
    let mut dirs = vec![base_dir.join("templates")];
    dirs.extend(configured.iter().cloned());
    dirs
}

// ============================================================================
// Environment
// ============================================================================

/// Compiled templates plus the search path used for imports.
pub struct Templates {
    env: Environment<'static>,
    search_path: Vec<PathBuf>,
    builtin: bool,
    /// Last name the loader failed to resolve.
    missing: Arc<Mutex<Option<String>>>,
}

impl Templates {
    /// Environment searching `search_path` only.
    pub fn new(search_path: Vec<PathBuf>) -> Self {
        Self::build(search_path, false)
    }

    /// Environment for a site. The built-in theme is the last fallback when
    /// no template dirs are configured.
    pub fn for_site(base_dir: &Path, configured: &[PathBuf]) -> Self {
        Self::build(search_path(base_dir, configured), configured.is_empty())
    }

    fn build(search_path: Vec<PathBuf>, builtin: bool) -> Self {
        let missing = Arc::new(Mutex::new(None));
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::None);

        let dirs = search_path.clone();
        let unresolved = Arc::clone(&missing);
        env.set_loader(move |name| load_import(&dirs, builtin, &unresolved, name));

        Self {
            env,
            search_path,
            builtin,
            missing,
        }
    }

    /// Find `name`, read it and add it to the environment.
    pub fn register(&mut self, name: &str) -> Result<TemplateOrigin, TemplateError> {
        let (origin, source) = find(&self.search_path, self.builtin, name)?;
        self.forget_missing();
        self.env
            .add_template_owned(name.to_string(), source)
            .map_err(|e| self.engine_error(e))?;
        debug!(template = name, origin = %origin, "registered template");
        Ok(origin)
    }

    /// Render a template known to the environment (registered or importable).
    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String, TemplateError> {
        self.forget_missing();
        self.env
            .get_template(name)
            .and_then(|template| template.render(ctx))
            .map_err(|e| self.engine_error(e))
    }

    /// Render a one-off template string that is not registered by name.
    pub fn render_str<S: Serialize>(&self, source: &str, ctx: S) -> Result<String, TemplateError> {
        self.forget_missing();
        self.env
            .render_str(source, ctx)
            .map_err(|e| self.engine_error(e))
    }

    fn forget_missing(&self) {
        if let Ok(mut slot) = self.missing.lock() {
            slot.take();
        }
    }

    fn engine_error(&self, err: Error) -> TemplateError {
        let missing = self.missing.lock().ok().and_then(|mut slot| slot.take());
        match missing {
            Some(name) if err.kind() == ErrorKind::TemplateNotFound => {
                TemplateError::NotFound { name }
            }
            _ => TemplateError::Syntax(err),
        }
    }
}

/// Resolve `name` on disk, falling back to the built-in theme if allowed.
fn find(
    dirs: &[PathBuf],
    builtin: bool,
    name: &str,
) -> Result<(TemplateOrigin, String), TemplateError> {
    match resolve(dirs, name) {
        Ok(path) => {
            let source = fs::read_to_string(&path).map_err(|source| TemplateError::Read {
                path: path.clone(),
                source,
            })?;
            Ok((TemplateOrigin::File(path), source))
        }
        Err(err @ ResolveError::TemplateNotFound { .. }) => match builtin_template(name) {
            Some((name, source)) if builtin => {
                Ok((TemplateOrigin::BuiltIn(name), source.to_string()))
            }
            _ => Err(err.into()),
        },
        Err(err) => Err(err.into()),
    }
}

/// Loader callback: resolve an imported name and hand its source to the engine.
fn load_import(
    dirs: &[PathBuf],
    builtin: bool,
    missing: &Mutex<Option<String>>,
    name: &str,
) -> Result<Option<String>, Error> {
    match find(dirs, builtin, name) {
        Ok((origin, source)) => {
            debug!(template = name, origin = %origin, "loaded imported template");
            Ok(Some(source))
        }
        Err(TemplateError::NotFound { name }) => {
            let detail = format!("cannot resolve template {name:?}");
            if let Ok(mut slot) = missing.lock() {
                *slot = Some(name);
            }
            Err(Error::new(ErrorKind::TemplateNotFound, detail))
        }
        Err(err) => Err(Error::new(
            ErrorKind::InvalidOperation,
            format!("cannot load template {name:?}"),
        )
        .with_source(err)),
    }
}
