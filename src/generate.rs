//! Site generation.
//!
//! Turns every matching source file under the base directory into one
//! rendered page. A run goes through these steps, in order:
//!
//! 1. Build the template search path (`<base-dir>/templates` first).
//! 2. Create the template environment with its import loader.
//! 3. Resolve and register the content template. A missing or malformed
//!    content template aborts the run here, before any file is written.
//! 4. Locate the source files.
//! 5. For each source, one at a time: extract the post, render the content
//!    template with `{ post: metadata }`, render the output-path template
//!    with the metadata itself, create parent directories, write the page.
//!
//! ## Failure policy
//!
//! The first error aborts the run. Pages written before the failure stay on
//! disk; there is no rollback.
//!
//! ## Output paths
//!
//! The rendered output path is appended to the base directory by plain
//! concatenation (see [`legacy_join`]), so `output = "/x.html"` produces a
//! doubled separator rather than an absolute path.
//!
//! ## Output Structure
//!
//! With the default `output = "output/{{ slug }}.html"`:
//!
//! ```text
//! site/
//! ├── orgpress.toml
//! ├── templates/
//! │   └── post.html
//! ├── posts/
//! │   ├── hello.org        #+TITLE: Hello
//! │   └── Second Post.org  (no title)
//! └── output/
//!     ├── hello.html
//!     └── second-post.html
//! ```

use crate::config::{Config, ConfigError};
use crate::extract::{Converter, Document, ExtractError, OrgConverter, extract};
use crate::locate::{LocateError, locate};
use crate::templates::{TemplateError, TemplateOrigin, Templates};
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Locate(#[from] LocateError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenerateError {
    /// Friendly message for the two error kinds users can fix themselves:
    /// template errors and missing files. `None` for everything else.
    pub fn user_message(&self) -> Option<String> {
        match self {
            GenerateError::Template(TemplateError::Syntax(err)) => {
                Some(format!("Template error\n{}", err.display_debug_info()))
            }
            GenerateError::Template(TemplateError::NotFound { name }) => Some(format!(
                "Template not found: {name}\nLooked in the site's templates/ directory and the configured template dirs."
            )),
            GenerateError::Template(TemplateError::Read { path, source })
            | GenerateError::Extract(ExtractError::Read { path, source })
                if source.kind() == ErrorKind::NotFound =>
            {
                Some(format!("File not found: {}", path.display()))
            }
            _ => None,
        }
    }
}

/// One page of a run: where it came from and where it goes.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPage {
    pub source: PathBuf,
    pub output: PathBuf,
    pub slug: String,
}

/// Outcome of a run, in processing order.
#[derive(Debug)]
pub struct Report {
    /// Absolute base directory, with trailing separator.
    pub base_dir: PathBuf,
    /// Where the content template was loaded from.
    pub content_template: TemplateOrigin,
    pub pages: Vec<GeneratedPage>,
    /// Sources rejected by the input filter.
    pub filtered: Vec<PathBuf>,
}

/// Generate the site described by `config` using the Org converter.
pub fn generate(config: &Config) -> Result<Report, GenerateError> {
    generate_with(config, &OrgConverter)
}

/// Generate the site with a caller-provided markup converter.
pub fn generate_with<C: Converter + ?Sized>(
    config: &Config,
    converter: &C,
) -> Result<Report, GenerateError> {
    run(config, converter, Mode::Write)
}

/// Everything [`generate`] does except writing: extraction and both renders
/// still run, so template and content errors surface the same way.
pub fn plan(config: &Config) -> Result<Report, GenerateError> {
    run(config, &OrgConverter, Mode::DryRun)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Write,
    DryRun,
}

fn run<C: Converter + ?Sized>(
    config: &Config,
    converter: &C,
    mode: Mode,
) -> Result<Report, GenerateError> {
    config.validate()?;
    let base_dir = config.base_dir_name()?;
    let template_name = config.content_template()?;

    // Steps 1-3: environment and content template, before touching sources.
    let mut templates = Templates::for_site(&base_dir, &config.template_dirs);
    let content_template = templates.register(template_name)?;

    // Step 4
    let sources = locate(&base_dir, &config.include_regex()?, &config.exclude_regex()?)?;
    debug!(count = sources.len(), base_dir = %base_dir.display(), "located sources");

    let mut report = Report {
        base_dir: base_dir.clone(),
        content_template,
        pages: Vec::new(),
        filtered: Vec::new(),
    };

    // Step 5, strictly one source at a time.
    for source in sources {
        let document = extract(&source, converter)?;

        let accepted = match &config.input_filter {
            Some(filter) => filter.accepts(&document.metadata),
            None => true,
        };
        if !accepted {
            debug!(source = %source.display(), "skipped by input filter");
            report.filtered.push(source);
            continue;
        }

        let page = render_page(&templates, template_name, &config.output, &document)?;
        let output = legacy_join(&base_dir, &page.relative_path);

        if mode == Mode::Write {
            write_page(&output, &page.html)?;
            info!(path = %output.display(), "wrote page");
        }

        report.pages.push(GeneratedPage {
            source,
            output,
            slug: document.slug().to_string(),
        });
    }

    Ok(report)
}

struct RenderedPage {
    html: String,
    relative_path: String,
}

fn render_page(
    templates: &Templates,
    template_name: &str,
    output_template: &str,
    document: &Document,
) -> Result<RenderedPage, TemplateError> {
    let html = templates.render(template_name, document.render_variables())?;
    let relative_path = templates.render_str(output_template, &document.metadata)?;
    Ok(RenderedPage {
        html,
        relative_path,
    })
}

/// Append `relative` to `base` byte for byte.
///
/// Unlike [`Path::join`], an absolute `relative` does not replace `base` and
/// no separator is inserted or collapsed: `base` is expected to end in a
/// separator already. Existing sites rely on this exact layout, including
/// the doubled separator a leading `/` in the output template produces.
pub fn legacy_join(base: &Path, relative: &str) -> PathBuf {
    let mut joined = OsString::from(base.as_os_str());
    joined.push(relative);
    PathBuf::from(joined)
}

/// Create parent directories and write `html`, replacing any existing file.
fn write_page(path: &Path, html: &str) -> Result<(), GenerateError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| GenerateError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, html).map_err(|source| GenerateError::Write {
        path: path.to_path_buf(),
        source,
    })
}
