//! Template lookup across an ordered search path.
//!
//! Every template name, whether it is the content template named in the
//! config or the target of an `{% extends %}`/`{% include %}` inside another
//! template, is looked up the same way: each search directory is tried in
//! order and the first *regular file* called `name` wins.
//!
//! ```text
//! site/templates/post.html          ← checked first (site overrides)
//! ~/themes/custom/post.html         ← configured template dirs
//! <built-in>/templates/post.html    ← stock theme
//! ```
//!
//! A directory that happens to carry the template's name is skipped rather
//! than returned, so a stray `post.html/` directory in the site never shadows
//! the theme's file.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("template not found: {name}")]
    TemplateNotFound { name: String },
    #[error("cannot inspect template candidate {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Find `name` in the first search directory that holds it as a plain file.
///
/// The returned path is absolute. Missing candidates and candidates that are
/// directories fall through to the next search directory; exhausting the
/// list yields [`ResolveError::TemplateNotFound`].
pub fn resolve(search_dirs: &[PathBuf], name: &str) -> Result<PathBuf, ResolveError> {
    for dir in search_dirs {
        let candidate = dir.join(name);
        match fs::metadata(&candidate) {
            Ok(meta) if meta.is_file() => return absolute(candidate),
            Ok(_) => continue,
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                continue;
            }
            Err(source) => {
                return Err(ResolveError::Io {
                    path: candidate,
                    source,
                });
            }
        }
    }
    Err(ResolveError::TemplateNotFound {
        name: name.to_string(),
    })
}

fn absolute(path: PathBuf) -> Result<PathBuf, ResolveError> {
    std::path::absolute(&path).map_err(|source| ResolveError::Io { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn dirs(tmp: &TempDir, names: &[&str]) -> Vec<PathBuf> {
        names
            .iter()
            .map(|n| {
                let d = tmp.path().join(n);
                fs::create_dir_all(&d).unwrap();
                d
            })
            .collect()
    }

    #[test]
    fn first_match_wins() {
        let tmp = TempDir::new().unwrap();
        let search = dirs(&tmp, &["a", "b"]);
        fs::write(search[0].join("x"), "from a").unwrap();
        fs::write(search[1].join("x"), "from b").unwrap();

        let found = resolve(&search, "x").unwrap();
        assert_eq!(found, search[0].join("x"));
    }

    #[test]
    fn directory_with_template_name_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let search = dirs(&tmp, &["a", "b"]);
        fs::create_dir_all(search[0].join("x")).unwrap();
        fs::write(search[1].join("x"), "from b").unwrap();

        let found = resolve(&search, "x").unwrap();
        assert_eq!(found, search[1].join("x"));
    }

    #[test]
    fn missing_search_dir_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let mut search = vec![tmp.path().join("does-not-exist")];
        search.extend(dirs(&tmp, &["b"]));
        fs::write(search[1].join("x"), "").unwrap();

        assert_eq!(resolve(&search, "x").unwrap(), search[1].join("x"));
    }

    #[test]
    fn empty_search_path_is_not_found() {
        let err = resolve(&[], "x").unwrap_err();
        assert!(matches!(err, ResolveError::TemplateNotFound { ref name } if name == "x"));
    }

    #[test]
    fn exhausted_search_path_names_the_template() {
        let tmp = TempDir::new().unwrap();
        let search = dirs(&tmp, &["a"]);

        let err = resolve(&search, "missing").unwrap_err();
        assert!(matches!(err, ResolveError::TemplateNotFound { ref name } if name == "missing"));
        assert_eq!(err.to_string(), "template not found: missing");
    }

    #[test]
    fn only_directories_named_like_template_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let search = dirs(&tmp, &["a", "b"]);
        fs::create_dir_all(search[0].join("x")).unwrap();
        fs::create_dir_all(search[1].join("x")).unwrap();

        assert!(matches!(
            resolve(&search, "x"),
            Err(ResolveError::TemplateNotFound { .. })
        ));
    }

    #[test]
    fn nested_names_resolve_relative_to_search_dir() {
        let tmp = TempDir::new().unwrap();
        let search = dirs(&tmp, &["a"]);
        fs::create_dir_all(search[0].join("partials")).unwrap();
        fs::write(search[0].join("partials/nav.html"), "").unwrap();

        let found = resolve(&search, "partials/nav.html").unwrap();
        assert!(found.is_absolute());
        assert!(found.ends_with("partials/nav.html"));
    }
}
