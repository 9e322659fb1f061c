//! End-to-end tests through the public library API.
//!
//! Each test lays out a small site in a temp directory, runs a generation
//! and inspects the files that land on disk.

use orgpress::config::Config;
use orgpress::generate::{GenerateError, generate, plan};
use orgpress::templates::TemplateError;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

fn hello_site() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "posts/hello.org", "#+TITLE: Hello\n\nWorld\n");
    write(
        tmp.path(),
        "templates/post.html",
        "<h1>{{ post.title }}</h1>{{ post.html }}",
    );
    tmp
}

#[test]
fn hello_post_is_rendered_to_slug_path() {
    let tmp = hello_site();

    let report = generate(&Config::new(tmp.path(), "post.html")).unwrap();

    let out = tmp.path().join("output/hello.html");
    assert!(out.is_file());
    let html = fs::read_to_string(&out).unwrap();
    assert!(html.starts_with("<h1>Hello</h1>"));
    let body = &html["<h1>Hello</h1>".len()..];
    assert!(body.contains("World"));
    assert!(!body.contains("<!DOCTYPE html>"));

    assert_eq!(report.pages.len(), 1);
    assert_eq!(report.pages[0].slug, "hello");
}

#[test]
fn missing_template_aborts_before_any_output() {
    let tmp = hello_site();

    let err = generate(&Config::new(tmp.path(), "missing.html")).unwrap_err();

    match &err {
        GenerateError::Template(TemplateError::NotFound { name }) => {
            assert_eq!(name, "missing.html")
        }
        other => panic!("expected TemplateNotFound, got {other:?}"),
    }
    assert!(err.user_message().unwrap().contains("missing.html"));
    assert!(!tmp.path().join("output").exists());
}

#[test]
fn missing_imported_template_is_reported_as_not_found() {
    let tmp = hello_site();
    write(
        tmp.path(),
        "templates/post.html",
        "{% extends \"base.html\" %}",
    );
    let config = Config {
        template_dirs: vec![tmp.path().join("no-theme")],
        ..Config::new(tmp.path(), "post.html")
    };

    let err = generate(&config).unwrap_err();
    assert!(matches!(
        err,
        GenerateError::Template(TemplateError::NotFound { ref name }) if name == "base.html"
    ));
}

#[test]
fn missing_include_is_reported_as_not_found() {
    let tmp = hello_site();
    write(
        tmp.path(),
        "templates/post.html",
        "{% include \"header.html\" %}{{ post.html }}",
    );

    let err = generate(&Config::new(tmp.path(), "post.html")).unwrap_err();
    assert!(matches!(
        err,
        GenerateError::Template(TemplateError::NotFound { ref name }) if name == "header.html"
    ));
    assert!(err.user_message().unwrap().starts_with("Template not found: header.html"));
    assert!(!tmp.path().join("output/hello.html").exists());
}

#[test]
fn missing_macro_import_is_reported_as_not_found() {
    let tmp = hello_site();
    write(
        tmp.path(),
        "templates/post.html",
        "{% import \"macros.html\" as m %}{{ m.title(post) }}",
    );

    let err = generate(&Config::new(tmp.path(), "post.html")).unwrap_err();
    assert!(matches!(
        err,
        GenerateError::Template(TemplateError::NotFound { ref name }) if name == "macros.html"
    ));
    assert!(err.user_message().unwrap().starts_with("Template not found: macros.html"));
}

#[test]
fn macro_import_is_resolved_through_search_path() {
    let tmp = hello_site();
    write(
        tmp.path(),
        "templates/post.html",
        "{% import \"macros.html\" as m %}{{ m.heading(post.title) }}",
    );
    write(
        tmp.path(),
        "templates/macros.html",
        "{% macro heading(text) %}<h2>{{ text }}</h2>{% endmacro %}",
    );

    generate(&Config::new(tmp.path(), "post.html")).unwrap();
    let html = fs::read_to_string(tmp.path().join("output/hello.html")).unwrap();
    assert_eq!(html, "<h2>Hello</h2>");
}

#[test]
fn deeply_nested_headlines_are_rendered() {
    let tmp = hello_site();
    write(
        tmp.path(),
        "posts/outline.org",
        "#+TITLE: Outline\n\n* One\n** Two\n*** Three\n**** Four\n***** Five\n****** Six\n******* Seven\n",
    );

    generate(&Config::new(tmp.path(), "post.html")).unwrap();
    let html = fs::read_to_string(tmp.path().join("output/outline.html")).unwrap();
    assert!(html.contains("Seven"));
}

#[test]
fn theme_directory_supplies_imports() {
    let tmp = hello_site();
    write(
        tmp.path(),
        "templates/post.html",
        "{% extends \"base.html\" %}{% block main %}{{ post.html }}{% endblock %}",
    );
    write(
        tmp.path(),
        "theme/base.html",
        "<main>{% block main %}{% endblock %}</main>",
    );
    let config = Config {
        template_dirs: vec![tmp.path().join("theme")],
        ..Config::new(tmp.path(), "post.html")
    };

    generate(&config).unwrap();
    let html = fs::read_to_string(tmp.path().join("output/hello.html")).unwrap();
    assert!(html.starts_with("<main>"));
    assert!(html.contains("World"));
}

#[test]
fn builtin_theme_is_used_without_site_templates() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "posts/hello.org", "#+TITLE: Hello\n\nWorld\n");

    generate(&Config::new(tmp.path(), "post.html")).unwrap();
    let html = fs::read_to_string(tmp.path().join("output/hello.html")).unwrap();
    assert!(html.contains("<title>Hello</title>"));
    assert!(html.contains("World"));
}

#[test]
fn input_filter_drops_documents_after_extraction() {
    let tmp = hello_site();
    write(tmp.path(), "posts/draft.org", "#+TITLE: Draft\n#+DRAFT: t\n\nSoon\n");
    let config =
        Config::new(tmp.path(), "post.html").with_input_filter(|m| m.get("draft").is_none());

    let report = generate(&config).unwrap();
    assert_eq!(report.pages.len(), 1);
    assert!(tmp.path().join("output/hello.html").is_file());
    assert!(!tmp.path().join("output/draft.html").exists());
}

#[test]
fn leading_slash_in_output_template_stays_inside_base_dir() {
    let tmp = hello_site();
    let config = Config {
        output: "/{{ slug }}.html".to_string(),
        ..Config::new(tmp.path(), "post.html")
    };

    let report = generate(&config).unwrap();
    assert!(tmp.path().join("hello.html").is_file());
    assert!(report.pages[0].output.to_string_lossy().contains("//hello.html"));
}

#[test]
fn check_plans_without_writing() {
    let tmp = hello_site();

    let report = plan(&Config::new(tmp.path(), "post.html")).unwrap();
    assert_eq!(report.pages.len(), 1);
    assert!(report.pages[0].output.ends_with("output/hello.html"));
    assert!(!tmp.path().join("output").exists());
}
