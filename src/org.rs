//! Org mode to HTML export.
//!
//! Thin exporter over [orgize](https://docs.rs/orgize). On its own,
//! [`export_html`] behaves like a stand-alone exporter: it renders the
//! document body and wraps it in a complete HTML page whose `<title>` comes
//! from the `#+TITLE:` keyword.
//!
//! ## Hooks
//!
//! The exporter exposes two override points for callers that need more than
//! a finished page:
//!
//! | Hook | Called with | Effect |
//! |------|-------------|--------|
//! | content | rendered body fragment | replaces the final page assembly; its return value is the export result |
//! | keyword | raw key, trimmed value | observes every `#+KEY: VALUE` line before the exporter's own handling |
//!
//! Hooks are stored per thread and installed through guards
//! ([`ContentHookGuard`], [`KeywordHookGuard`]) that put the previous hook
//! back when dropped, whether the export succeeded, failed, or panicked.
//! A hook must not install or remove hooks itself.

use maud::{DOCTYPE, PreEscaped, html};
use orgize::export::{DefaultHtmlHandler, HtmlHandler};
use orgize::{Element, Org};
use std::cell::RefCell;
use std::io::Write;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("exported HTML is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type ContentHook = Box<dyn FnMut(&str) -> String>;
pub type KeywordHook = Box<dyn FnMut(&str, &str)>;

thread_local! {
    static CONTENT_HOOK: RefCell<Option<ContentHook>> = const { RefCell::new(None) };
    static KEYWORD_HOOK: RefCell<Option<KeywordHook>> = const { RefCell::new(None) };
}

/// Restores the previously installed content hook on drop.
#[must_use = "the hook is removed as soon as the guard is dropped"]
pub struct ContentHookGuard {
    previous: Option<ContentHook>,
}

impl Drop for ContentHookGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CONTENT_HOOK.with(|slot| *slot.borrow_mut() = previous);
    }
}

/// Restores the previously installed keyword hook on drop.
#[must_use = "the hook is removed as soon as the guard is dropped"]
pub struct KeywordHookGuard {
    previous: Option<KeywordHook>,
}

impl Drop for KeywordHookGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        KEYWORD_HOOK.with(|slot| *slot.borrow_mut() = previous);
    }
}

/// Replace the final page assembly step for exports on this thread.
pub fn install_content_hook(hook: ContentHook) -> ContentHookGuard {
    let previous = CONTENT_HOOK.with(|slot| slot.borrow_mut().replace(hook));
    ContentHookGuard { previous }
}

/// Observe keyword lines for exports on this thread.
pub fn install_keyword_hook(hook: KeywordHook) -> KeywordHookGuard {
    let previous = KEYWORD_HOOK.with(|slot| slot.borrow_mut().replace(hook));
    KeywordHookGuard { previous }
}

pub fn content_hook_installed() -> bool {
    CONTENT_HOOK.with(|slot| slot.borrow().is_some())
}

pub fn keyword_hook_installed() -> bool {
    KEYWORD_HOOK.with(|slot| slot.borrow().is_some())
}

/// Export an Org document to HTML.
///
/// Without a content hook the result is a full HTML page. With one, the
/// hook receives the body fragment and its return value is returned as-is.
pub fn export_html(source: &str) -> Result<String, ConvertError> {
    let mut handler = ExportHandler::default();
    let mut body = Vec::new();
    Org::parse(source).write_html_custom(&mut body, &mut handler)?;
    let fragment = String::from_utf8(body)?;

    let hooked = CONTENT_HOOK.with(|slot| slot.borrow_mut().as_mut().map(|hook| hook(&fragment)));
    Ok(match hooked {
        Some(result) => result,
        None => assemble_page(handler.title.as_deref(), &fragment),
    })
}

/// The exporter's default page template.
fn assemble_page(title: Option<&str>, fragment: &str) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                @if let Some(title) = title {
                    title { (title) }
                }
            }
            body {
                main { (PreEscaped(fragment)) }
            }
        }
    }
    .into_string()
}

/// Renders elements through orgize's default handler, except that the
/// document wrapper is left to the page assembly step and keywords are fed
/// to the keyword hook. Headlines deeper than level 6 come out as `<h6>`.
#[derive(Default)]
struct ExportHandler {
    default: DefaultHtmlHandler,
    title: Option<String>,
}

impl ExportHandler {
    fn keyword(&mut self, key: &str, value: &str) {
        let value = value.trim();
        KEYWORD_HOOK.with(|slot| {
            if let Some(hook) = slot.borrow_mut().as_mut() {
                hook(key, value);
            }
        });
        if key.eq_ignore_ascii_case("title") {
            self.title = Some(value.to_string());
        }
    }
}

impl HtmlHandler<ConvertError> for ExportHandler {
    fn start<W: Write>(&mut self, w: W, element: &Element) -> Result<(), ConvertError> {
        match element {
            Element::Document { .. } => {}
            Element::Keyword(keyword) => self.keyword(&keyword.key, &keyword.value),
            _ => self.default.start(w, element)?,
        }
        Ok(())
    }

    fn end<W: Write>(&mut self, w: W, element: &Element) -> Result<(), ConvertError> {
        match element {
            Element::Document { .. } => {}
            _ => self.default.end(w, element)?,
        }
        Ok(())
    }
}
