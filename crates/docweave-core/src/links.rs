//! Post-render link resolution
//!
//! Rendered pages may still carry inline placeholders copied from symbol
//! descriptions. They are rewritten against the registry right before a page
//! is written. Misses become plain text.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::markup::escape_html;
use crate::registry::LinkRegistry;

fn link_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)(?:\[([^\]]+?)\])?\{@(link|linkcode|linkplain)\s+(.+?)\}")
            .expect("link tag pattern is valid")
    })
}

fn tutorial_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\{@tutorial\s+([^}]+?)\s*\}").expect("tutorial tag pattern is valid")
    })
}

fn url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:https?|ftps?)://").expect("url pattern is valid"))
}

/// Rewrite every `{@link}` and `{@tutorial}` placeholder in `html`
pub fn resolve_links(html: &str, registry: &LinkRegistry) -> String {
    let linked = link_tag_re().replace_all(html, |caps: &Captures<'_>| {
        let (target, inline_text) = split_link_text(&caps[3]);
        let text = caps
            .get(1)
            .map(|m| m.as_str().to_string())
            .or(inline_text)
            .unwrap_or_else(|| target.clone());
        let text = if caps[2].eq_ignore_ascii_case("linkcode") {
            format!("<code>{}</code>", text)
        } else {
            text
        };

        match resolve_target(&target, registry) {
            Some(url) => format!("<a href=\"{}\">{}</a>", escape_html(&url), text),
            None => text,
        }
    });

    tutorial_tag_re()
        .replace_all(&linked, |caps: &Captures<'_>| {
            let name = &caps[1];
            match registry.tutorial(name) {
                Some(link) => format!(
                    "<a href=\"{}\">{}</a>",
                    escape_html(&link.url),
                    escape_html(&link.title)
                ),
                None => format!("<em class=\"disabled\">Tutorial: {}</em>", escape_html(name)),
            }
        })
        .into_owned()
}

/// Split `target|text` or `target text` into the target and optional text
fn split_link_text(body: &str) -> (String, Option<String>) {
    let body = body.trim();
    let split = body
        .split_once('|')
        .or_else(|| body.split_once(char::is_whitespace));
    match split {
        Some((target, text)) => {
            let text = text.trim();
            (
                target.trim().to_string(),
                (!text.is_empty()).then(|| text.to_string()),
            )
        }
        None => (body.to_string(), None),
    }
}

fn resolve_target(target: &str, registry: &LinkRegistry) -> Option<String> {
    if url_re().is_match(target) {
        return Some(target.to_string());
    }
    registry.url_for(target).map(str::to_string)
}
