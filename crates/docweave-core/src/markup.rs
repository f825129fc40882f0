//! Structured HTML fragments
//!
//! Signatures, badges and breadcrumbs are assembled as ordered lists of typed
//! fragments and only turned into text when a page is rendered.

use std::fmt;

/// A single piece of markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Plain text, escaped on output
    Text(String),
    /// A named character entity, written as `&name;`
    Entity(&'static str),
    /// A hyperlink with plain-text content
    Link { href: String, text: String },
    /// A `<span>` with a CSS class wrapping further markup
    Span { class: &'static str, children: Markup },
}

/// An ordered list of fragments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markup(Vec<Fragment>);

impl Markup {
    /// Create empty markup
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Markup holding a single text fragment
    pub fn text(text: impl Into<String>) -> Self {
        Self(vec![Fragment::Text(text.into())])
    }

    /// Markup holding a single fragment
    pub fn from_fragment(fragment: Fragment) -> Self {
        Self(vec![fragment])
    }

    pub fn push(&mut self, fragment: Fragment) {
        self.0.push(fragment);
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.0.push(Fragment::Text(text.into()));
    }

    pub fn push_entity(&mut self, name: &'static str) {
        self.0.push(Fragment::Entity(name));
    }

    pub fn push_span(&mut self, class: &'static str, children: Markup) {
        self.0.push(Fragment::Span { class, children });
    }

    /// Move every fragment of `other` onto the end of `self`
    pub fn append(&mut self, other: Markup) {
        self.0.extend(other.0);
    }

    /// Join several markups with a text separator
    pub fn join(items: impl IntoIterator<Item = Markup>, separator: &str) -> Self {
        let mut out = Markup::new();
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 {
                out.push_text(separator);
            }
            out.append(item);
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Concatenated text content with all tags removed
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for fragment in &self.0 {
            match fragment {
                Fragment::Text(text) | Fragment::Link { text, .. } => out.push_str(text),
                Fragment::Entity(name) => out.push_str(entity_char(name)),
                Fragment::Span { children, .. } => out.push_str(&children.plain_text()),
            }
        }
        out
    }

    /// Render to an HTML string
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        for fragment in &self.0 {
            match fragment {
                Fragment::Text(text) => out.push_str(&escape_html(text)),
                Fragment::Entity(name) => {
                    out.push('&');
                    out.push_str(name);
                    out.push(';');
                }
                Fragment::Link { href, text } => {
                    out.push_str("<a href=\"");
                    out.push_str(&escape_html(href));
                    out.push_str("\">");
                    out.push_str(&escape_html(text));
                    out.push_str("</a>");
                }
                Fragment::Span { class, children } => {
                    out.push_str("<span class=\"");
                    out.push_str(class);
                    out.push_str("\">");
                    children.write_html(out);
                    out.push_str("</span>");
                }
            }
        }
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_html())
    }
}

impl From<Fragment> for Markup {
    fn from(fragment: Fragment) -> Self {
        Self::from_fragment(fragment)
    }
}

fn entity_char(name: &str) -> &'static str {
    match name {
        "rarr" => "\u{2192}",
        "hellip" => "\u{2026}",
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        _ => "",
    }
}

/// Escape text for inclusion in HTML content or attribute values
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
