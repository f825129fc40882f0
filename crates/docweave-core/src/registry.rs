//! Link registry
//!
//! Maps every symbol's longname to the URL of the page (and in-page anchor)
//! that documents it. All of it has to be filled in before anything that
//! resolves cross-links runs.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::doclet::{Doclet, Scope};
use crate::markup::{Fragment, Markup};

/// Extension appended to every generated page
pub const FILE_EXTENSION: &str = ".html";

/// Longname of the synthetic page that collects global symbols
pub const GLOBAL_LONGNAME: &str = "global";

/// Namespace prefixes that may lead a longname
const NAMESPACES: [&str; 4] = ["module", "event", "external", "package"];

/// A tutorial's page and display title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TutorialLink {
    pub url: String,
    pub title: String,
}

/// Bidirectional bookkeeping between longnames and output locations
#[derive(Debug, Default)]
pub struct LinkRegistry {
    /// longname -> URL, in first-registration order
    links: IndexMap<String, String>,
    /// longname -> page filename, for longnames that host a page
    filenames: HashMap<String, String>,
    /// lowercased filenames already handed out
    taken: HashSet<String>,
    /// page filename -> (anchor id -> longname that owns it)
    anchors: HashMap<String, HashMap<String, String>>,
    /// tutorial name -> page, kept apart from symbol longnames
    tutorials: IndexMap<String, TutorialLink>,
}

impl LinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the URL for a longname; a second registration replaces the first
    pub fn register_link(&mut self, longname: &str, url: impl Into<String>) {
        let url = url.into();
        if let Some(previous) = self.links.get(longname) {
            if *previous != url {
                tracing::debug!(longname, previous = %previous, url = %url, "link re-registered");
            }
        }
        self.links.insert(longname.to_string(), url);
    }

    pub fn url_for(&self, longname: &str) -> Option<&str> {
        self.links.get(longname).map(String::as_str)
    }

    pub fn contains(&self, longname: &str) -> bool {
        self.links.contains_key(longname)
    }

    /// Registered longnames in first-registration order
    pub fn longnames(&self) -> impl Iterator<Item = &str> {
        self.links.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Allocate a filesystem-safe page filename that no other page uses.
    ///
    /// Collisions are compared case-insensitively and resolved with a numeric
    /// suffix: `Foo.html`, `foo_2.html`, `foo_3.html`.
    pub fn unique_filename(&mut self, s: &str) -> String {
        let mut base = sanitize_filename(s);
        if base.starts_with('_') {
            base.insert(0, '-');
        }

        let mut candidate = base.clone();
        let mut n = 2;
        while self.taken.contains(&candidate.to_lowercase()) {
            candidate = format!("{}_{}", base, n);
            n += 1;
        }
        self.taken.insert(candidate.to_lowercase());

        candidate.push_str(FILE_EXTENSION);
        candidate
    }

    /// The page filename hosting `longname`, allocated on first request
    pub fn filename_for(&mut self, longname: &str) -> String {
        if let Some(filename) = self.filenames.get(longname) {
            return filename.clone();
        }
        let filename = self.unique_filename(longname);
        self.filenames
            .insert(longname.to_string(), filename.clone());
        filename
    }

    /// Reserve `global.html` and register it under the `global` longname
    pub fn register_global(&mut self) -> String {
        let url = self.filename_for(GLOBAL_LONGNAME);
        self.register_link(GLOBAL_LONGNAME, url.clone());
        url
    }

    /// Compute the URL a doclet should be documented at.
    ///
    /// Containers get a page of their own; everything else is an anchor on
    /// its parent's page, or on the global page when it has no parent.
    pub fn create_link(&mut self, doclet: &Doclet) -> String {
        if doclet.kind.is_container() || doclet.is_module_exports() {
            return self.filename_for(&doclet.longname);
        }

        let host = match doclet.memberof.as_deref() {
            Some(parent) if parent != GLOBAL_LONGNAME => parent,
            _ => GLOBAL_LONGNAME,
        };
        let filename = self.filename_for(host);

        let needs_anchor = doclet.name != doclet.longname
            || doclet.scope == Some(Scope::Global)
            || host == GLOBAL_LONGNAME;
        if !needs_anchor {
            return filename;
        }

        let punctuation = match doclet.scope {
            Some(Scope::Instance) | None => "",
            Some(scope) => scope.punctuation(),
        };
        let wanted = format!("{}{}", punctuation, doclet.name);
        let id = self.unique_anchor(&filename, &wanted, &doclet.longname);
        format!("{}#{}", filename, id)
    }

    /// An anchor id unique within `filename`; a longname always gets the same id back
    fn unique_anchor(&mut self, filename: &str, wanted: &str, longname: &str) -> String {
        let ids = self.anchors.entry(filename.to_string()).or_default();
        let base: String = wanted.chars().filter(|c| !c.is_whitespace()).collect();

        let mut candidate = base.clone();
        let mut n = 2;
        loop {
            match ids.get(&candidate) {
                Some(owner) if owner == longname => return candidate,
                Some(_) => {
                    candidate = format!("{}_{}", base, n);
                    n += 1;
                }
                None => {
                    ids.insert(candidate.clone(), longname.to_string());
                    return candidate;
                }
            }
        }
    }

    /// Allocate and remember the page for a tutorial
    pub fn register_tutorial(&mut self, name: &str, title: &str) -> String {
        if let Some(link) = self.tutorials.get(name) {
            return link.url.clone();
        }
        let url = self.unique_filename(&format!("tutorial-{}", name));
        self.tutorials.insert(
            name.to_string(),
            TutorialLink {
                url: url.clone(),
                title: title.to_string(),
            },
        );
        url
    }

    pub fn tutorial(&self, name: &str) -> Option<&TutorialLink> {
        self.tutorials.get(name)
    }

    /// Link to a longname, or plain text when it has no page
    pub fn link_to(&self, longname: &str, text: &str) -> Fragment {
        match self.url_for(longname) {
            Some(url) => Fragment::Link {
                href: url.to_string(),
                text: text.to_string(),
            },
            None => Fragment::Text(text.to_string()),
        }
    }

    /// Link every resolvable identifier inside a type expression.
    ///
    /// `Array.<Widget>` links `Array` and `Widget` separately and keeps the
    /// punctuation as text.
    pub fn link_type(&self, expr: &str) -> Markup {
        if self.contains(expr) {
            return Markup::from_fragment(self.link_to(expr, expr));
        }

        let mut out = Markup::new();
        let mut last = 0;
        for found in type_name_re().find_iter(expr) {
            if found.start() > last {
                out.push_text(&expr[last..found.start()]);
            }
            out.push(self.link_to(found.as_str(), found.as_str()));
            last = found.end();
        }
        if last < expr.len() {
            out.push_text(&expr[last..]);
        }
        out
    }
}

fn type_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?:(?:module|event|external):)?[A-Za-z_$][\w$]*(?:[.#~/][A-Za-z_$][\w$]*)*",
        )
        .expect("type name pattern is valid")
    })
}

/// Turn a longname into a string that is safe as a file name on every platform
fn sanitize_filename(s: &str) -> String {
    let mut name = s.to_string();

    for namespace in NAMESPACES {
        if let Some(rest) = name.strip_prefix(namespace).and_then(|r| r.strip_prefix(':')) {
            name = format!("{}-{}", namespace, rest);
            break;
        }
    }

    // Drop a trailing variation such as `(overload-2)`
    if name.ends_with(')') {
        if let Some(open) = name.find('(') {
            name.truncate(open);
        }
    }

    let mut name: String = name
        .chars()
        .map(|c| match c {
            '\\' | '/' | '?' | '*' | ':' | '|' | '\'' | '"' | '<' | '>' | '#' => '_',
            '~' => '-',
            c => c,
        })
        .collect();

    if name.starts_with('.') || name.starts_with('-') {
        name.remove(0);
    }
    if name.is_empty() {
        name.push('_');
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doclet::Kind;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("module:utils/strings"), "module-utils_strings");
        assert_eq!(sanitize_filename("Foo#bar"), "Foo_bar");
        assert_eq!(sanitize_filename("Foo~inner"), "Foo-inner");
        assert_eq!(sanitize_filename("Foo(variant)"), "Foo");
        assert_eq!(sanitize_filename(".hidden"), "hidden");
        assert_eq!(sanitize_filename(""), "_");
    }

    #[test]
    fn test_unique_filename_is_case_insensitive() {
        let mut registry = LinkRegistry::new();
        assert_eq!(registry.unique_filename("Widget"), "Widget.html");
        assert_eq!(registry.unique_filename("widget"), "widget_2.html");
        assert_eq!(registry.unique_filename("WIDGET"), "WIDGET_3.html");
        assert_eq!(registry.unique_filename("_private"), "-_private.html");
    }

    #[test]
    fn test_container_and_member_links() {
        let mut registry = LinkRegistry::new();
        let class = Doclet::new(Kind::Class, "Widget", "Widget");
        let method = Doclet::new(Kind::Function, "render", "Widget#render")
            .with_memberof("Widget")
            .with_scope(Scope::Instance);
        let factory = Doclet::new(Kind::Function, "create", "Widget.create")
            .with_memberof("Widget")
            .with_scope(Scope::Static);

        assert_eq!(registry.create_link(&class), "Widget.html");
        assert_eq!(registry.create_link(&method), "Widget.html#render");
        assert_eq!(registry.create_link(&factory), "Widget.html#.create");
    }

    #[test]
    fn test_member_before_container_shares_page() {
        let mut registry = LinkRegistry::new();
        let method = Doclet::new(Kind::Function, "render", "Widget#render")
            .with_memberof("Widget")
            .with_scope(Scope::Instance);
        assert_eq!(registry.create_link(&method), "Widget.html#render");

        let class = Doclet::new(Kind::Class, "Widget", "Widget");
        assert_eq!(registry.create_link(&class), "Widget.html");
    }

    #[test]
    fn test_global_symbols_land_on_global_page() {
        let mut registry = LinkRegistry::new();
        assert_eq!(registry.register_global(), "global.html");

        let function = Doclet::new(Kind::Function, "main", "main").with_scope(Scope::Global);
        assert_eq!(registry.create_link(&function), "global.html#main");
        assert_eq!(registry.url_for(GLOBAL_LONGNAME), Some("global.html"));
    }

    #[test]
    fn test_colliding_anchors_get_suffix() {
        let mut registry = LinkRegistry::new();
        let first = Doclet::new(Kind::Member, "size", "Box#size")
            .with_memberof("Box")
            .with_scope(Scope::Instance);
        let second = Doclet::new(Kind::Member, "size", "Box#\"size\"")
            .with_memberof("Box")
            .with_scope(Scope::Instance);

        let a = registry.create_link(&first);
        let b = registry.create_link(&second);
        assert_eq!(a, "Box.html#size");
        assert_eq!(b, "Box.html#size_2");

        // Same longname again resolves to the same anchor
        assert_eq!(registry.create_link(&first), a);
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = LinkRegistry::new();
        registry.register_link("dup", "a.html");
        registry.register_link("other", "b.html");
        registry.register_link("dup", "c.html");

        assert_eq!(registry.url_for("dup"), Some("c.html"));
        let order: Vec<_> = registry.longnames().collect();
        assert_eq!(order, vec!["dup", "other"]);
    }

    #[test]
    fn test_link_to_unresolved_is_text() {
        let registry = LinkRegistry::new();
        assert_eq!(
            registry.link_to("Nowhere", "Nowhere"),
            Fragment::Text("Nowhere".to_string())
        );
    }

    #[test]
    fn test_link_type_components() {
        let mut registry = LinkRegistry::new();
        registry.register_link("Widget", "Widget.html");

        let markup = registry.link_type("Array.<Widget>");
        assert_eq!(
            markup.to_html(),
            "Array.&lt;<a href=\"Widget.html\">Widget</a>&gt;"
        );
        assert_eq!(registry.link_type("string").to_html(), "string");
    }

    #[test]
    fn test_tutorial_urls_are_separate() {
        let mut registry = LinkRegistry::new();
        let url = registry.register_tutorial("intro", "Introduction");
        assert_eq!(url, "tutorial-intro.html");
        assert_eq!(registry.tutorial("intro").unwrap().title, "Introduction");
        assert!(registry.url_for("intro").is_none());
    }
}
