//! Per-symbol cleanup pass
//!
//! [`Normalizer::normalize`] runs once over every doclet: it strips quotes,
//! registers the doclet's URL, splits example captions, anchors `#hash`
//! see-references and records source files. [`Normalizer::finish`] runs after
//! every URL is known and fills in anchor ids, short source paths and
//! ancestor chains.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;

use crate::config::{QuotePolicy, TemplateConfig};
use crate::context::Context;
use crate::doclet::{Doclet, Example, Kind, SeeAlso};
use crate::markup::Markup;
use crate::registry::LinkRegistry;

/// Normalizes doclets in place according to the template configuration
pub struct Normalizer<'a> {
    config: &'a TemplateConfig,
}

impl<'a> Normalizer<'a> {
    pub fn new(config: &'a TemplateConfig) -> Self {
        Self { config }
    }

    /// First pass: per-doclet cleanup plus link registration
    pub fn normalize(&self, doclets: &mut [Doclet], ctx: &mut Context) {
        for doclet in doclets.iter_mut() {
            self.normalize_one(doclet, ctx);
        }
        tracing::debug!(
            doclets = doclets.len(),
            links = ctx.registry.len(),
            sources = ctx.sources.len(),
            "doclets normalized"
        );
    }

    fn normalize_one(&self, doclet: &mut Doclet, ctx: &mut Context) {
        let policy = self.config.remove_quotes;
        if policy != QuotePolicy::Off {
            doclet.name = strip_quotes(&doclet.name, policy);
            doclet.longname = strip_quotes(&doclet.longname, policy);
        }
        if doclet.kind == Kind::External {
            doclet.name = strip_surrounding_double_quotes(&doclet.name).to_string();
        }

        let url = ctx.registry.create_link(doclet);
        ctx.registry.register_link(&doclet.longname, url.clone());

        for example in &mut doclet.examples {
            if example.caption.is_empty() {
                *example = parse_example(&example.code);
            }
        }

        for see in &mut doclet.see {
            if let SeeAlso::Reference(reference) = see {
                if let Some(anchor) = hash_to_link(&url, reference) {
                    *see = anchor;
                }
            }
        }

        if let Some(meta) = &doclet.meta {
            ctx.sources.record(&meta.source_path());
        }
    }

    /// Second pass, once every doclet's link is registered
    pub fn finish(&self, doclets: &mut [Doclet], ctx: &mut Context) {
        ctx.sources.shorten();

        for doclet in doclets.iter_mut() {
            if let Some(meta) = &mut doclet.meta {
                meta.shortpath = ctx
                    .sources
                    .shortened(&meta.source_path())
                    .map(str::to_string);
            }

            doclet.id = match ctx.registry.url_for(&doclet.longname) {
                Some(url) => match url.split_once('#') {
                    Some((_, fragment)) => fragment.to_string(),
                    None => doclet.name.clone(),
                },
                None => doclet.name.clone(),
            };
        }

        let ancestors: Vec<Vec<Markup>> = {
            let index = longname_index(doclets);
            doclets
                .iter()
                .map(|doclet| ancestor_links(doclets, &index, doclet, &ctx.registry))
                .collect()
        };
        for (doclet, chain) in doclets.iter_mut().zip(ancestors) {
            doclet.ancestors = chain;
        }
    }
}

/// Drop doclets that should never be documented
pub fn prune(doclets: Vec<Doclet>) -> Vec<Doclet> {
    let before = doclets.len();
    let kept: Vec<Doclet> = doclets
        .into_iter()
        .filter(|d| !d.undocumented && !d.ignore && d.memberof.as_deref() != Some("<anonymous>"))
        .collect();
    tracing::debug!(removed = before - kept.len(), "pruned doclets");
    kept
}

/// Stable sort by longname, then version, then since
pub fn sort(doclets: &mut [Doclet]) {
    doclets.sort_by(|a, b| {
        a.longname
            .cmp(&b.longname)
            .then_with(|| a.version.cmp(&b.version))
            .then_with(|| a.since.cmp(&b.since))
    });
}

/// Record each listener on the events it listens to
pub fn add_event_listeners(doclets: &mut [Doclet]) {
    let pairs: Vec<(String, String)> = doclets
        .iter()
        .flat_map(|d| {
            d.listens
                .iter()
                .map(move |event| (event.clone(), d.longname.clone()))
        })
        .collect();

    for (event, listener) in pairs {
        for doclet in doclets
            .iter_mut()
            .filter(|d| d.kind == Kind::Event && d.longname == event)
        {
            if !doclet.listeners.contains(&listener) {
                doclet.listeners.push(listener.clone());
            }
        }
    }
}

/// Attach doclets that share a module's longname to the module record
pub fn attach_module_symbols(doclets: &mut [Doclet]) {
    let mut by_longname: HashMap<String, Vec<Doclet>> = HashMap::new();
    for doclet in doclets.iter().filter(|d| {
        d.kind != Kind::Module
            && d.longname.starts_with("module:")
            && (d.description.is_some() || d.kind == Kind::Class)
    }) {
        let mut symbol = doclet.clone();
        if symbol.kind == Kind::Class || (symbol.kind == Kind::Function && !symbol.hideconstructor)
        {
            symbol.name = format!("{}'))", symbol.name.replacen("module:", "(require('", 1));
        }
        by_longname
            .entry(symbol.longname.clone())
            .or_default()
            .push(symbol);
    }

    for module in doclets.iter_mut().filter(|d| d.kind == Kind::Module) {
        if let Some(symbols) = by_longname.get(&module.longname) {
            module.module_symbols = symbols.clone();
        }
    }
}

/// Apply a quote-stripping policy to a name
pub fn strip_quotes(value: &str, policy: QuotePolicy) -> String {
    match policy {
        QuotePolicy::Off => value.to_string(),
        QuotePolicy::All => value.chars().filter(|c| *c != '"' && *c != '\'').collect(),
        QuotePolicy::Trim => {
            let value = strip_pair(value, '"');
            strip_pair(value, '\'').to_string()
        }
    }
}

fn strip_pair(value: &str, quote: char) -> &str {
    value
        .strip_prefix(quote)
        .and_then(|rest| rest.strip_suffix(quote))
        .unwrap_or(value)
}

fn strip_surrounding_double_quotes(value: &str) -> &str {
    let value = value.strip_prefix('"').unwrap_or(value);
    value.strip_suffix('"').unwrap_or(value)
}

fn caption_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)^\s*<caption>(.+?)</caption>\s*[\n\r](.+)$")
            .expect("caption pattern is valid")
    })
}

/// Split an example body into its `<caption>` and code
pub fn parse_example(raw: &str) -> Example {
    match caption_re().captures(raw) {
        Some(caps) => Example {
            caption: caps[1].to_string(),
            code: caps[2].to_string(),
        },
        None => Example {
            caption: String::new(),
            code: raw.to_string(),
        },
    }
}

/// Anchor a `#hash` reference on the owning doclet's page
fn hash_to_link(url: &str, reference: &str) -> Option<SeeAlso> {
    if !reference.starts_with('#') || reference.len() < 2 {
        return None;
    }
    let page = url.split('#').next().unwrap_or(url);
    Some(SeeAlso::Anchor {
        href: format!("{}{}", page, reference),
        text: reference.to_string(),
    })
}

/// Whether a doclet is documented with a call signature
pub fn needs_signature(doclet: &Doclet) -> bool {
    match doclet.kind {
        Kind::Function => true,
        Kind::Class => !doclet.hideconstructor,
        Kind::Typedef => doclet.type_expr.as_ref().is_some_and(|t| {
            t.names
                .iter()
                .any(|name| name.eq_ignore_ascii_case("function"))
        }),
        Kind::Namespace => doclet
            .meta
            .as_ref()
            .and_then(|m| m.code_type.as_deref())
            .is_some_and(|code_type| code_type.contains("Function") || code_type.contains("function")),
        _ => false,
    }
}

/// Constants are documented exactly like members
pub fn reclassify(doclet: &mut Doclet) {
    if doclet.kind == Kind::Constant {
        doclet.kind = Kind::Member;
    }
}

/// First doclet index for every longname
fn longname_index(doclets: &[Doclet]) -> HashMap<&str, usize> {
    let mut index = HashMap::new();
    for (i, doclet) in doclets.iter().enumerate() {
        index.entry(doclet.longname.as_str()).or_insert(i);
    }
    index
}

/// Links to every ancestor of a doclet, outermost first
fn ancestor_links(
    doclets: &[Doclet],
    index: &HashMap<&str, usize>,
    doclet: &Doclet,
    registry: &LinkRegistry,
) -> Vec<Markup> {
    let mut chain: Vec<&Doclet> = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();
    visited.insert(doclet.longname.as_str());

    let mut parent = doclet.memberof.as_deref();
    while let Some(longname) = parent {
        if !visited.insert(longname) {
            break;
        }
        let Some(&i) = index.get(longname) else {
            break;
        };
        chain.push(&doclets[i]);
        parent = doclets[i].memberof.as_deref();
    }
    chain.reverse();

    let mut links: Vec<Markup> = chain
        .iter()
        .map(|ancestor| {
            let punctuation = ancestor.scope.map_or("", |s| s.punctuation());
            let text = format!("{}{}", punctuation, ancestor.name);
            Markup::from_fragment(registry.link_to(&ancestor.longname, &text))
        })
        .collect();

    if let Some(last) = links.last_mut() {
        let punctuation = doclet.scope.map_or("", |s| s.punctuation());
        if !punctuation.is_empty() {
            last.push_text(punctuation);
        }
    }
    links
}
