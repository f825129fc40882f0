//! Rendering collaborator contract and the built-in HTML renderer

use std::fmt::Write;

use thiserror::Error;

use crate::doclet::{Doclet, Kind, Param, SeeAlso};
use crate::emit::{Page, PageDoc, Template};
use crate::markup::{escape_html, Markup};
use crate::nav::{GlobalNav, Nav, NavLink, NavNode};
use crate::registry::LinkRegistry;
use crate::signature::{attribs_markup, types_markup};
use crate::source::source_listing;
use crate::tutorial::Tutorial;

/// Errors returned by a renderer
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("formatting failed: {0}")]
    Fmt(#[from] std::fmt::Error),

    #[error("template '{template}' cannot render page '{title}'")]
    Unsupported {
        template: &'static str,
        title: String,
    },
}

/// Everything shared by all pages of one run
pub struct View<'a> {
    pub nav: &'a Nav,
    pub registry: &'a LinkRegistry,
    /// The final symbol set
    pub doclets: &'a [Doclet],
    /// Link each symbol to its place in the source listing
    pub output_source_files: bool,
}

impl<'a> View<'a> {
    /// Direct children of `longname` of the given kind, in input order
    pub fn children(&self, longname: &str, kind: Kind) -> Vec<&'a Doclet> {
        self.doclets
            .iter()
            .filter(|d| d.kind == kind && d.memberof.as_deref() == Some(longname))
            .collect()
    }

    /// Symbols documented on the global page
    pub fn globals(&self, kind: Kind) -> Vec<&'a Doclet> {
        self.doclets
            .iter()
            .filter(|d| d.kind == kind && d.is_global() && !d.is_module_exports())
            .collect()
    }
}

/// Turns one page descriptor into a complete HTML document
pub trait Render {
    fn render(&self, page: &Page<'_>, view: &View<'_>) -> Result<String, RenderError>;
}

/// Built-in renderer producing self-contained pages with inline styles
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    /// Appended to every `<title>`
    pub site_title: String,
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self {
            site_title: String::from("Documentation"),
        }
    }
}

impl HtmlRenderer {
    pub fn new(site_title: impl Into<String>) -> Self {
        Self {
            site_title: site_title.into(),
        }
    }
}

impl Render for HtmlRenderer {
    fn render(&self, page: &Page<'_>, view: &View<'_>) -> Result<String, RenderError> {
        let mut output = String::new();

        writeln!(output, "<!DOCTYPE html>")?;
        writeln!(output, "<html lang=\"en\">")?;
        writeln!(output, "<head>")?;
        writeln!(output, "  <meta charset=\"UTF-8\">")?;
        writeln!(
            output,
            "  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">"
        )?;
        writeln!(
            output,
            "  <title>{} - {}</title>",
            escape_html(&page.title),
            escape_html(&self.site_title)
        )?;
        writeln!(output, "<style>{}</style>", STYLES)?;
        writeln!(output, "</head>")?;
        writeln!(output, "<body>")?;

        writeln!(output, "<nav class=\"sidebar\">")?;
        write_nav(&mut output, view.nav, &page.filename)?;
        writeln!(output, "</nav>")?;

        writeln!(output, "<main class=\"content\">")?;
        writeln!(output, "<h1 class=\"page-title\">{}</h1>", escape_html(&page.title))?;

        match page.template {
            Template::Container => {
                for doc in &page.docs {
                    write_container_doc(&mut output, doc, view)?;
                }
                if let Some(PageDoc::Symbol(first)) = page.docs.first() {
                    write_children(&mut output, first, view)?;
                }
            }
            Template::Tutorial => match page.docs.first() {
                Some(PageDoc::Tutorial(tutorial)) => write_tutorial(&mut output, tutorial, view)?,
                _ => {
                    return Err(RenderError::Unsupported {
                        template: page.template.as_str(),
                        title: page.title.clone(),
                    })
                }
            },
        }

        writeln!(output, "</main>")?;
        writeln!(output, "<footer>")?;
        writeln!(
            output,
            "  <p>Generated by docweave {}</p>",
            crate::VERSION
        )?;
        writeln!(output, "</footer>")?;
        writeln!(output, "</body>")?;
        writeln!(output, "</html>")?;

        Ok(output)
    }
}

/// `current` is the file name of the page being rendered; its entry keeps
/// its leaves visible in collapse mode.
fn write_nav(output: &mut String, nav: &Nav, current: &str) -> std::fmt::Result {
    writeln!(output, "<h2>{}</h2>", nav_link(&nav.home))?;

    for menu in &nav.menu {
        let mut attributes = String::new();
        for (name, value) in &menu.attributes {
            write!(attributes, " {}=\"{}\"", escape_html(name), escape_html(value))?;
        }
        writeln!(
            output,
            "<h3 class=\"menu-link\"><a{}>{}</a></h3>",
            attributes,
            escape_html(&menu.label)
        )?;
    }

    for section in &nav.sections {
        writeln!(output, "<h3>{}</h3>", section.section.heading())?;
        writeln!(output, "<ul>")?;
        for node in &section.nodes {
            write_nav_node(output, node, nav.collapse, current)?;
        }
        writeln!(output, "</ul>")?;
    }

    match &nav.global {
        GlobalNav::Absent => {}
        GlobalNav::Page(link) => writeln!(output, "<h3>{}</h3>", nav_link(link))?,
        GlobalNav::Items(items) => {
            writeln!(output, "<h3>Global</h3>")?;
            writeln!(output, "<ul>")?;
            for item in items {
                writeln!(output, "  <li>{}</li>", nav_link(item))?;
            }
            writeln!(output, "</ul>")?;
        }
    }
    Ok(())
}

fn write_nav_node(
    output: &mut String,
    node: &NavNode,
    collapse: bool,
    current: &str,
) -> std::fmt::Result {
    let is_current = node
        .url
        .as_deref()
        .is_some_and(|url| url.split('#').next() == Some(current));
    let classes: Vec<&str> = [("collapsed", node.collapsed), ("current", is_current)]
        .into_iter()
        .filter_map(|(name, on)| on.then_some(name))
        .collect();
    let class = if classes.is_empty() {
        String::new()
    } else {
        format!(" class=\"{}\"", classes.join(" "))
    };
    write!(
        output,
        "  <li{}>{}",
        class,
        nav_link(&NavLink {
            label: node.label.clone(),
            url: node.url.clone(),
        })
    )?;

    let hidden = if collapse { " collapsed" } else { "" };
    for (list, leaves, data_type) in [
        ("members", &node.members, "member"),
        ("methods", &node.methods, "method"),
    ] {
        if leaves.is_empty() {
            continue;
        }
        write!(output, "<ul class=\"{}{}\">", list, hidden)?;
        for leaf in leaves {
            write!(output, "<li data-type=\"{}\">{}</li>", data_type, nav_link(leaf))?;
        }
        write!(output, "</ul>")?;
    }
    writeln!(output, "</li>")
}

fn nav_link(link: &NavLink) -> String {
    match &link.url {
        Some(url) => format!(
            "<a href=\"{}\">{}</a>",
            escape_html(url),
            escape_html(&link.label)
        ),
        None => escape_html(&link.label),
    }
}

fn write_container_doc(output: &mut String, doc: &PageDoc<'_>, view: &View<'_>) -> std::fmt::Result {
    match doc {
        PageDoc::Symbol(doclet) => match doclet.kind {
            Kind::Package => {
                let version = doclet.version.as_deref().unwrap_or_default();
                writeln!(
                    output,
                    "<h3 class=\"package\">{} {}</h3>",
                    escape_html(&doclet.name),
                    escape_html(version)
                )
            }
            Kind::File => {
                writeln!(output, "<section class=\"file\">")?;
                writeln!(output, "  <h3>{}</h3>", escape_html(&doclet.name))?;
                write_description(output, doclet)?;
                writeln!(output, "</section>")
            }
            _ => write_container_header(output, doclet, view),
        },
        PageDoc::MainPage { readme, .. } => match readme {
            Some(readme) => {
                writeln!(output, "<section class=\"readme\">")?;
                writeln!(output, "  <article>{}</article>", readme)?;
                writeln!(output, "</section>")
            }
            None => Ok(()),
        },
        PageDoc::GlobalObject => write_globals(output, view),
        PageDoc::Source { code, .. } => {
            writeln!(output, "<section class=\"source\">")?;
            writeln!(output, "<pre class=\"source linenums\"><code><ol>")?;
            output.push_str(&source_listing(code));
            writeln!(output, "</ol></code></pre>")?;
            writeln!(output, "</section>")
        }
        PageDoc::Tutorial(tutorial) => write_tutorial(output, tutorial, view),
    }
}

fn write_container_header(output: &mut String, doclet: &Doclet, view: &View<'_>) -> std::fmt::Result {
    writeln!(output, "<section class=\"container\">")?;
    writeln!(output, "<header>")?;
    if !doclet.ancestors.is_empty() {
        let ancestors: Vec<String> = doclet.ancestors.iter().map(Markup::to_html).collect();
        writeln!(output, "  <span class=\"ancestors\">{}</span>", ancestors.join(""))?;
    }
    writeln!(output, "  <h2>{}</h2>", escape_html(&doclet.name))?;
    writeln!(output, "</header>")?;

    if doclet.kind == Kind::Class && doclet.signature.is_some() {
        write_item(output, doclet, view, "new ")?;
    } else {
        writeln!(output, "<div class=\"item\">")?;
        write_description(output, doclet)?;
        write_details(output, doclet, view)?;
        writeln!(output, "</div>")?;
    }

    for symbol in &doclet.module_symbols {
        let prefix = if symbol.kind == Kind::Class { "new " } else { "" };
        write_item(output, symbol, view, prefix)?;
    }
    writeln!(output, "</section>")
}

/// Child listings shown once per container page
fn write_children(output: &mut String, parent: &Doclet, view: &View<'_>) -> std::fmt::Result {
    let longname = parent.longname.as_str();

    for (heading, kind) in [
        ("Classes", Kind::Class),
        ("Interfaces", Kind::Interface),
        ("Mixins", Kind::Mixin),
        ("Namespaces", Kind::Namespace),
    ] {
        let children = view.children(longname, kind);
        if children.is_empty() {
            continue;
        }
        writeln!(output, "<h3 class=\"subsection-title\">{}</h3>", heading)?;
        writeln!(output, "<dl>")?;
        for child in children {
            let link = Markup::from_fragment(view.registry.link_to(&child.longname, &child.longname));
            writeln!(output, "  <dt>{}</dt>", link.to_html())?;
            if let Some(description) = &child.description {
                writeln!(output, "  <dd>{}</dd>", description)?;
            }
        }
        writeln!(output, "</dl>")?;
    }

    for (heading, kind) in [
        ("Members", Kind::Member),
        ("Methods", Kind::Function),
        ("Type Definitions", Kind::Typedef),
        ("Events", Kind::Event),
    ] {
        let children = view.children(longname, kind);
        write_item_list(output, heading, &children, view)?;
    }
    Ok(())
}

fn write_globals(output: &mut String, view: &View<'_>) -> std::fmt::Result {
    for (heading, kind) in [
        ("Members", Kind::Member),
        ("Methods", Kind::Function),
        ("Type Definitions", Kind::Typedef),
        ("Events", Kind::Event),
    ] {
        let globals = view.globals(kind);
        write_item_list(output, heading, &globals, view)?;
    }
    Ok(())
}

fn write_item_list(
    output: &mut String,
    heading: &str,
    items: &[&Doclet],
    view: &View<'_>,
) -> std::fmt::Result {
    if items.is_empty() {
        return Ok(());
    }
    writeln!(output, "<section id=\"{}\">", heading.to_lowercase().replace(' ', "-"))?;
    writeln!(output, "<h3 class=\"subsection-title\">{}</h3>", heading)?;
    for item in items {
        write_item(output, item, view, "")?;
    }
    writeln!(output, "</section>")
}

fn write_item(output: &mut String, doclet: &Doclet, view: &View<'_>, prefix: &str) -> std::fmt::Result {
    writeln!(output, "<div class=\"item\">")?;

    let signature = doclet
        .signature
        .as_ref()
        .map_or_else(|| escape_html(&doclet.name), Markup::to_html);
    writeln!(
        output,
        "  <h4 class=\"name\" id=\"{}\">{}{}<span class=\"signature\">{}</span></h4>",
        escape_html(&doclet.id),
        attribs_markup(&doclet.attribs).to_html(),
        prefix,
        signature
    )?;

    write_description(output, doclet)?;
    write_details(output, doclet, view)?;
    writeln!(output, "</div>")
}

fn write_description(output: &mut String, doclet: &Doclet) -> std::fmt::Result {
    if let Some(description) = &doclet.description {
        writeln!(output, "  <div class=\"description\">{}</div>", description)?;
    }
    Ok(())
}

fn write_details(output: &mut String, doclet: &Doclet, view: &View<'_>) -> std::fmt::Result {
    let params: Vec<&Param> = doclet.params.iter().collect();
    if !params.is_empty() {
        writeln!(output, "  <h5>Parameters:</h5>")?;
        write_params(output, &params, view)?;
    }

    let returns = doclet.return_like();
    if !returns.is_empty() {
        let heading = if doclet.yields.is_empty() { "Returns" } else { "Yields" };
        writeln!(output, "  <h5>{}:</h5>", heading)?;
        for entry in returns {
            writeln!(output, "  <div class=\"param-desc\">")?;
            if let Some(description) = &entry.description {
                writeln!(output, "    {}", description)?;
            }
            if let Some(type_expr) = &entry.type_expr {
                writeln!(
                    output,
                    "    <dl><dt>Type</dt><dd><span class=\"param-type\">{}</span></dd></dl>",
                    types_markup(&type_expr.names, view.registry).to_html()
                )?;
            }
            writeln!(output, "  </div>")?;
        }
    }

    if doclet.kind != Kind::Function && doclet.params.is_empty() {
        if let Some(type_expr) = &doclet.type_expr {
            writeln!(
                output,
                "  <h5>Type:</h5><ul><li><span class=\"param-type\">{}</span></li></ul>",
                types_markup(&type_expr.names, view.registry).to_html()
            )?;
        }
    }

    writeln!(output, "  <dl class=\"details\">")?;
    if let Some(version) = &doclet.version {
        writeln!(output, "    <dt>Version:</dt><dd>{}</dd>", escape_html(version))?;
    }
    if let Some(since) = &doclet.since {
        writeln!(output, "    <dt>Since:</dt><dd>{}</dd>", escape_html(since))?;
    }
    if view.output_source_files {
        if let Some(meta) = &doclet.meta {
            if let Some(shortpath) = &meta.shortpath {
                write_source_link(output, shortpath, meta.lineno, view)?;
            }
        }
    }
    write_longname_list(output, "Fires:", &doclet.fires, view)?;
    write_longname_list(output, "Listeners of This Event:", &doclet.listeners, view)?;
    if !doclet.see.is_empty() {
        writeln!(output, "    <dt>See:</dt><dd><ul>")?;
        for see in &doclet.see {
            let link = match see {
                SeeAlso::Anchor { href, text } => format!(
                    "<a href=\"{}\">{}</a>",
                    escape_html(href),
                    escape_html(text)
                ),
                SeeAlso::Reference(reference) => {
                    Markup::from_fragment(view.registry.link_to(reference, reference)).to_html()
                }
            };
            writeln!(output, "      <li>{}</li>", link)?;
        }
        writeln!(output, "    </ul></dd>")?;
    }
    writeln!(output, "  </dl>")?;

    for example in &doclet.examples {
        writeln!(output, "  <h5>Example</h5>")?;
        if !example.caption.is_empty() {
            writeln!(output, "  <p class=\"code-caption\">{}</p>", example.caption)?;
        }
        writeln!(output, "  <pre class=\"example\"><code>{}</code></pre>", escape_html(&example.code))?;
    }
    Ok(())
}

fn write_params(output: &mut String, params: &[&Param], view: &View<'_>) -> std::fmt::Result {
    writeln!(output, "  <table class=\"params\">")?;
    writeln!(
        output,
        "    <thead><tr><th>Name</th><th>Type</th><th>Attributes</th><th>Description</th></tr></thead>"
    )?;
    writeln!(output, "    <tbody>")?;
    for param in params {
        let types = param
            .type_expr
            .as_ref()
            .map(|t| types_markup(&t.names, view.registry).to_html())
            .unwrap_or_default();
        let mut attributes = Vec::new();
        if param.optional {
            attributes.push("&lt;optional&gt;");
        }
        match param.nullable {
            Some(true) => attributes.push("&lt;nullable&gt;"),
            Some(false) => attributes.push("&lt;non-null&gt;"),
            None => {}
        }
        if param.variable {
            attributes.push("&lt;repeatable&gt;");
        }
        writeln!(
            output,
            "      <tr><td class=\"name\"><code>{}</code></td><td class=\"type\">{}</td><td class=\"attributes\">{}</td><td class=\"description\">{}</td></tr>",
            escape_html(param.name.as_deref().unwrap_or_default()),
            types,
            attributes.join("<br>"),
            param.description.as_deref().unwrap_or_default()
        )?;
    }
    writeln!(output, "    </tbody>")?;
    writeln!(output, "  </table>")
}

fn write_source_link(
    output: &mut String,
    shortpath: &str,
    lineno: Option<u32>,
    view: &View<'_>,
) -> std::fmt::Result {
    let text = match lineno {
        Some(line) => format!("{}, line {}", shortpath, line),
        None => shortpath.to_string(),
    };
    let link = match view.registry.url_for(shortpath) {
        Some(url) => {
            let anchor = lineno.map(|line| format!("#line{}", line)).unwrap_or_default();
            format!(
                "<a href=\"{}{}\">{}</a>",
                escape_html(url),
                anchor,
                escape_html(&text)
            )
        }
        None => escape_html(&text),
    };
    writeln!(output, "    <dt>Source:</dt><dd class=\"tag-source\">{}</dd>", link)
}

fn write_longname_list(
    output: &mut String,
    label: &str,
    longnames: &[String],
    view: &View<'_>,
) -> std::fmt::Result {
    if longnames.is_empty() {
        return Ok(());
    }
    writeln!(output, "    <dt>{}</dt><dd><ul>", label)?;
    for longname in longnames {
        let link = Markup::from_fragment(view.registry.link_to(longname, longname));
        writeln!(output, "      <li>{}</li>", link.to_html())?;
    }
    writeln!(output, "    </ul></dd>")
}

fn write_tutorial(output: &mut String, tutorial: &Tutorial, view: &View<'_>) -> std::fmt::Result {
    writeln!(output, "<section class=\"tutorial\">")?;
    writeln!(output, "<header>")?;
    if !tutorial.children.is_empty() {
        writeln!(output, "  <ul>")?;
        for child in &tutorial.children {
            let link = match view.registry.tutorial(&child.name) {
                Some(link) => format!(
                    "<a href=\"{}\">{}</a>",
                    escape_html(&link.url),
                    escape_html(&link.title)
                ),
                None => escape_html(&child.title),
            };
            writeln!(output, "    <li>{}</li>", link)?;
        }
        writeln!(output, "  </ul>")?;
    }
    writeln!(output, "  <h2>{}</h2>", escape_html(&tutorial.title))?;
    writeln!(output, "</header>")?;
    writeln!(output, "<article>{}</article>", tutorial.content)?;
    writeln!(output, "</section>")
}

const STYLES: &str = r"
:root {
  --bg-color: #fdfdfd;
  --text-color: #222;
  --accent-color: #4b3fbf;
  --code-bg: #f3f3f7;
  --sidebar-bg: #f5f5fa;
  --border-color: #ddd;
}

* {
  box-sizing: border-box;
  margin: 0;
  padding: 0;
}

body {
  font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, sans-serif;
  background-color: var(--bg-color);
  color: var(--text-color);
  line-height: 1.6;
  display: flex;
}

.sidebar {
  width: 280px;
  background-color: var(--sidebar-bg);
  height: 100vh;
  position: fixed;
  overflow-y: auto;
  border-right: 1px solid var(--border-color);
  padding: 1rem;
}

.sidebar h3 {
  font-size: 0.875rem;
  text-transform: uppercase;
  color: #888;
  margin: 1rem 0 0.5rem;
}

.sidebar ul {
  list-style: none;
}

.sidebar ul ul {
  padding-left: 1rem;
}

.sidebar a {
  color: var(--text-color);
  text-decoration: none;
  font-size: 0.9rem;
}

.sidebar a:hover {
  color: var(--accent-color);
}

.sidebar .collapsed {
  display: none;
}

.sidebar li.current {
  display: list-item;
}

.sidebar li.current > ul.collapsed {
  display: block;
}

.content {
  margin-left: 280px;
  padding: 2rem 3rem;
  max-width: 960px;
}

.page-title {
  font-size: 2.25rem;
  color: var(--accent-color);
  margin-bottom: 1rem;
}

.subsection-title {
  font-size: 1.4rem;
  border-bottom: 2px solid var(--border-color);
  padding-bottom: 0.5rem;
  margin: 2rem 0 1rem;
}

.item {
  margin: 1.5rem 0;
  padding: 1rem;
  background: var(--code-bg);
  border-radius: 8px;
  border-left: 3px solid var(--accent-color);
}

.name {
  font-family: 'Fira Code', 'Consolas', monospace;
  margin-bottom: 0.5rem;
}

.type-signature, .signature-attributes {
  color: #777;
}

.signature-attributes {
  font-size: 0.7em;
  font-style: italic;
}

.params {
  border-collapse: collapse;
  margin: 0.5rem 0;
}

.params td, .params th {
  border: 1px solid var(--border-color);
  padding: 0.25rem 0.5rem;
  vertical-align: top;
}

pre {
  background: var(--code-bg);
  padding: 0.75rem 1rem;
  border-radius: 4px;
  overflow-x: auto;
  font-family: 'Fira Code', 'Consolas', monospace;
  font-size: 0.85rem;
}

.linenums ol {
  padding-left: 3rem;
}

.disabled {
  color: #999;
}

footer {
  position: fixed;
  bottom: 0;
  right: 0;
  padding: 0.5rem 1rem;
  font-size: 0.75rem;
  color: #666;
}

@media (max-width: 768px) {
  .sidebar {
    display: none;
  }
  .content {
    margin-left: 0;
    padding: 1rem;
  }
}
";
