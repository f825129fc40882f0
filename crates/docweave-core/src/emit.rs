//! Page grouping
//!
//! [`PageEmitter::plan`] decides which pages exist, what each one documents
//! and where it is written. Nothing here renders or touches the output
//! directory.

use std::collections::{HashMap, HashSet};
use std::io;

use crate::config::TemplateConfig;
use crate::context::Context;
use crate::doclet::{Doclet, Kind};
use crate::members::Members;
use crate::registry::LinkRegistry;
use crate::tutorial::{Tutorial, TutorialTree};

/// Layout used to render a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Container,
    Tutorial,
}

impl Template {
    pub fn as_str(&self) -> &'static str {
        match self {
            Template::Container => "container",
            Template::Tutorial => "tutorial",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Home,
    Global,
    Module,
    Class,
    Namespace,
    Mixin,
    External,
    Interface,
    Source,
    Tutorial,
}

impl PageKind {
    /// Prefix used in page titles
    pub fn label(&self) -> &'static str {
        match self {
            PageKind::Home => "Home",
            PageKind::Global => "Global",
            PageKind::Module => "Module",
            PageKind::Class => "Class",
            PageKind::Namespace => "Namespace",
            PageKind::Mixin => "Mixin",
            PageKind::External => "External",
            PageKind::Interface => "Interface",
            PageKind::Source => "Source",
            PageKind::Tutorial => "Tutorial",
        }
    }
}

/// One record handed to the renderer
#[derive(Debug, Clone)]
pub enum PageDoc<'a> {
    Symbol(&'a Doclet),
    /// Synthetic record carrying the README on the home page
    MainPage {
        title: String,
        readme: Option<String>,
    },
    /// Placeholder standing for every global symbol
    GlobalObject,
    Source {
        path: String,
        code: String,
    },
    Tutorial(&'a Tutorial),
}

/// A page descriptor
#[derive(Debug, Clone)]
pub struct Page<'a> {
    pub kind: PageKind,
    pub template: Template,
    pub title: String,
    pub docs: Vec<PageDoc<'a>>,
    /// Registry-assigned file name, relative to the output root
    pub filename: String,
    /// Rewrite link placeholders after rendering
    pub resolve_links: bool,
}

impl<'a> Page<'a> {
    fn container(kind: PageKind, title: String, docs: Vec<PageDoc<'a>>, filename: String) -> Self {
        Self {
            kind,
            template: Template::Container,
            title,
            docs,
            filename,
            resolve_links: true,
        }
    }
}

/// Give every tutorial a page in the registry's tutorial namespace
pub fn register_tutorials(tutorials: &TutorialTree, registry: &mut LinkRegistry) {
    for tutorial in tutorials.depth_first() {
        registry.register_tutorial(&tutorial.name, &tutorial.title);
    }
}

pub struct PageEmitter<'a> {
    doclets: &'a [Doclet],
    members: &'a Members<'a>,
    ctx: &'a Context,
    config: &'a TemplateConfig,
    tutorials: &'a TutorialTree,
    readme: Option<&'a str>,
}

impl<'a> PageEmitter<'a> {
    pub fn new(
        doclets: &'a [Doclet],
        members: &'a Members<'a>,
        ctx: &'a Context,
        config: &'a TemplateConfig,
        tutorials: &'a TutorialTree,
        readme: Option<&'a str>,
    ) -> Self {
        Self {
            doclets,
            members,
            ctx,
            config,
            tutorials,
            readme,
        }
    }

    /// Every page of the site, in emission order: source listings, the
    /// global page, the home page, one page per container longname in
    /// registration order, then tutorials depth-first.
    ///
    /// `read_source` loads a source file; a file that cannot be read is
    /// logged and its page left out.
    pub fn plan<F>(&self, read_source: F) -> Vec<Page<'a>>
    where
        F: FnMut(&str) -> io::Result<String>,
    {
        let mut pages = Vec::new();
        if self.config.output_source_files {
            pages.extend(self.source_pages(read_source));
        }
        if !self.members.globals.is_empty() {
            pages.push(Page::container(
                PageKind::Global,
                String::from("Global"),
                vec![PageDoc::GlobalObject],
                self.ctx.global_page.clone(),
            ));
        }
        pages.push(self.home_page());
        pages.extend(self.container_pages());
        pages.extend(self.tutorial_pages());
        pages
    }

    fn source_pages<F>(&self, mut read_source: F) -> Vec<Page<'a>>
    where
        F: FnMut(&str) -> io::Result<String>,
    {
        let mut pages = Vec::new();
        for file in self.ctx.sources.iter() {
            let Some(filename) = file.page.clone() else {
                continue;
            };
            let shortened = file.shortened.clone().unwrap_or_else(|| file.resolved.clone());
            match read_source(&file.resolved) {
                Ok(code) => pages.push(Page {
                    kind: PageKind::Source,
                    template: Template::Container,
                    title: format!("Source: {}", shortened),
                    docs: vec![PageDoc::Source {
                        path: shortened,
                        code,
                    }],
                    filename,
                    resolve_links: false,
                }),
                Err(error) => {
                    tracing::error!(path = %file.resolved, %error, "cannot read source file, skipping its page");
                }
            }
        }
        pages
    }

    fn home_page(&self) -> Page<'a> {
        let mut docs: Vec<PageDoc<'a>> = self
            .doclets
            .iter()
            .filter(|d| d.kind == Kind::Package)
            .map(PageDoc::Symbol)
            .collect();
        docs.push(PageDoc::MainPage {
            title: self.config.main_page_title.clone(),
            readme: self.readme.map(str::to_string),
        });
        docs.extend(
            self.doclets
                .iter()
                .filter(|d| d.kind == Kind::File)
                .map(PageDoc::Symbol),
        );
        Page::container(PageKind::Home, String::from("Home"), docs, self.ctx.index_page.clone())
    }

    fn container_pages(&self) -> Vec<Page<'a>> {
        let groups = [
            (PageKind::Module, &self.members.modules),
            (PageKind::Class, &self.members.classes),
            (PageKind::Namespace, &self.members.namespaces),
            (PageKind::Mixin, &self.members.mixins),
            (PageKind::External, &self.members.externals),
            (PageKind::Interface, &self.members.interfaces),
        ];
        let indexed: Vec<(PageKind, HashMap<&str, Vec<&'a Doclet>>)> = groups
            .into_iter()
            .map(|(kind, doclets)| {
                let mut by_longname: HashMap<&str, Vec<&'a Doclet>> = HashMap::new();
                for &doclet in doclets.iter() {
                    by_longname
                        .entry(doclet.longname.as_str())
                        .or_default()
                        .push(doclet);
                }
                (kind, by_longname)
            })
            .collect();

        let mut pages = Vec::new();
        let mut planned: HashSet<String> = HashSet::new();
        for longname in self.ctx.registry.longnames() {
            for (kind, by_longname) in &indexed {
                let Some(docs) = by_longname.get(longname) else {
                    continue;
                };
                let Some(url) = self.ctx.registry.url_for(longname) else {
                    continue;
                };
                let filename = url.split('#').next().unwrap_or(url).to_string();
                if !planned.insert(filename.clone()) {
                    tracing::debug!(longname, kind = kind.label(), %filename, "page already planned for this file");
                    continue;
                }

                let title = format!("{}: {}", kind.label(), docs[0].name);
                let docs = docs.iter().map(|&d| PageDoc::Symbol(d)).collect();
                pages.push(Page::container(*kind, title, docs, filename));
            }
        }
        pages
    }

    fn tutorial_pages(&self) -> Vec<Page<'a>> {
        let mut pages = Vec::new();
        for tutorial in self.tutorials.depth_first() {
            let Some(link) = self.ctx.registry.tutorial(&tutorial.name) else {
                tracing::warn!(tutorial = %tutorial.name, "tutorial has no registered page");
                continue;
            };
            pages.push(Page {
                kind: PageKind::Tutorial,
                template: Template::Tutorial,
                title: format!("Tutorial: {}", tutorial.title),
                docs: vec![PageDoc::Tutorial(tutorial)],
                filename: link.url.clone(),
                resolve_links: true,
            });
        }
        pages
    }
}
