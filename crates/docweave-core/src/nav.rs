//! Navigation outline
//!
//! The outline is built once per run from the normalized symbol set and is
//! read-only afterwards. Rendering it to HTML is the renderer's job.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::TemplateConfig;
use crate::context::Context;
use crate::doclet::{Access, Doclet, Kind, Scope};
use crate::members::Members;
use crate::registry::GLOBAL_LONGNAME;
use crate::tutorial::TutorialTree;

/// A navigation category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    Classes,
    Modules,
    Externals,
    Events,
    Namespaces,
    Mixins,
    Tutorials,
    Interfaces,
}

impl Section {
    pub const DEFAULT_ORDER: [Section; 8] = [
        Section::Classes,
        Section::Modules,
        Section::Externals,
        Section::Events,
        Section::Namespaces,
        Section::Mixins,
        Section::Tutorials,
        Section::Interfaces,
    ];

    pub fn heading(&self) -> &'static str {
        match self {
            Section::Classes => "Classes",
            Section::Modules => "Modules",
            Section::Externals => "Externals",
            Section::Events => "Events",
            Section::Namespaces => "Namespaces",
            Section::Mixins => "Mixins",
            Section::Tutorials => "Tutorials",
            Section::Interfaces => "Interfaces",
        }
    }
}

/// A label with an optional target; no target renders as plain text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub label: String,
    pub url: Option<String>,
}

/// One top-level entry of a category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavNode {
    pub longname: String,
    pub label: String,
    pub url: Option<String>,
    /// Deeper than the configured nav level, kept because collapse is on
    pub collapsed: bool,
    /// Static members, in discovery order
    pub members: Vec<NavLink>,
    /// Methods, in discovery order
    pub methods: Vec<NavLink>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavSection {
    pub section: Section,
    pub nodes: Vec<NavNode>,
}

/// What the outline shows for global symbols
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlobalNav {
    /// No global symbols at all
    Absent,
    /// Itemized globals
    Items(Vec<NavLink>),
    /// Globals exist but none is listed; link to the global page instead
    Page(NavLink),
}

/// An extra link at the top of the outline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuLink {
    pub label: String,
    /// HTML attributes, e.g. `href` and `target`
    pub attributes: IndexMap<String, String>,
}

/// The complete navigation outline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nav {
    pub home: NavLink,
    pub menu: Vec<MenuLink>,
    /// Non-empty categories in display order
    pub sections: Vec<NavSection>,
    pub global: GlobalNav,
    /// Member and method leaves start out hidden
    pub collapse: bool,
}

impl Nav {
    pub fn section(&self, section: Section) -> Option<&NavSection> {
        self.sections.iter().find(|s| s.section == section)
    }
}

pub struct NavBuilder<'a> {
    config: &'a TemplateConfig,
    ctx: &'a Context,
    /// parent longname -> children, in discovery order
    children: HashMap<&'a str, Vec<&'a Doclet>>,
}

impl<'a> NavBuilder<'a> {
    pub fn new(config: &'a TemplateConfig, ctx: &'a Context, doclets: &'a [Doclet]) -> Self {
        let mut children: HashMap<&str, Vec<&Doclet>> = HashMap::new();
        for doclet in doclets {
            if let Some(parent) = doclet.memberof.as_deref() {
                children.entry(parent).or_default().push(doclet);
            }
        }
        Self {
            config,
            ctx,
            children,
        }
    }

    /// Build the outline.
    ///
    /// Categories are computed in a fixed order so the shared seen-set behaves
    /// the same whatever display order is configured. Modules and tutorials
    /// each get a seen-set of their own; globals reuse the shared one.
    pub fn build(&self, members: &Members<'_>, tutorials: &TutorialTree) -> Nav {
        let mut seen: HashSet<String> = HashSet::new();
        let mut computed: HashMap<Section, Vec<NavNode>> = HashMap::new();

        computed.insert(Section::Classes, self.symbol_nodes(&members.classes, &mut seen));
        computed.insert(Section::Events, self.symbol_nodes(&members.events, &mut seen));
        computed.insert(Section::Externals, self.symbol_nodes(&members.externals, &mut seen));
        computed.insert(Section::Interfaces, self.symbol_nodes(&members.interfaces, &mut seen));
        computed.insert(Section::Mixins, self.symbol_nodes(&members.mixins, &mut seen));
        computed.insert(
            Section::Modules,
            self.symbol_nodes(&members.modules, &mut HashSet::new()),
        );
        computed.insert(Section::Namespaces, self.symbol_nodes(&members.namespaces, &mut seen));
        computed.insert(Section::Tutorials, self.tutorial_nodes(tutorials));

        let sections: Vec<NavSection> = self
            .config
            .section_order
            .iter()
            .filter_map(|section| {
                let nodes = computed.remove(section)?;
                (!nodes.is_empty()).then_some(NavSection {
                    section: *section,
                    nodes,
                })
            })
            .collect();

        let global = self.global_nav(&members.globals, &mut seen);

        let menu = self
            .config
            .menu
            .iter()
            .map(|(label, attributes)| MenuLink {
                label: label.clone(),
                attributes: attributes.clone(),
            })
            .collect();

        tracing::debug!(sections = sections.len(), "navigation built");

        Nav {
            home: NavLink {
                label: String::from("Home"),
                url: Some(self.ctx.index_page.clone()),
            },
            menu,
            sections,
            global,
            collapse: self.config.collapse,
        }
    }

    fn is_hidden(&self, doclet: &Doclet) -> bool {
        self.config.hide_private && doclet.access == Some(Access::Private)
    }

    fn symbol_nodes(&self, items: &[&Doclet], seen: &mut HashSet<String>) -> Vec<NavNode> {
        let mut nodes = Vec::new();
        for item in items {
            if self.is_hidden(item) {
                continue;
            }
            let too_deep = self
                .config
                .nav_level
                .is_some_and(|level| item.ancestors.len() > level);
            if too_deep && !self.config.collapse {
                continue;
            }
            if !seen.insert(item.longname.clone()) {
                continue;
            }

            nodes.push(NavNode {
                longname: item.longname.clone(),
                label: self.label(item),
                url: self.ctx.registry.url_for(&item.longname).map(str::to_string),
                collapsed: too_deep,
                members: self.static_members(item),
                methods: self.methods(item),
            });
        }
        nodes
    }

    fn static_members(&self, parent: &Doclet) -> Vec<NavLink> {
        if !self.config.static_members {
            return Vec::new();
        }
        self.leaves(parent, |child| {
            child.kind == Kind::Member && child.scope == Some(Scope::Static)
        })
    }

    fn methods(&self, parent: &Doclet) -> Vec<NavLink> {
        self.leaves(parent, |child| child.kind == Kind::Function)
    }

    fn leaves(&self, parent: &Doclet, keep: impl Fn(&Doclet) -> bool) -> Vec<NavLink> {
        let Some(children) = self.children.get(parent.longname.as_str()) else {
            return Vec::new();
        };
        children
            .iter()
            .filter(|&&child| keep(child) && !self.is_hidden(child))
            .map(|child| self.link(child))
            .collect()
    }

    fn tutorial_nodes(&self, tutorials: &TutorialTree) -> Vec<NavNode> {
        let mut seen = HashSet::new();
        tutorials
            .children
            .iter()
            .filter(|tutorial| seen.insert(tutorial.name.as_str()))
            .map(|tutorial| NavNode {
                longname: tutorial.name.clone(),
                label: tutorial.title.clone(),
                url: self
                    .ctx
                    .registry
                    .tutorial(&tutorial.name)
                    .map(|link| link.url.clone()),
                collapsed: false,
                members: Vec::new(),
                methods: Vec::new(),
            })
            .collect()
    }

    fn global_nav(&self, globals: &[&Doclet], seen: &mut HashSet<String>) -> GlobalNav {
        if globals.is_empty() {
            return GlobalNav::Absent;
        }

        let mut items = Vec::new();
        for global in globals {
            if global.kind == Kind::Typedef && !self.config.typedefs {
                continue;
            }
            if self.is_hidden(global) || !seen.insert(global.longname.clone()) {
                continue;
            }
            items.push(self.link(global));
        }

        if items.is_empty() {
            GlobalNav::Page(NavLink {
                label: String::from("Global"),
                url: self.ctx.registry.url_for(GLOBAL_LONGNAME).map(str::to_string),
            })
        } else {
            GlobalNav::Items(items)
        }
    }

    fn link(&self, doclet: &Doclet) -> NavLink {
        NavLink {
            label: self.label(doclet),
            url: self.ctx.registry.url_for(&doclet.longname).map(str::to_string),
        }
    }

    fn label(&self, doclet: &Doclet) -> String {
        let raw = if self.config.use_longname_in_nav {
            &doclet.longname
        } else {
            &doclet.name
        };
        namespace_prefix_re().replace_all(raw, "").into_owned()
    }
}

fn namespace_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(module|event):").expect("prefix pattern is valid"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::Normalizer;
    use crate::tutorial::Tutorial;

    fn build(doclets: &mut Vec<Doclet>, config: &TemplateConfig) -> Nav {
        build_with_tutorials(doclets, config, &TutorialTree::default())
    }

    fn build_with_tutorials(
        doclets: &mut Vec<Doclet>,
        config: &TemplateConfig,
        tutorials: &TutorialTree,
    ) -> Nav {
        let mut ctx = Context::new();
        let normalizer = Normalizer::new(config);
        normalizer.normalize(doclets, &mut ctx);
        normalizer.finish(doclets, &mut ctx);
        for tutorial in tutorials.depth_first() {
            ctx.registry.register_tutorial(&tutorial.name, &tutorial.title);
        }
        let members = Members::partition(doclets);
        NavBuilder::new(config, &ctx, doclets).build(&members, tutorials)
    }

    fn labels(section: &NavSection) -> Vec<&str> {
        section.nodes.iter().map(|n| n.label.as_str()).collect()
    }

    fn nested_namespaces() -> Vec<Doclet> {
        vec![
            Doclet::new(Kind::Namespace, "a", "a"),
            Doclet::new(Kind::Namespace, "b", "a.b")
                .with_memberof("a")
                .with_scope(Scope::Static),
            Doclet::new(Kind::Namespace, "c", "a.b.c")
                .with_memberof("a.b")
                .with_scope(Scope::Static),
        ]
    }

    #[test]
    fn test_sections_follow_configured_order() {
        let mut doclets = vec![
            Doclet::new(Kind::Class, "Widget", "Widget"),
            Doclet::new(Kind::Module, "io", "module:io"),
        ];
        let config = TemplateConfig {
            section_order: vec![Section::Modules, Section::Classes],
            ..TemplateConfig::default()
        };
        let nav = build(&mut doclets, &config);

        let order: Vec<Section> = nav.sections.iter().map(|s| s.section).collect();
        assert_eq!(order, vec![Section::Modules, Section::Classes]);
        assert_eq!(labels(&nav.sections[0]), vec!["io"]);
        assert_eq!(nav.sections[0].nodes[0].url.as_deref(), Some("module-io.html"));
    }

    #[test]
    fn test_empty_sections_are_omitted() {
        let mut doclets = vec![Doclet::new(Kind::Class, "Widget", "Widget")];
        let nav = build(&mut doclets, &TemplateConfig::default());
        assert_eq!(nav.sections.len(), 1);
        assert!(nav.section(Section::Mixins).is_none());
        assert_eq!(nav.global, GlobalNav::Absent);
    }

    #[test]
    fn test_hide_private() {
        let mut doclets = vec![
            Doclet::new(Kind::Class, "Secret", "Secret").with_access(Access::Private),
            Doclet::new(Kind::Class, "Open", "Open"),
        ];
        let config = TemplateConfig {
            hide_private: true,
            ..TemplateConfig::default()
        };
        let nav = build(&mut doclets, &config);
        let classes = nav.section(Section::Classes).unwrap();
        assert_eq!(labels(classes), vec!["Open"]);
    }

    #[test]
    fn test_nav_level_excludes_deep_nodes() {
        let mut doclets = nested_namespaces();
        let config = TemplateConfig {
            nav_level: Some(1),
            ..TemplateConfig::default()
        };
        let nav = build(&mut doclets, &config);

        let namespaces = nav.section(Section::Namespaces).unwrap();
        assert_eq!(labels(namespaces), vec!["a", "b"]);
        for node in &namespaces.nodes {
            let doclet = doclets.iter().find(|d| d.longname == node.longname).unwrap();
            assert!(doclet.ancestors.len() <= 1);
        }
    }

    #[test]
    fn test_collapse_keeps_deep_nodes_flagged() {
        let mut doclets = nested_namespaces();
        let config = TemplateConfig {
            nav_level: Some(1),
            collapse: true,
            ..TemplateConfig::default()
        };
        let nav = build(&mut doclets, &config);

        let namespaces = nav.section(Section::Namespaces).unwrap();
        let flags: Vec<(&str, bool)> = namespaces
            .nodes
            .iter()
            .map(|n| (n.label.as_str(), n.collapsed))
            .collect();
        assert_eq!(flags, vec![("a", false), ("b", false), ("c", true)]);
        assert!(nav.collapse);
    }

    #[test]
    fn test_duplicate_longnames_listed_once() {
        let mut doclets = vec![
            Doclet::new(Kind::Class, "Widget", "Widget"),
            Doclet::new(Kind::Class, "Widget", "Widget"),
        ];
        let nav = build(&mut doclets, &TemplateConfig::default());
        assert_eq!(nav.section(Section::Classes).unwrap().nodes.len(), 1);
    }

    #[test]
    fn test_same_name_siblings_are_separate_entries() {
        let mut doclets = vec![
            Doclet::new(Kind::Namespace, "geo", "geo"),
            Doclet::new(Kind::Class, "Shape", "geo.Shape")
                .with_memberof("geo")
                .with_scope(Scope::Static),
            Doclet::new(Kind::Class, "Shape", "geo~Shape")
                .with_memberof("geo")
                .with_scope(Scope::Inner),
        ];
        let nav = build(&mut doclets, &TemplateConfig::default());

        let classes = nav.section(Section::Classes).unwrap();
        assert_eq!(labels(classes), vec!["Shape", "Shape"]);
        assert_ne!(classes.nodes[0].url, classes.nodes[1].url);
    }

    #[test]
    fn test_modules_have_independent_seen_set() {
        // A namespace and a module sharing a longname both show up
        let mut doclets = vec![
            Doclet::new(Kind::Namespace, "io", "module:io"),
            Doclet::new(Kind::Module, "io", "module:io"),
        ];
        let nav = build(&mut doclets, &TemplateConfig::default());
        assert!(nav.section(Section::Namespaces).is_some());
        assert!(nav.section(Section::Modules).is_some());
    }

    #[test]
    fn test_shared_seen_set_across_categories() {
        let mut doclets = vec![
            Doclet::new(Kind::Class, "Thing", "Thing"),
            Doclet::new(Kind::Namespace, "Thing", "Thing"),
        ];
        let nav = build(&mut doclets, &TemplateConfig::default());
        assert!(nav.section(Section::Classes).is_some());
        assert!(nav.section(Section::Namespaces).is_none());
    }

    #[test]
    fn test_static_members_use_scope_equality() {
        let mut doclets = vec![
            Doclet::new(Kind::Class, "Box", "Box"),
            Doclet::new(Kind::Member, "count", "Box.count")
                .with_memberof("Box")
                .with_scope(Scope::Static),
            Doclet::new(Kind::Member, "size", "Box#size")
                .with_memberof("Box")
                .with_scope(Scope::Instance),
            Doclet::new(Kind::Function, "open", "Box#open")
                .with_memberof("Box")
                .with_scope(Scope::Instance),
            Doclet::new(Kind::Function, "make", "Box.make")
                .with_memberof("Box")
                .with_scope(Scope::Static),
        ];
        let config = TemplateConfig {
            static_members: true,
            ..TemplateConfig::default()
        };
        let nav = build(&mut doclets, &config);
        let node = &nav.section(Section::Classes).unwrap().nodes[0];

        // Only the static-scope member is listed; the instance member is not
        let members: Vec<&str> = node.members.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(members, vec!["count"]);
        let methods: Vec<&str> = node.methods.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(methods, vec!["open", "make"]);
        assert_eq!(node.methods[1].url.as_deref(), Some("Box.html#.make"));
    }

    #[test]
    fn test_static_members_off_by_default() {
        let mut doclets = vec![
            Doclet::new(Kind::Class, "Box", "Box"),
            Doclet::new(Kind::Member, "count", "Box.count")
                .with_memberof("Box")
                .with_scope(Scope::Static),
        ];
        let nav = build(&mut doclets, &TemplateConfig::default());
        assert!(nav.section(Section::Classes).unwrap().nodes[0].members.is_empty());
    }

    #[test]
    fn test_globals_items_and_typedefs() {
        let mut doclets = vec![
            Doclet::new(Kind::Function, "main", "main").with_scope(Scope::Global),
            Doclet::new(Kind::Typedef, "Opts", "Opts").with_scope(Scope::Global),
        ];
        let nav = build(&mut doclets.clone(), &TemplateConfig::default());
        match &nav.global {
            GlobalNav::Items(items) => {
                let names: Vec<&str> = items.iter().map(|l| l.label.as_str()).collect();
                assert_eq!(names, vec!["main"]);
            }
            other => panic!("expected items, got {:?}", other),
        }

        let config = TemplateConfig {
            typedefs: true,
            ..TemplateConfig::default()
        };
        let nav = build(&mut doclets, &config);
        assert!(matches!(&nav.global, GlobalNav::Items(items) if items.len() == 2));
    }

    #[test]
    fn test_only_typedef_globals_link_to_global_page() {
        let mut doclets = vec![Doclet::new(Kind::Typedef, "Opts", "Opts")];
        let nav = build(&mut doclets, &TemplateConfig::default());
        assert_eq!(
            nav.global,
            GlobalNav::Page(NavLink {
                label: "Global".to_string(),
                url: Some("global.html".to_string()),
            })
        );
    }

    #[test]
    fn test_tutorials_use_tutorial_links() {
        let tutorials = TutorialTree::new(vec![
            Tutorial::new("intro", "Introduction").with_children(vec![Tutorial::new("deep", "Deep")]),
            Tutorial::new("faq", "FAQ"),
        ]);
        let mut doclets = Vec::new();
        let nav = build_with_tutorials(&mut doclets, &TemplateConfig::default(), &tutorials);

        let section = nav.section(Section::Tutorials).unwrap();
        assert_eq!(labels(section), vec!["Introduction", "FAQ"]);
        assert_eq!(section.nodes[0].url.as_deref(), Some("tutorial-intro.html"));
    }

    #[test]
    fn test_labels_drop_namespace_prefix() {
        let mut doclets = vec![Doclet::new(Kind::Event, "save", "Doc#event:save")
            .with_memberof("Doc")
            .with_scope(Scope::Instance)];
        let config = TemplateConfig {
            use_longname_in_nav: true,
            ..TemplateConfig::default()
        };
        let nav = build(&mut doclets, &config);
        assert_eq!(labels(nav.section(Section::Events).unwrap()), vec!["Doc#save"]);
    }

    #[test]
    fn test_menu_links() {
        let mut attributes = IndexMap::new();
        attributes.insert("href".to_string(), "https://example.com".to_string());
        let mut config = TemplateConfig::default();
        config.menu.insert("Repo".to_string(), attributes);

        let nav = build(&mut Vec::new(), &config);
        assert_eq!(nav.menu[0].label, "Repo");
        assert_eq!(nav.home.url.as_deref(), Some("index.html"));
    }
}
