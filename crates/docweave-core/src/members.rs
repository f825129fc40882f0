//! Symbol partitioning by kind

use crate::doclet::{Doclet, Kind};

/// Borrowed view of the symbol set split into the categories the navigation
/// and the page emitter work with. Each list keeps input order.
#[derive(Debug, Default)]
pub struct Members<'a> {
    pub classes: Vec<&'a Doclet>,
    pub externals: Vec<&'a Doclet>,
    pub events: Vec<&'a Doclet>,
    pub globals: Vec<&'a Doclet>,
    pub mixins: Vec<&'a Doclet>,
    pub modules: Vec<&'a Doclet>,
    pub namespaces: Vec<&'a Doclet>,
    pub interfaces: Vec<&'a Doclet>,
}

impl<'a> Members<'a> {
    pub fn partition(doclets: &'a [Doclet]) -> Self {
        let mut members = Members::default();
        for doclet in doclets {
            match doclet.kind {
                Kind::Class => members.classes.push(doclet),
                Kind::External => members.externals.push(doclet),
                Kind::Event => members.events.push(doclet),
                Kind::Mixin => members.mixins.push(doclet),
                Kind::Module => members.modules.push(doclet),
                Kind::Namespace => members.namespaces.push(doclet),
                Kind::Interface => members.interfaces.push(doclet),
                _ => {}
            }
            if is_global(doclet) {
                members.globals.push(doclet);
            }
        }
        members
    }
}

/// Global functions, members, constants and typedefs; `module.exports`
/// stand-ins belong to their module instead.
fn is_global(doclet: &Doclet) -> bool {
    matches!(
        doclet.kind,
        Kind::Member | Kind::Function | Kind::Constant | Kind::Typedef
    ) && doclet.is_global()
        && !doclet.is_module_exports()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition() {
        let doclets = vec![
            Doclet::new(Kind::Class, "A", "A"),
            Doclet::new(Kind::Function, "main", "main"),
            Doclet::new(Kind::Function, "go", "A#go").with_memberof("A"),
            Doclet::new(Kind::Typedef, "Opts", "Opts"),
            Doclet::new(Kind::Module, "io", "module:io"),
            Doclet::new(Kind::Function, "module:io", "module:io"),
            Doclet::new(Kind::Event, "done", "A#event:done").with_memberof("A"),
        ];
        let members = Members::partition(&doclets);

        assert_eq!(members.classes.len(), 1);
        assert_eq!(members.modules.len(), 1);
        assert_eq!(members.events.len(), 1);
        let globals: Vec<_> = members.globals.iter().map(|d| d.longname.as_str()).collect();
        assert_eq!(globals, vec!["main", "Opts"]);
    }
}
