//! Types for representing extracted symbol records

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::markup::Markup;

/// Kind of documented symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Function,
    Class,
    Member,
    Constant,
    Namespace,
    Mixin,
    Module,
    External,
    Interface,
    Typedef,
    Event,
    File,
    Package,
    Tutorial,
}

impl Kind {
    /// Every kind, in declaration order
    pub const ALL: [Kind; 14] = [
        Kind::Function,
        Kind::Class,
        Kind::Member,
        Kind::Constant,
        Kind::Namespace,
        Kind::Mixin,
        Kind::Module,
        Kind::External,
        Kind::Interface,
        Kind::Typedef,
        Kind::Event,
        Kind::File,
        Kind::Package,
        Kind::Tutorial,
    ];

    /// The name used by the extractor for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Function => "function",
            Kind::Class => "class",
            Kind::Member => "member",
            Kind::Constant => "constant",
            Kind::Namespace => "namespace",
            Kind::Mixin => "mixin",
            Kind::Module => "module",
            Kind::External => "external",
            Kind::Interface => "interface",
            Kind::Typedef => "typedef",
            Kind::Event => "event",
            Kind::File => "file",
            Kind::Package => "package",
            Kind::Tutorial => "tutorial",
        }
    }

    /// Kinds that get a page of their own
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Kind::Class
                | Kind::Module
                | Kind::External
                | Kind::Namespace
                | Kind::Mixin
                | Kind::Interface
        )
    }

    pub fn from_name(name: &str) -> Option<Kind> {
        Kind::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a symbol hangs off its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Static,
    Instance,
    Inner,
    Global,
}

impl Scope {
    /// Separator written between a parent name and a child in this scope
    pub fn punctuation(&self) -> &'static str {
        match self {
            Scope::Static => ".",
            Scope::Instance => "#",
            Scope::Inner => "~",
            Scope::Global => "",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Static => "static",
            Scope::Instance => "instance",
            Scope::Inner => "inner",
            Scope::Global => "global",
        }
    }
}

/// Declared access level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Public,
    Private,
    Protected,
    Package,
}

impl Access {
    pub fn as_str(&self) -> &'static str {
        match self {
            Access::Public => "public",
            Access::Private => "private",
            Access::Protected => "protected",
            Access::Package => "package",
        }
    }
}

/// A set of declared type names, e.g. `{string|number}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeExpr {
    #[serde(default)]
    pub names: Vec<String>,
}

impl TypeExpr {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

/// A typed parameter, return or yield descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub type_expr: Option<TypeExpr>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub nullable: Option<bool>,
    /// Rest/variadic parameter
    #[serde(default)]
    pub variable: bool,
}

impl Param {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn typed<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            type_expr: Some(TypeExpr::new(names)),
            ..Self::default()
        }
    }

    /// Flags shown next to a parameter name inside a call signature
    pub fn signature_attributes(&self) -> Vec<&'static str> {
        let mut attributes = Vec::new();
        if self.optional {
            attributes.push("opt");
        }
        attributes.extend(nullable_attribute(self.nullable));
        attributes
    }

    /// Flags shown in front of a return/yield type
    pub fn attributes(&self) -> Vec<&'static str> {
        nullable_attribute(self.nullable).into_iter().collect()
    }

    /// Sub-property entries such as `options.timeout`
    pub fn is_sub_property(&self) -> bool {
        self.name.as_deref().is_some_and(|name| name.contains('.'))
    }
}

fn nullable_attribute(nullable: Option<bool>) -> Option<&'static str> {
    match nullable {
        Some(true) => Some("nullable"),
        Some(false) => Some("non-null"),
        None => None,
    }
}

/// Source location of a symbol
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Meta {
    pub path: Option<String>,
    pub filename: String,
    pub lineno: Option<u32>,
    /// Runtime kind reported by the extractor, e.g. `FunctionExpression`
    pub code_type: Option<String>,
    /// Source path with the common prefix of all sources removed
    pub shortpath: Option<String>,
}

impl Meta {
    /// The full path of the source file, joining directory and file name
    pub fn source_path(&self) -> String {
        match self.path.as_deref() {
            Some(dir) if !dir.is_empty() && dir != "null" => {
                let separator = if dir.ends_with('/') || dir.ends_with('\\') {
                    ""
                } else {
                    "/"
                };
                format!("{}{}{}", dir, separator, self.filename)
            }
            _ => self.filename.clone(),
        }
    }
}

/// A usage example split into caption and code
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Example {
    pub caption: String,
    pub code: String,
}

/// A "see also" reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeeAlso {
    /// An in-page anchor already resolved against the owning symbol's page
    Anchor { href: String, text: String },
    /// Any other reference, resolved against the registry at render time
    Reference(String),
}

/// A documented symbol
#[derive(Debug, Clone)]
pub struct Doclet {
    pub kind: Kind,
    pub name: String,
    /// Globally unique qualified name
    pub longname: String,
    /// Longname of the parent symbol
    pub memberof: Option<String>,
    pub scope: Option<Scope>,
    pub access: Option<Access>,
    pub description: Option<String>,
    pub params: Vec<Param>,
    pub returns: Vec<Param>,
    pub yields: Vec<Param>,
    pub type_expr: Option<TypeExpr>,
    pub meta: Option<Meta>,
    pub examples: Vec<Example>,
    pub see: Vec<SeeAlso>,
    pub version: Option<String>,
    pub since: Option<String>,
    pub hideconstructor: bool,
    pub readonly: bool,
    pub is_async: bool,
    pub generator: bool,
    pub is_virtual: bool,
    pub nullable: Option<bool>,
    pub undocumented: bool,
    pub ignore: bool,
    pub fires: Vec<String>,
    pub listens: Vec<String>,
    /// Longnames of symbols listening to this event
    pub listeners: Vec<String>,

    /// Anchor id within the owning page
    pub id: String,
    /// Precomposed display signature
    pub signature: Option<Markup>,
    /// Badges such as `static` or `readonly`
    pub attribs: Vec<&'static str>,
    /// Links to every ancestor, root first
    pub ancestors: Vec<Markup>,
    /// Symbols sharing a module's longname, attached to the module record
    pub module_symbols: Vec<Doclet>,
}

impl Doclet {
    /// Create a new doclet with every optional field empty
    pub fn new(kind: Kind, name: impl Into<String>, longname: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            longname: longname.into(),
            memberof: None,
            scope: None,
            access: None,
            description: None,
            params: Vec::new(),
            returns: Vec::new(),
            yields: Vec::new(),
            type_expr: None,
            meta: None,
            examples: Vec::new(),
            see: Vec::new(),
            version: None,
            since: None,
            hideconstructor: false,
            readonly: false,
            is_async: false,
            generator: false,
            is_virtual: false,
            nullable: None,
            undocumented: false,
            ignore: false,
            fires: Vec::new(),
            listens: Vec::new(),
            listeners: Vec::new(),
            id: String::new(),
            signature: None,
            attribs: Vec::new(),
            ancestors: Vec::new(),
            module_symbols: Vec::new(),
        }
    }

    pub fn with_memberof(mut self, memberof: impl Into<String>) -> Self {
        self.memberof = Some(memberof.into());
        self
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = Some(access);
        self
    }

    pub fn with_params(mut self, params: Vec<Param>) -> Self {
        self.params = params;
        self
    }

    pub fn with_returns(mut self, returns: Vec<Param>) -> Self {
        self.returns = returns;
        self
    }

    pub fn with_type<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.type_expr = Some(TypeExpr::new(names));
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_meta(mut self, path: Option<&str>, filename: &str) -> Self {
        self.meta = Some(Meta {
            path: path.map(str::to_string),
            filename: filename.to_string(),
            ..Meta::default()
        });
        self
    }

    /// No parent, so the symbol lives on the global page
    pub fn is_global(&self) -> bool {
        self.memberof.is_none()
    }

    /// A non-module symbol standing in for `module.exports`
    pub fn is_module_exports(&self) -> bool {
        self.kind != Kind::Module
            && self.longname == self.name
            && self.longname.starts_with("module:")
    }

    /// The return descriptors shown in the signature; yields take precedence
    pub fn return_like(&self) -> &[Param] {
        if self.yields.is_empty() {
            &self.returns
        } else {
            &self.yields
        }
    }

    /// Badges describing this symbol
    pub fn attributes(&self) -> Vec<&'static str> {
        let mut attribs = Vec::new();

        if self.is_async {
            attribs.push("async");
        }
        if self.generator {
            attribs.push("generator");
        }
        if self.is_virtual {
            attribs.push("abstract");
        }
        if let Some(access) = self.access {
            if access != Access::Public {
                attribs.push(access.as_str());
            }
        }
        if let Some(scope @ (Scope::Static | Scope::Inner)) = self.scope {
            if matches!(self.kind, Kind::Function | Kind::Member | Kind::Constant) {
                attribs.push(scope.as_str());
            }
        }
        if self.readonly && self.kind == Kind::Member {
            attribs.push("readonly");
        }
        if self.kind == Kind::Constant {
            attribs.push("constant");
        }
        attribs.extend(nullable_attribute(self.nullable));

        attribs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_round_trip() {
        for kind in Kind::ALL {
            assert_eq!(Kind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(Kind::from_name("widget"), None);
    }

    #[test]
    fn test_param_signature_attributes() {
        let mut param = Param::named("x");
        param.optional = true;
        param.nullable = Some(true);
        assert_eq!(param.signature_attributes(), vec!["opt", "nullable"]);

        param.optional = false;
        param.nullable = Some(false);
        assert_eq!(param.signature_attributes(), vec!["non-null"]);
        assert_eq!(param.attributes(), vec!["non-null"]);
    }

    #[test]
    fn test_attributes_for_static_constant() {
        let doclet = Doclet::new(Kind::Constant, "MAX", "Limits.MAX")
            .with_memberof("Limits")
            .with_scope(Scope::Static)
            .with_access(Access::Protected);
        assert_eq!(doclet.attributes(), vec!["protected", "static", "constant"]);
    }

    #[test]
    fn test_instance_scope_is_not_a_badge() {
        let mut doclet = Doclet::new(Kind::Member, "size", "Box#size").with_scope(Scope::Instance);
        doclet.readonly = true;
        assert_eq!(doclet.attributes(), vec!["readonly"]);
    }

    #[test]
    fn test_module_exports_detection() {
        let exports = Doclet::new(Kind::Function, "module:parser", "module:parser");
        assert!(exports.is_module_exports());

        let module = Doclet::new(Kind::Module, "module:parser", "module:parser");
        assert!(!module.is_module_exports());
    }

    #[test]
    fn test_meta_source_path() {
        let meta = Meta {
            path: Some("/src/lib".to_string()),
            filename: "util.js".to_string(),
            ..Meta::default()
        };
        assert_eq!(meta.source_path(), "/src/lib/util.js");

        let bare = Meta {
            path: Some("null".to_string()),
            filename: "util.js".to_string(),
            ..Meta::default()
        };
        assert_eq!(bare.source_path(), "util.js");
    }
}
