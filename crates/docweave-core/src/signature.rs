//! Signature synthesis
//!
//! Every signature is built as [`Markup`] so tests and renderers can inspect
//! it before it is flattened to HTML.

use crate::doclet::{Doclet, Kind, Param};
use crate::markup::Markup;
use crate::normalize::{needs_signature, reclassify};
use crate::registry::LinkRegistry;

/// Compute `signature` and `attribs` for every doclet, then fold constants
/// into members.
pub fn synthesize(doclets: &mut [Doclet], registry: &LinkRegistry) {
    for doclet in doclets.iter_mut() {
        synthesize_one(doclet, registry);
        if !doclet.module_symbols.is_empty() {
            synthesize(&mut doclet.module_symbols, registry);
        }
    }
}

fn synthesize_one(doclet: &mut Doclet, registry: &LinkRegistry) {
    if needs_signature(doclet) {
        doclet.signature = Some(function_signature(doclet, registry));
        doclet.attribs = doclet.attributes();
    }
    if matches!(doclet.kind, Kind::Member | Kind::Constant) {
        doclet.signature = Some(type_signature(doclet, registry));
        doclet.attribs = doclet.attributes();
        reclassify(doclet);
    }
}

/// `name(params)` followed by the return annotation, if any
pub fn function_signature(doclet: &Doclet, registry: &LinkRegistry) -> Markup {
    let mut signature = Markup::text(doclet.name.as_str());
    signature.push_text("(");
    signature.append(params_markup(&doclet.params));
    signature.push_text(")");

    let returns = returns_markup(doclet.return_like(), registry);
    if !returns.is_empty() {
        signature.push_span("type-signature", returns);
    }
    signature
}

/// `name :type1|type2` for members and constants
pub fn type_signature(doclet: &Doclet, registry: &LinkRegistry) -> Markup {
    let mut signature = Markup::text(doclet.name.as_str());
    let names = doclet
        .type_expr
        .as_ref()
        .map(|t| t.names.as_slice())
        .unwrap_or_default();
    if !names.is_empty() {
        let mut types = Markup::text(" :");
        types.append(types_markup(names, registry));
        signature.push_span("type-signature", types);
    }
    signature
}

/// Comma-separated parameter names, skipping dotted sub-properties
pub fn params_markup(params: &[Param]) -> Markup {
    let items = params
        .iter()
        .filter(|p| !p.is_sub_property())
        .map(|param| {
            let mut item = Markup::new();
            if param.variable {
                item.push_entity("hellip");
            }
            item.push_text(param.name.as_deref().unwrap_or_default());

            let attributes = param.signature_attributes();
            if !attributes.is_empty() {
                item.push_span("signature-attributes", Markup::text(attributes.join(", ")));
            }
            item
        });
    Markup::join(items, ", ")
}

/// ` → (attrs) {t1|t2}`; empty when no entry declares a type
pub fn returns_markup(returns: &[Param], registry: &LinkRegistry) -> Markup {
    let mut attributes: Vec<&'static str> = Vec::new();
    let mut names: Vec<String> = Vec::new();

    for entry in returns {
        for attribute in entry.attributes() {
            if !attributes.contains(&attribute) {
                attributes.push(attribute);
            }
        }
        if let Some(type_expr) = &entry.type_expr {
            for name in &type_expr.names {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
    }

    if names.is_empty() {
        return Markup::new();
    }

    let mut out = Markup::text(" ");
    out.push_entity("rarr");
    out.push_text(" ");
    if !attributes.is_empty() {
        out.push_text(attributes_string(&attributes));
    }
    out.push_text("{");
    out.append(types_markup(&names, registry));
    out.push_text("}");
    out
}

/// Type names joined with `|`, each linked when the registry knows it
pub fn types_markup(names: &[String], registry: &LinkRegistry) -> Markup {
    Markup::join(names.iter().map(|name| registry.link_type(name)), "|")
}

/// The `(a, b) ` badge span shown before a symbol's name
pub fn attribs_markup(attribs: &[&str]) -> Markup {
    if attribs.is_empty() {
        return Markup::new();
    }
    let mut out = Markup::new();
    out.push_span("type-signature", Markup::text(attributes_string(attribs)));
    out
}

fn attributes_string(attributes: &[&str]) -> String {
    format!("({}) ", attributes.join(", "))
}
