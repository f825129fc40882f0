//! Extractor input parsing and validation
//!
//! The extractor hands over loosely-typed JSON. It is deserialized into raw
//! records first and then validated per kind into [`Doclet`]s, so consumers
//! never have to second-guess which fields exist.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::doclet::{Access, Doclet, Example, Kind, Meta, Param, Scope, SeeAlso, TypeExpr};
use crate::tutorial::{TutorialError, TutorialSource, TutorialTree};

/// Errors raised while reading extractor output
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse input: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("doclet #{index}: unknown kind '{kind}'")]
    UnknownKind { index: usize, kind: String },

    #[error("doclet #{index} ({kind}): missing required field '{field}'")]
    MissingField {
        index: usize,
        kind: String,
        field: &'static str,
    },

    #[error("doclet #{index} ({kind}): field '{field}' must not be empty")]
    EmptyField {
        index: usize,
        kind: Kind,
        field: &'static str,
    },

    #[error("invalid tutorial tree: {0}")]
    Tutorial(#[from] TutorialError),
}

/// Everything the extractor supplies for one run
#[derive(Debug, Clone, Default)]
pub struct Input {
    pub doclets: Vec<Doclet>,
    pub tutorials: TutorialTree,
}

impl Input {
    /// Load and validate extractor output from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, IngestError> {
        let content = std::fs::read_to_string(path)?;
        parse_input(&content)
    }
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    doclets: Vec<RawDoclet>,
    #[serde(default)]
    tutorials: Vec<TutorialSource>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDoclet {
    kind: Option<String>,
    name: Option<String>,
    longname: Option<String>,
    memberof: Option<String>,
    scope: Option<Scope>,
    access: Option<Access>,
    description: Option<String>,
    params: Vec<Param>,
    returns: Vec<Param>,
    yields: Vec<Param>,
    #[serde(rename = "type")]
    type_expr: Option<TypeExpr>,
    meta: Option<RawMeta>,
    examples: Vec<String>,
    see: Vec<String>,
    version: Option<String>,
    since: Option<String>,
    hideconstructor: bool,
    readonly: bool,
    #[serde(rename = "async")]
    is_async: bool,
    generator: bool,
    #[serde(rename = "virtual")]
    is_virtual: bool,
    nullable: Option<bool>,
    undocumented: bool,
    ignore: bool,
    fires: Vec<String>,
    listens: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawMeta {
    path: Option<String>,
    filename: Option<String>,
    lineno: Option<u32>,
    code: Option<RawCode>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCode {
    #[serde(rename = "type")]
    code_type: Option<String>,
}

/// Parse extractor JSON of the form `{ "doclets": [...], "tutorials": [...] }`
pub fn parse_input(json: &str) -> Result<Input, IngestError> {
    let raw: RawDocument = serde_json::from_str(json)?;

    let doclets = raw
        .doclets
        .into_iter()
        .enumerate()
        .map(|(index, doclet)| validate(index, doclet))
        .collect::<Result<Vec<_>, _>>()?;
    let tutorials = TutorialTree::build(raw.tutorials)?;

    tracing::debug!(
        doclets = doclets.len(),
        tutorials = tutorials.depth_first().len(),
        "input parsed"
    );
    Ok(Input { doclets, tutorials })
}

fn validate(index: usize, raw: RawDoclet) -> Result<Doclet, IngestError> {
    let kind_name = raw.kind.ok_or(IngestError::MissingField {
        index,
        kind: String::from("<none>"),
        field: "kind",
    })?;
    let kind = Kind::from_name(&kind_name).ok_or_else(|| IngestError::UnknownKind {
        index,
        kind: kind_name.clone(),
    })?;

    let name = raw.name.ok_or_else(|| IngestError::MissingField {
        index,
        kind: kind_name.clone(),
        field: "name",
    })?;
    if name.is_empty() {
        return Err(IngestError::EmptyField {
            index,
            kind,
            field: "name",
        });
    }

    let longname = match (kind, raw.longname) {
        (_, Some(longname)) if !longname.is_empty() => longname,
        (Kind::Package, _) => format!("package:{}", name),
        (_, Some(_)) => {
            return Err(IngestError::EmptyField {
                index,
                kind,
                field: "longname",
            })
        }
        (_, None) => {
            return Err(IngestError::MissingField {
                index,
                kind: kind_name,
                field: "longname",
            })
        }
    };

    let meta = match raw.meta {
        Some(meta) => {
            let filename = meta.filename.ok_or_else(|| IngestError::MissingField {
                index,
                kind: kind.as_str().to_string(),
                field: "meta.filename",
            })?;
            Some(Meta {
                path: meta.path,
                filename,
                lineno: meta.lineno,
                code_type: meta.code.and_then(|code| code.code_type),
                shortpath: None,
            })
        }
        None => None,
    };

    let mut doclet = Doclet::new(kind, name, longname);
    doclet.memberof = raw.memberof;
    doclet.scope = raw.scope;
    doclet.access = raw.access;
    doclet.description = raw.description;
    doclet.params = raw.params;
    doclet.returns = raw.returns;
    doclet.yields = raw.yields;
    doclet.type_expr = raw.type_expr;
    doclet.meta = meta;
    doclet.examples = raw
        .examples
        .into_iter()
        .map(|code| Example {
            caption: String::new(),
            code,
        })
        .collect();
    doclet.see = raw.see.into_iter().map(SeeAlso::Reference).collect();
    doclet.version = raw.version;
    doclet.since = raw.since;
    doclet.hideconstructor = raw.hideconstructor;
    doclet.readonly = raw.readonly;
    doclet.is_async = raw.is_async;
    doclet.generator = raw.generator;
    doclet.is_virtual = raw.is_virtual;
    doclet.nullable = raw.nullable;
    doclet.undocumented = raw.undocumented;
    doclet.ignore = raw.ignore;
    doclet.fires = raw.fires;
    doclet.listens = raw.listens;

    Ok(doclet)
}
