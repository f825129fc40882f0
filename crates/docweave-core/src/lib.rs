//! docweave core - turns extracted doclets into a cross-linked documentation site
//!
//! The pipeline runs in a fixed order:
//! - Ingest: validate raw extractor JSON into [`Doclet`] records and a [`TutorialTree`]
//! - Normalize: strip quotes, split examples, register every symbol's URL
//! - Signatures: precompose parameter, return and type signatures
//! - Navigation: build the sidebar outline from the normalized symbol set
//! - Emit: group symbols into pages, render them and resolve leftover link placeholders

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Static asset mirroring
pub mod assets;

/// Template configuration
pub mod config;

/// Per-run mutable state shared by the pipeline stages
pub mod context;

/// Symbol records
pub mod doclet;

/// Page grouping and descriptors
pub mod emit;

/// Run-level errors
pub mod error;

/// Extractor input parsing and validation
pub mod ingest;

/// Link placeholder resolution
pub mod links;

/// Structured HTML fragments
pub mod markup;

/// Symbol partitioning by kind
pub mod members;

/// Navigation outline
pub mod nav;

/// Per-symbol cleanup pass
pub mod normalize;

/// The publish entry point
pub mod publish;

/// Longname to URL mapping
pub mod registry;

/// Rendering collaborator contract and the built-in HTML renderer
pub mod render;

/// Signature synthesis
pub mod signature;

/// Source listing bookkeeping
pub mod source;

/// Tutorial tree
pub mod tutorial;

pub use assets::AssetReport;
pub use config::{Config, ConfigError, QuotePolicy, StaticFiles, TemplateConfig};
pub use context::Context;
pub use doclet::{Access, Doclet, Example, Kind, Meta, Param, Scope, SeeAlso, TypeExpr};
pub use emit::{Page, PageDoc, PageEmitter, PageKind, Template};
pub use error::PublishError;
pub use ingest::{parse_input, Input, IngestError};
pub use markup::{escape_html, Fragment, Markup};
pub use members::Members;
pub use nav::{GlobalNav, MenuLink, Nav, NavBuilder, NavLink, NavNode, NavSection, Section};
pub use publish::{publish, PublishOptions, PublishReport};
pub use registry::LinkRegistry;
pub use render::{HtmlRenderer, Render, RenderError, View};
pub use tutorial::{Tutorial, TutorialError, TutorialSource, TutorialTree};
