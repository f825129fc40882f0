//! The publish entry point
//!
//! One call runs the whole pipeline against a fresh [`Context`]:
//! prune and sort, normalize and register links, synthesize signatures,
//! build the navigation, then plan, render and write every page.

use std::fs;
use std::path::{Path, PathBuf};

use crate::assets::{self, AssetReport};
use crate::config::Config;
use crate::context::Context;
use crate::doclet::{Doclet, Kind};
use crate::emit::{self, PageEmitter, PageKind};
use crate::error::PublishError;
use crate::ingest::Input;
use crate::links::resolve_links;
use crate::members::Members;
use crate::nav::NavBuilder;
use crate::normalize::{self, Normalizer};
use crate::render::{Render, View};
use crate::signature;

/// Run options that are not part of the template configuration
#[derive(Debug, Clone)]
pub struct PublishOptions {
    /// Output root; a package adds `<name>/<version>` below it
    pub destination: PathBuf,
    /// Template directory whose `static/` subtree is mirrored
    pub template_dir: Option<PathBuf>,
    /// Directory the `static-files` globs are relative to
    pub base_dir: PathBuf,
    /// Rendered README shown on the home page
    pub readme: Option<String>,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            destination: PathBuf::from("out"),
            template_dir: None,
            base_dir: PathBuf::from("."),
            readme: None,
        }
    }
}

/// Summary of a successful run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Directory the pages were written to
    pub output_dir: PathBuf,
    /// File names of every written page, in emission order
    pub pages: Vec<String>,
    /// Source files whose listing page could not be produced
    pub skipped_sources: usize,
    pub assets: AssetReport,
}

/// Materialize `input` as a documentation site.
///
/// Fails only when the output directory cannot be created, a page cannot be
/// written or the renderer fails. Everything else is logged and absorbed.
pub fn publish(
    input: Input,
    config: &Config,
    options: &PublishOptions,
    renderer: &dyn Render,
) -> Result<PublishReport, PublishError> {
    let template = &config.template;
    let Input { doclets, tutorials } = input;

    let mut doclets = normalize::prune(doclets);
    if template.sort {
        normalize::sort(&mut doclets);
    }
    normalize::add_event_listeners(&mut doclets);

    let mut ctx = Context::new();
    let normalizer = Normalizer::new(template);
    normalizer.normalize(&mut doclets, &mut ctx);

    let output_dir = output_root(&options.destination, &doclets);
    fs::create_dir_all(&output_dir).map_err(|source| PublishError::OutputDir {
        path: output_dir.clone(),
        source,
    })?;

    let assets = assets::copy_assets(
        options.template_dir.as_deref(),
        &template.static_files,
        &options.base_dir,
        &output_dir,
    );

    normalizer.finish(&mut doclets, &mut ctx);
    if template.output_source_files {
        ctx.sources.register_pages(&mut ctx.registry);
    }
    normalize::attach_module_symbols(&mut doclets);
    signature::synthesize(&mut doclets, &ctx.registry);
    emit::register_tutorials(&tutorials, &mut ctx.registry);

    let members = Members::partition(&doclets);
    let nav = NavBuilder::new(template, &ctx, &doclets).build(&members, &tutorials);
    let view = View {
        nav: &nav,
        registry: &ctx.registry,
        doclets: &doclets,
        output_source_files: template.output_source_files,
    };

    let emitter = PageEmitter::new(
        &doclets,
        &members,
        &ctx,
        template,
        &tutorials,
        options.readme.as_deref(),
    );
    let pages = emitter.plan(|path| fs::read_to_string(path));

    let skipped_sources = if template.output_source_files {
        let listed = pages.iter().filter(|p| p.kind == PageKind::Source).count();
        ctx.sources.len() - listed
    } else {
        0
    };

    let mut written = Vec::with_capacity(pages.len());
    for page in &pages {
        let html = renderer.render(page, &view)?;
        let html = if page.resolve_links {
            resolve_links(&html, &ctx.registry)
        } else {
            html
        };

        let path = output_dir.join(&page.filename);
        fs::write(&path, html).map_err(|source| PublishError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(page = %page.filename, kind = page.kind.label(), "page written");
        written.push(page.filename.clone());
    }

    tracing::info!(
        output = %output_dir.display(),
        pages = written.len(),
        skipped_sources,
        assets = assets.copied,
        "documentation published"
    );

    Ok(PublishReport {
        output_dir,
        pages: written,
        skipped_sources,
        assets,
    })
}

/// `destination/<package name>/<package version>` when package metadata exists
fn output_root(destination: &Path, doclets: &[Doclet]) -> PathBuf {
    let mut root = destination.to_path_buf();
    if let Some(package) = doclets.iter().find(|d| d.kind == Kind::Package) {
        root.push(&package.name);
        if let Some(version) = &package.version {
            root.push(version);
        }
    }
    root
}
