//! Source listing bookkeeping
//!
//! Every source file referenced by a doclet is recorded once. After all files
//! are known the longest common directory prefix is stripped to get the short
//! paths shown in the output.

use indexmap::IndexMap;

use crate::markup::escape_html;
use crate::registry::LinkRegistry;

/// A recorded source file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFile {
    /// Path as reported by the extractor
    pub resolved: String,
    /// Path relative to the common prefix, with forward slashes
    pub shortened: Option<String>,
    /// Output page, assigned when source pages are enabled
    pub page: Option<String>,
}

/// Deduplicated set of source files, in discovery order
#[derive(Debug, Default)]
pub struct SourceFiles {
    files: IndexMap<String, SourceFile>,
}

impl SourceFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a source path; repeated paths are kept once
    pub fn record(&mut self, path: &str) {
        self.files
            .entry(path.to_string())
            .or_insert_with(|| SourceFile {
                resolved: path.to_string(),
                ..SourceFile::default()
            });
    }

    /// Strip the common directory prefix from every recorded path
    pub fn shorten(&mut self) {
        let paths: Vec<&str> = self.files.keys().map(String::as_str).collect();
        let prefix = common_prefix(&paths);

        for file in self.files.values_mut() {
            let short = file
                .resolved
                .strip_prefix(prefix.as_str())
                .unwrap_or(&file.resolved)
                .replace('\\', "/");
            file.shortened = Some(short);
        }
    }

    pub fn shortened(&self, path: &str) -> Option<&str> {
        self.files.get(path).and_then(|f| f.shortened.as_deref())
    }

    /// Give every file a page and register its short path as a link target
    pub fn register_pages(&mut self, registry: &mut LinkRegistry) {
        for file in self.files.values_mut() {
            let short = file
                .shortened
                .clone()
                .unwrap_or_else(|| file.resolved.clone());
            let page = registry.unique_filename(&short);
            registry.register_link(&short, page.clone());
            file.page = Some(page);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.values()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// The longest directory prefix shared by every path, with a trailing separator.
///
/// A single path yields its own directory.
pub fn common_prefix(paths: &[&str]) -> String {
    let Some((first, rest)) = paths.split_first() else {
        return String::new();
    };

    let separator = if first.contains('\\') && !first.contains('/') {
        '\\'
    } else {
        '/'
    };
    let directory = |path: &str| -> Vec<String> {
        let mut parts: Vec<String> = path
            .split(['/', '\\'])
            .map(str::to_string)
            .collect();
        parts.pop();
        parts
    };

    let mut common = directory(first);
    for path in rest {
        let parts = directory(path);
        let shared = common
            .iter()
            .zip(parts.iter())
            .take_while(|(a, b)| a == b)
            .count();
        common.truncate(shared);
    }

    if common.is_empty() {
        return String::new();
    }
    let mut prefix = common.join(&separator.to_string());
    prefix.push(separator);
    prefix
}

/// Escaped source text as numbered list items
pub fn source_listing(code: &str) -> String {
    let mut out = String::new();
    for (i, line) in code.lines().enumerate() {
        out.push_str(&format!(
            "<li id=\"line{}\">{}</li>\n",
            i + 1,
            escape_html(line)
        ));
    }
    out
}
