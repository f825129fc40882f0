//! Per-run mutable state
//!
//! A fresh [`Context`] is created for every publish run and handed to each
//! stage; nothing survives from one run to the next.

use crate::registry::LinkRegistry;
use crate::source::SourceFiles;

#[derive(Debug)]
pub struct Context {
    pub registry: LinkRegistry,
    pub sources: SourceFiles,
    /// Filename reserved for the home page
    pub index_page: String,
    /// Filename reserved for the global page
    pub global_page: String,
}

impl Context {
    /// Empty state with the home and global pages reserved
    pub fn new() -> Self {
        let mut registry = LinkRegistry::new();
        let index_page = registry.unique_filename("index");
        let global_page = registry.register_global();
        Self {
            registry,
            sources: SourceFiles::new(),
            index_page,
            global_page,
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
