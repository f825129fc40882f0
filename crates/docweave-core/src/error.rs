//! Run-level errors
//!
//! Only conditions that abort a publish run end up here. Resolution misses,
//! unreadable source files and failed asset copies are logged and absorbed
//! where they happen.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::render::RenderError;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("cannot create output directory '{}': {source}", .path.display())]
    OutputDir { path: PathBuf, source: io::Error },

    #[error("cannot write page '{}': {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("render error: {0}")]
    Render(#[from] RenderError),
}
