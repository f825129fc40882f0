//! Static asset mirroring
//!
//! Assets never block page output. Every failure is logged, counted and
//! skipped.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::StaticFiles;

/// Name of the asset directory inside a template directory
pub const STATIC_DIR: &str = "static";

/// Outcome of one asset copy pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssetReport {
    pub copied: usize,
    pub failed: usize,
}

impl AssetReport {
    fn record(&mut self, result: Result<(), String>, path: &Path) {
        match result {
            Ok(()) => self.copied += 1,
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "failed to copy static file");
                self.failed += 1;
            }
        }
    }
}

/// Mirror `<template>/static` and the configured static-file globs into
/// `output_dir`.
///
/// Template assets keep their path below `static/`. Glob matches keep their
/// path relative to `base_dir`.
pub fn copy_assets(
    template_dir: Option<&Path>,
    static_files: &StaticFiles,
    base_dir: &Path,
    output_dir: &Path,
) -> AssetReport {
    let mut report = AssetReport::default();

    if let Some(template_dir) = template_dir {
        let static_dir = template_dir.join(STATIC_DIR);
        if static_dir.is_dir() {
            let pattern = static_dir.join("**").join("*");
            for source in expand(&pattern.to_string_lossy(), &mut report) {
                copy_relative(&source, &static_dir, output_dir, &mut report);
            }
        }
    }

    let excludes: Vec<glob::Pattern> = static_files
        .exclude
        .iter()
        .filter_map(|exclude| match glob::Pattern::new(exclude) {
            Ok(pattern) => Some(pattern),
            Err(error) => {
                tracing::warn!(pattern = %exclude, %error, "ignoring invalid exclude pattern");
                None
            }
        })
        .collect();

    for include in &static_files.include {
        let pattern = base_dir.join(include);
        for source in expand(&pattern.to_string_lossy(), &mut report) {
            if is_excluded(&source, base_dir, &excludes) {
                continue;
            }
            copy_relative(&source, base_dir, output_dir, &mut report);
        }
    }

    tracing::debug!(copied = report.copied, failed = report.failed, "static assets copied");
    report
}

/// Regular files matching `pattern`
fn expand(pattern: &str, report: &mut AssetReport) -> Vec<PathBuf> {
    let entries = match glob::glob(pattern) {
        Ok(entries) => entries,
        Err(error) => {
            tracing::warn!(pattern, %error, "ignoring invalid static-files pattern");
            report.failed += 1;
            return Vec::new();
        }
    };

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(error) => report.record(Err(error.error().to_string()), error.path()),
        }
    }
    files
}

fn is_excluded(path: &Path, base_dir: &Path, excludes: &[glob::Pattern]) -> bool {
    let relative = path.strip_prefix(base_dir).unwrap_or(path);
    excludes.iter().any(|pattern| pattern.matches_path(relative))
}

fn copy_relative(source: &Path, root: &Path, output_dir: &Path, report: &mut AssetReport) {
    let relative = source.strip_prefix(root).unwrap_or(source);
    let target = output_dir.join(relative);

    let result = target
        .parent()
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|()| fs::copy(source, &target).map(|_| ()))
        .map_err(|e| e.to_string());
    report.record(result, source);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_copy_template_static_dir() {
        let template = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write(&template.path().join("static/styles/site.css"), "body {}");
        write(&template.path().join("static/logo.svg"), "<svg/>");

        let report = copy_assets(
            Some(template.path()),
            &StaticFiles::default(),
            template.path(),
            out.path(),
        );

        assert_eq!(report, AssetReport { copied: 2, failed: 0 });
        assert!(out.path().join("styles/site.css").exists());
        assert!(out.path().join("logo.svg").exists());
    }

    #[test]
    fn test_static_globs_with_exclude() {
        let base = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write(&base.path().join("assets/a.png"), "a");
        write(&base.path().join("assets/private/b.png"), "b");

        let static_files = StaticFiles {
            include: vec!["assets/**/*.png".to_string()],
            exclude: vec!["assets/private/*".to_string()],
        };
        let report = copy_assets(None, &static_files, base.path(), out.path());

        assert_eq!(report.copied, 1);
        assert!(out.path().join("assets/a.png").exists());
        assert!(!out.path().join("assets/private/b.png").exists());
    }

    #[test]
    fn test_missing_template_dir_is_not_an_error() {
        let out = TempDir::new().unwrap();
        let report = copy_assets(
            Some(Path::new("/nonexistent/template")),
            &StaticFiles::default(),
            Path::new("."),
            out.path(),
        );
        assert_eq!(report, AssetReport::default());
    }

    #[test]
    fn test_invalid_pattern_is_counted() {
        let out = TempDir::new().unwrap();
        let static_files = StaticFiles {
            include: vec!["[".to_string()],
            exclude: Vec::new(),
        };
        let report = copy_assets(None, &static_files, Path::new("."), out.path());
        assert_eq!(report.failed, 1);
    }
}
