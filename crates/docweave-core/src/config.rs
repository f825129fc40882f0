//! Template configuration (`docweave.toml`) parsing and validation.

use std::collections::HashSet;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::nav::Section;

/// Errors that can occur when loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("section '{0}' appears more than once in section-order")]
    DuplicateSection(String),
}

/// The complete configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Options consumed by the publish pipeline.
    #[serde(default)]
    pub template: TemplateConfig,
}

/// Options consumed by the publish pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct TemplateConfig {
    /// Leave private symbols out of the navigation.
    pub hide_private: bool,

    /// Deepest ancestor chain listed in the navigation; unlimited when unset.
    pub nav_level: Option<usize>,

    /// Keep too-deep entries in the navigation but flagged collapsed, and
    /// hide member and method leaves until expanded.
    pub collapse: bool,

    /// List static members under each navigation entry.
    pub static_members: bool,

    /// List global typedefs in the navigation.
    pub typedefs: bool,

    /// Order of navigation categories.
    pub section_order: Vec<Section>,

    /// Quote-stripping applied to names and longnames.
    pub remove_quotes: QuotePolicy,

    /// Sort symbols by longname, version and since before processing.
    pub sort: bool,

    /// Emit a page per source file.
    pub output_source_files: bool,

    /// Show longnames instead of short names in the navigation.
    pub use_longname_in_nav: bool,

    /// Title of the synthetic main-page record on the home page.
    pub main_page_title: String,

    /// Extra links at the top of the navigation: label -> HTML attributes.
    pub menu: IndexMap<String, IndexMap<String, String>>,

    /// Additional static files mirrored into the output.
    pub static_files: StaticFiles,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            hide_private: false,
            nav_level: None,
            collapse: false,
            static_members: false,
            typedefs: false,
            section_order: Section::DEFAULT_ORDER.to_vec(),
            remove_quotes: QuotePolicy::Off,
            sort: true,
            output_source_files: true,
            use_longname_in_nav: false,
            main_page_title: String::from("Main Page"),
            menu: IndexMap::new(),
            static_files: StaticFiles::default(),
        }
    }
}

/// How quote characters in names are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuotePolicy {
    /// Leave names untouched.
    #[default]
    Off,
    /// Remove every `"` and `'`.
    All,
    /// Remove one matching pair of surrounding quotes.
    Trim,
}

/// Globs selecting extra static files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct StaticFiles {
    /// Patterns to copy, e.g. `assets/**/*.png`.
    pub include: Vec<String>,
    /// Patterns removed from the include set.
    pub exclude: Vec<String>,
}

impl Config {
    /// Load a configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for section in &self.template.section_order {
            if !seen.insert(*section) {
                return Err(ConfigError::DuplicateSection(section.heading().to_string()));
            }
        }
        Ok(())
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
