//! File configuration for the consolidator.
//!
//! ```toml
//! [output]
//! report-conflicts = true
//! display-tool-output = false
//!
//! [schema]
//! namespace = "http://hul.harvard.edu/ois/xml/ns/fits/fits_output"
//! location = "http://hul.harvard.edu/ois/xml/xsd/fits/fits_output.xsd"
//!
//! [format-tree]
//! path = "/etc/fileid/format_tree.xml"
//! ```
//!
//! Every table and key is optional.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::consolidation::engine::{ConsolidationConfig, DEFAULT_NAMESPACE, DEFAULT_SCHEMA_LOCATION};
use crate::core::output::SchemaInfo;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConsolidatorConfig {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub schema: SchemaConfig,
    #[serde(default)]
    pub format_tree: FormatTreeConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_true")]
    pub report_conflicts: bool,
    #[serde(default)]
    pub display_tool_output: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_conflicts: true,
            display_tool_output: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaConfig {
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_location")]
    pub location: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            location: default_location(),
        }
    }
}

/// Alternate format hierarchy; the embedded one is used when unset
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormatTreeConfig {
    pub path: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_location() -> String {
    DEFAULT_SCHEMA_LOCATION.to_string()
}

impl ConsolidatorConfig {
    /// Load configuration from a TOML file.
    ///
    /// A relative `[format-tree] path` is resolved against the config file's
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content)?;
        let resolved = match (&config.format_tree.path, path.parent()) {
            (Some(tree), Some(dir)) if tree.is_relative() => Some(dir.join(tree)),
            _ => None,
        };
        if resolved.is_some() {
            config.format_tree.path = resolved;
        }
        Ok(config)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or has unknown keys.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    #[must_use]
    pub fn to_consolidation_config(&self) -> ConsolidationConfig {
        ConsolidationConfig {
            report_conflicts: self.output.report_conflicts,
            display_tool_output: self.output.display_tool_output,
            schema: SchemaInfo {
                namespace: self.schema.namespace.clone(),
                location: self.schema.location.clone(),
            },
        }
    }
}
