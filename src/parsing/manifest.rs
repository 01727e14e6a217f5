//! JSON manifest describing every tool result gathered for one file.
//!
//! ```json
//! {
//!   "tools": [
//!     {
//!       "name": "Droid", "version": "6.4", "identifies": true,
//!       "identities": [
//!         { "format": "TIFF", "mimetype": "image/tiff", "version": "6.0",
//!           "external_identifiers": [{ "type": "puid", "value": "fmt/353" }] }
//!       ],
//!       "fragment": "<fits><fileinfo><size>1024</size></fileinfo></fits>"
//!     },
//!     null
//!   ]
//! }
//! ```
//!
//! `null` entries stand for tools that produced nothing. Fragment and raw
//! output documents are given inline (`fragment`, `raw_output`) or by path
//! (`fragment_path`, `raw_output_path`). A document that cannot be read or
//! parsed is logged and treated as absent.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::core::identity::{ExternalIdentifier, FormatVersion, ToolIdentity};
use crate::core::tool::{IdentityRule, ToolInfo, ToolResult};
use crate::parsing::xml::parse_str;
use crate::utils::validation::{strip_invalid_xml_chars, MAX_MANIFEST_SIZE};
use crate::xml::Element;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to read manifest: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse manifest: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Manifest too large: {0} bytes (max {max})", max = MAX_MANIFEST_SIZE)]
    TooLarge(u64),

    #[error("Tool '{tool}' sets both {field} and {field}_path")]
    AmbiguousSource { tool: String, field: &'static str },

    #[error("Tool '{tool}' references a file, which is not allowed here")]
    PathNotAllowed { tool: String },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub tools: Vec<Option<ToolEntry>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolEntry {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub note: String,
    /// Defaults to whether any identities are listed
    pub identifies: Option<bool>,
    pub unknown_formats: Option<Vec<String>>,
    pub unknown_mimes: Option<Vec<String>>,
    #[serde(default)]
    pub identities: Vec<IdentityEntry>,
    pub fragment: Option<String>,
    pub fragment_path: Option<PathBuf>,
    pub raw_output: Option<String>,
    pub raw_output_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityEntry {
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub mimetype: String,
    pub version: Option<String>,
    #[serde(default)]
    pub external_identifiers: Vec<ExternalIdEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExternalIdEntry {
    #[serde(rename = "type")]
    pub id_type: String,
    pub value: String,
}

/// Load a manifest file; relative document paths resolve against its directory.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is too large, or is not a
/// valid manifest.
pub fn load_manifest(path: &Path) -> Result<Vec<Option<ToolResult>>, ManifestError> {
    let size = std::fs::metadata(path)?.len();
    if size > MAX_MANIFEST_SIZE as u64 {
        return Err(ManifestError::TooLarge(size));
    }
    let content = std::fs::read_to_string(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_manifest(&content, Some(base_dir))
}

/// Parse manifest JSON.
///
/// With `base_dir` set, `*_path` entries are read relative to it. Without it,
/// only inline documents are accepted.
///
/// # Errors
///
/// Returns an error if the JSON is invalid, a tool gives a document both
/// inline and by path, or a path is given without a base directory.
pub fn parse_manifest(
    json: &str,
    base_dir: Option<&Path>,
) -> Result<Vec<Option<ToolResult>>, ManifestError> {
    let manifest: Manifest = serde_json::from_str(json)?;
    manifest
        .tools
        .into_iter()
        .map(|entry| entry.map(|e| e.into_result(base_dir)).transpose())
        .collect()
}

impl ToolEntry {
    /// Convert to a tool result, loading its documents.
    ///
    /// # Errors
    ///
    /// Returns an error only for contradictory or disallowed document sources;
    /// unreadable documents are dropped with a warning.
    pub fn into_result(self, base_dir: Option<&Path>) -> Result<ToolResult, ManifestError> {
        let tool = ToolInfo::new(&self.name, &self.version).with_note(&self.note);

        let fragment = self.document(
            "fragment",
            self.fragment.as_deref(),
            self.fragment_path.as_deref(),
            base_dir,
        )?;
        let raw_output = self.document(
            "raw_output",
            self.raw_output.as_deref(),
            self.raw_output_path.as_deref(),
            base_dir,
        )?;

        let mut rule = IdentityRule::default();
        if let Some(formats) = self.unknown_formats {
            rule.unknown_formats = formats;
        }
        if let Some(mimes) = self.unknown_mimes {
            rule.unknown_mimes = mimes;
        }

        let identities: Vec<ToolIdentity> = self
            .identities
            .into_iter()
            .map(|entry| entry.into_identity(&tool))
            .collect();
        let identifies = self.identifies.unwrap_or(!identities.is_empty());

        let mut result = ToolResult::new(tool).with_rule(rule);
        result.identifies = identifies;
        result.identities = identities;
        if let Some(root) = fragment {
            result = result.with_fragment(root);
        }
        if let Some(root) = raw_output {
            result = result.with_raw_output(root);
        }
        Ok(result)
    }

    fn document(
        &self,
        field: &'static str,
        inline: Option<&str>,
        path: Option<&Path>,
        base_dir: Option<&Path>,
    ) -> Result<Option<Element>, ManifestError> {
        let text = match (inline, path) {
            (Some(_), Some(_)) => {
                return Err(ManifestError::AmbiguousSource {
                    tool: self.name.clone(),
                    field,
                })
            }
            (Some(text), None) => text.to_string(),
            (None, Some(path)) => {
                let Some(base) = base_dir else {
                    return Err(ManifestError::PathNotAllowed {
                        tool: self.name.clone(),
                    });
                };
                match std::fs::read_to_string(base.join(path)) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("Skipping {} of {}: {}: {}", field, self.name, path.display(), e);
                        return Ok(None);
                    }
                }
            }
            (None, None) => return Ok(None),
        };

        match parse_str(&strip_invalid_xml_chars(&text)) {
            Ok(root) => Ok(Some(root)),
            Err(e) => {
                warn!("Skipping malformed {} of {}: {}", field, self.name, e);
                Ok(None)
            }
        }
    }
}

impl IdentityEntry {
    fn into_identity(self, tool: &ToolInfo) -> ToolIdentity {
        ToolIdentity {
            format: self.format,
            mimetype: self.mimetype,
            version: self.version.map(|value| FormatVersion {
                value,
                tool: tool.clone(),
            }),
            external_identifiers: self
                .external_identifiers
                .into_iter()
                .map(|x| ExternalIdentifier {
                    id_type: x.id_type,
                    value: x.value,
                    tool: tool.clone(),
                })
                .collect(),
            tool: tool.clone(),
        }
    }
}
