use serde::{Deserialize, Serialize};

use crate::core::identity::ToolIdentity;
use crate::utils::normalize::contains_ignore_case;
use crate::xml::{Document, Element};

/// Identifies a contributing analysis tool
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,

    #[serde(default)]
    pub version: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub note: String,
}

impl ToolInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            note: String::new(),
        }
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}

impl std::fmt::Display for ToolInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.version.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} {}", self.name, self.version)
        }
    }
}

pub const DEFAULT_UNKNOWN_FORMATS: &[&str] = &["Unknown Binary", "unknown", "data"];
pub const DEFAULT_UNKNOWN_MIMES: &[&str] = &["application/octet-stream"];

/// A tool's own notion of when an identity it reports is "known".
///
/// An identity is known when format and MIME are both non-empty and neither
/// matches, ignoring case, one of the tool's placeholder values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRule {
    pub unknown_formats: Vec<String>,
    pub unknown_mimes: Vec<String>,
}

impl Default for IdentityRule {
    fn default() -> Self {
        Self {
            unknown_formats: DEFAULT_UNKNOWN_FORMATS.iter().map(|s| (*s).to_string()).collect(),
            unknown_mimes: DEFAULT_UNKNOWN_MIMES.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl IdentityRule {
    #[must_use]
    pub fn is_known(&self, identity: &ToolIdentity) -> bool {
        !identity.format.is_empty()
            && !identity.mimetype.is_empty()
            && !contains_ignore_case(&self.unknown_formats, &identity.format)
            && !contains_ignore_case(&self.unknown_mimes, &identity.mimetype)
    }
}

/// Everything one tool produced for one file.
///
/// Fragment and raw trees are owned by the result until consolidation moves
/// them into the output.
#[derive(Debug)]
pub struct ToolResult {
    pub tool: ToolInfo,

    /// Whether this tool attempts format identification at all
    pub identifies: bool,

    pub rule: IdentityRule,

    pub identities: Vec<ToolIdentity>,

    /// Normalized tree with fileinfo / filestatus / metadata sections
    pub fragment: Option<Document>,

    /// The tool's native output, passed through verbatim when requested
    pub raw_output: Option<Element>,
}

impl ToolResult {
    pub fn new(tool: ToolInfo) -> Self {
        Self {
            tool,
            identifies: false,
            rule: IdentityRule::default(),
            identities: Vec::new(),
            fragment: None,
            raw_output: None,
        }
    }

    /// Mark this tool as an identifier reporting `identities`
    #[must_use]
    pub fn with_identities(mut self, identities: Vec<ToolIdentity>) -> Self {
        self.identifies = true;
        self.identities = identities;
        self
    }

    #[must_use]
    pub fn with_rule(mut self, rule: IdentityRule) -> Self {
        self.rule = rule;
        self
    }

    #[must_use]
    pub fn with_fragment(mut self, root: Element) -> Self {
        self.fragment = Some(Document::from_element(root));
        self
    }

    #[must_use]
    pub fn with_raw_output(mut self, root: Element) -> Self {
        self.raw_output = Some(root);
        self
    }

    /// True when the tool reported at least one identity and all are known
    #[must_use]
    pub fn all_identities_known(&self) -> bool {
        !self.identities.is_empty() && self.identities.iter().all(|i| self.rule.is_known(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool() -> ToolInfo {
        ToolInfo::new("file utility", "5.38")
    }

    #[test]
    fn test_default_rule() {
        let rule = IdentityRule::default();
        assert!(rule.is_known(&ToolIdentity::new("JPEG File Interchange Format", "image/jpeg", tool())));
        assert!(!rule.is_known(&ToolIdentity::new("Unknown Binary", "image/jpeg", tool())));
        assert!(!rule.is_known(&ToolIdentity::new("UNKNOWN", "image/jpeg", tool())));
        assert!(!rule.is_known(&ToolIdentity::new("data", "application/octet-stream", tool())));
        assert!(!rule.is_known(&ToolIdentity::new("", "image/jpeg", tool())));
        assert!(!rule.is_known(&ToolIdentity::new("JPEG", "", tool())));
    }

    #[test]
    fn test_all_identities_known() {
        let empty = ToolResult::new(tool()).with_identities(vec![]);
        assert!(!empty.all_identities_known());

        let mixed = ToolResult::new(tool()).with_identities(vec![
            ToolIdentity::new("Plain text", "text/plain", tool()),
            ToolIdentity::new("Unknown Binary", "application/octet-stream", tool()),
        ]);
        assert!(!mixed.all_identities_known());

        let good = ToolResult::new(tool()).with_identities(vec![ToolIdentity::new(
            "Plain text",
            "text/plain",
            tool(),
        )]);
        assert!(good.all_identities_known());
    }

    #[test]
    fn test_tool_display() {
        assert_eq!(tool().to_string(), "file utility 5.38");
        assert_eq!(ToolInfo::new("ADL Tool", "").to_string(), "ADL Tool");
    }
}
