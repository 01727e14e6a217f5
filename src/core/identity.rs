use serde::{Deserialize, Serialize};

use crate::core::tool::ToolInfo;
use crate::utils::normalize::{eq_ignore_case, pair_eq_ignore_case};

/// A format version as reported by one tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatVersion {
    pub value: String,
    pub tool: ToolInfo,
}

/// An identifier from an external registry (e.g. a PRONOM PUID)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalIdentifier {
    /// Identifier scheme, e.g. "puid"
    #[serde(rename = "type")]
    pub id_type: String,
    pub value: String,
    pub tool: ToolInfo,
}

impl ExternalIdentifier {
    /// Same scheme and value, ignoring case and reporting tool
    #[must_use]
    pub fn same_as(&self, other: &ExternalIdentifier) -> bool {
        eq_ignore_case(&self.id_type, &other.id_type) && eq_ignore_case(&self.value, &other.value)
    }
}

/// One tool's claim about a file's format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolIdentity {
    pub format: String,
    pub mimetype: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<FormatVersion>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_identifiers: Vec<ExternalIdentifier>,
    pub tool: ToolInfo,
}

impl ToolIdentity {
    pub fn new(format: impl Into<String>, mimetype: impl Into<String>, tool: ToolInfo) -> Self {
        Self {
            format: format.into(),
            mimetype: mimetype.into(),
            version: None,
            external_identifiers: Vec::new(),
            tool,
        }
    }

    #[must_use]
    pub fn with_version(mut self, value: impl Into<String>) -> Self {
        self.version = Some(FormatVersion {
            value: value.into(),
            tool: self.tool.clone(),
        });
        self
    }

    #[must_use]
    pub fn with_external_id(mut self, id_type: impl Into<String>, value: impl Into<String>) -> Self {
        self.external_identifiers.push(ExternalIdentifier {
            id_type: id_type.into(),
            value: value.into(),
            tool: self.tool.clone(),
        });
        self
    }
}

/// The merged identity record produced by one consolidation pass.
///
/// Keyed by (format, mimetype) compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedIdentity {
    pub format: String,
    pub mimetype: String,
    pub reporting_tools: Vec<ToolInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub format_versions: Vec<FormatVersion>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_identifiers: Vec<ExternalIdentifier>,
}

impl ConsolidatedIdentity {
    /// Seed a fresh record from a single claim
    #[must_use]
    pub fn from_claim(claim: &ToolIdentity) -> Self {
        let mut identity = Self {
            format: claim.format.clone(),
            mimetype: claim.mimetype.clone(),
            reporting_tools: vec![claim.tool.clone()],
            format_versions: Vec::new(),
            external_identifiers: Vec::new(),
        };
        identity.merge_details(claim);
        identity
    }

    /// Case-insensitive (format, mimetype) match
    #[must_use]
    pub fn matches(&self, claim: &ToolIdentity) -> bool {
        pair_eq_ignore_case(
            (&self.format, &self.mimetype),
            (&claim.format, &claim.mimetype),
        )
    }

    /// Fold an equal claim into this record: its versions, external
    /// identifiers and reporting tool.
    pub fn absorb(&mut self, claim: &ToolIdentity) {
        self.merge_details(claim);
        if !self.reporting_tools.contains(&claim.tool) {
            self.reporting_tools.push(claim.tool.clone());
        }
    }

    /// Fold another record with the same key into this one
    pub fn merge_record(&mut self, other: ConsolidatedIdentity) {
        for tool in other.reporting_tools {
            if !self.reporting_tools.contains(&tool) {
                self.reporting_tools.push(tool);
            }
        }
        for version in other.format_versions {
            if !self.has_format_version(&version) {
                self.format_versions.push(version);
            }
        }
        for xid in other.external_identifiers {
            if !self.has_external_identifier(&xid) {
                self.external_identifiers.push(xid);
            }
        }
    }

    fn merge_details(&mut self, claim: &ToolIdentity) {
        for xid in &claim.external_identifiers {
            if !self.has_external_identifier(xid) {
                self.external_identifiers.push(xid.clone());
            }
        }
        if let Some(version) = &claim.version {
            if !version.value.is_empty() && !self.has_format_version(version) {
                self.format_versions.push(version.clone());
            }
        }
    }

    #[must_use]
    pub fn has_external_identifier(&self, xid: &ExternalIdentifier) -> bool {
        self.external_identifiers.iter().any(|x| x.same_as(xid))
    }

    #[must_use]
    pub fn has_format_version(&self, version: &FormatVersion) -> bool {
        self.format_versions
            .iter()
            .any(|v| eq_ignore_case(&v.value, &version.value))
    }

    /// Tool credited on the identity element itself: the first reporter
    #[must_use]
    pub fn primary_tool(&self) -> Option<&ToolInfo> {
        self.reporting_tools.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn droid() -> ToolInfo {
        ToolInfo::new("Droid", "6.4")
    }

    fn jhove() -> ToolInfo {
        ToolInfo::new("Jhove", "1.26")
    }

    #[test]
    fn test_from_claim_seeds_all_details() {
        let claim = ToolIdentity::new("Portable Document Format", "application/pdf", droid())
            .with_version("1.4")
            .with_external_id("puid", "fmt/18");
        let identity = ConsolidatedIdentity::from_claim(&claim);

        assert_eq!(identity.reporting_tools, vec![droid()]);
        assert_eq!(identity.format_versions.len(), 1);
        assert_eq!(identity.external_identifiers[0].value, "fmt/18");
        assert_eq!(identity.primary_tool(), Some(&droid()));
    }

    #[test]
    fn test_absorb_deduplicates() {
        let a = ToolIdentity::new("Portable Document Format", "application/pdf", droid())
            .with_version("1.4")
            .with_external_id("puid", "fmt/18");
        let b = ToolIdentity::new("portable document format", "APPLICATION/PDF", jhove())
            .with_version("1.4")
            .with_external_id("PUID", "fmt/18")
            .with_external_id("puid", "fmt/19");

        let mut identity = ConsolidatedIdentity::from_claim(&a);
        assert!(identity.matches(&b));
        identity.absorb(&b);

        assert_eq!(identity.reporting_tools, vec![droid(), jhove()]);
        assert_eq!(identity.format_versions.len(), 1);
        assert_eq!(identity.format_versions[0].tool, droid());
        assert_eq!(identity.external_identifiers.len(), 2);
    }

    #[test]
    fn test_absorb_keeps_distinct_versions() {
        let a = ToolIdentity::new("PDF", "application/pdf", droid()).with_version("1.4");
        let b = ToolIdentity::new("PDF", "application/pdf", jhove()).with_version("1.5");
        let mut identity = ConsolidatedIdentity::from_claim(&a);
        identity.absorb(&b);
        assert_eq!(identity.format_versions.len(), 2);
    }

    #[test]
    fn test_merge_record() {
        let mut a = ConsolidatedIdentity::from_claim(
            &ToolIdentity::new("PDF", "application/pdf", droid()).with_version("1.4"),
        );
        let b = ConsolidatedIdentity::from_claim(
            &ToolIdentity::new("PDF", "application/pdf", jhove())
                .with_version("1.4")
                .with_external_id("puid", "fmt/18"),
        );
        a.merge_record(b);
        assert_eq!(a.reporting_tools, vec![droid(), jhove()]);
        assert_eq!(a.format_versions.len(), 1);
        assert_eq!(a.external_identifiers.len(), 1);
    }

    #[test]
    fn test_empty_version_is_ignored() {
        let a = ToolIdentity::new("PDF", "application/pdf", droid()).with_version("");
        assert!(ConsolidatedIdentity::from_claim(&a).format_versions.is_empty());
    }

    #[test]
    fn test_external_identifier_serializes_type() {
        let xid = ExternalIdentifier {
            id_type: "puid".to_string(),
            value: "fmt/43".to_string(),
            tool: droid(),
        };
        let json = serde_json::to_value(&xid).unwrap();
        assert_eq!(json["type"], "puid");
    }
}
