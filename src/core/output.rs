use serde::Serialize;

use crate::core::identity::ConsolidatedIdentity;
use crate::core::types::Status;
use crate::xml::Element;

/// Root element name of a consolidated document
pub const ROOT_ELEMENT: &str = "fits";
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Schema namespace and location stamped on the output root
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaInfo {
    pub namespace: String,
    pub location: String,
}

/// Identification section: consolidated identities plus one overall status
#[derive(Debug, Clone, Serialize)]
pub struct IdentificationSection {
    pub status: Status,
    pub identities: Vec<ConsolidatedIdentity>,
}

/// Result of one consolidation pass, owned by the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ConsolidatedOutput {
    pub schema: SchemaInfo,
    pub version: String,
    pub timestamp: String,
    pub identification: IdentificationSection,
    pub fileinfo: Element,
    pub filestatus: Element,
    /// Grouping nodes, one per metadata sub-type, in first-seen order
    pub metadata: Element,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_output: Option<Element>,
}

impl ConsolidatedOutput {
    /// Render the whole pass as one XML element tree.
    #[must_use]
    pub fn to_element(&self) -> Element {
        let mut root = Element::new(ROOT_ELEMENT)
            .with_attr("xmlns", &self.schema.namespace)
            .with_attr("xmlns:xsi", XSI_NAMESPACE)
            .with_attr(
                "xsi:schemaLocation",
                format!("{} {}", self.schema.namespace, self.schema.location),
            )
            .with_attr("version", &self.version)
            .with_attr("timestamp", &self.timestamp);

        root.push(self.identification_element());
        root.push(self.fileinfo.clone());
        root.push(self.filestatus.clone());
        root.push(self.metadata.clone());
        if let Some(tool_output) = &self.tool_output {
            root.push(tool_output.clone());
        }
        root
    }

    fn identification_element(&self) -> Element {
        let mut section = Element::new("identification");
        if let Some(status) = self.identification.status.as_attr() {
            section.set_attr("status", status);
        }
        for identity in &self.identification.identities {
            section.push(identity_element(identity));
        }
        section
    }

    /// Serialize to an XML document string.
    ///
    /// # Errors
    ///
    /// Returns an error if the XML writer fails.
    pub fn to_xml(&self) -> Result<String, crate::xml::XmlError> {
        crate::xml::writer::to_xml_string(&self.to_element())
    }
}

fn identity_element(identity: &ConsolidatedIdentity) -> Element {
    let mut element = Element::new("identity")
        .with_attr("format", &identity.format)
        .with_attr("mimetype", &identity.mimetype);
    if let Some(tool) = identity.primary_tool() {
        element.set_attr("toolname", &tool.name);
        element.set_attr("toolversion", &tool.version);
    }

    for tool in &identity.reporting_tools {
        element.push(
            Element::new("tool")
                .with_attr("toolname", &tool.name)
                .with_attr("toolversion", &tool.version),
        );
    }

    let version_status = if identity.format_versions.len() > 1 {
        Status::Conflict
    } else {
        Status::None
    };
    for version in &identity.format_versions {
        let mut v = Element::new("version")
            .with_attr("toolname", &version.tool.name)
            .with_attr("toolversion", &version.tool.version)
            .with_text(&version.value);
        if let Some(status) = version_status.as_attr() {
            v.set_attr("status", status);
        }
        element.push(v);
    }

    for xid in &identity.external_identifiers {
        element.push(
            Element::new("externalIdentifier")
                .with_attr("toolname", &xid.tool.name)
                .with_attr("toolversion", &xid.tool.version)
                .with_attr("type", &xid.id_type)
                .with_text(&xid.value),
        );
    }

    element
}
