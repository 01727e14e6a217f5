//! End-to-end consolidation behavior through the public library API.

use std::sync::Arc;

use fileid_reconcile::core::identity::ToolIdentity;
use fileid_reconcile::core::tool::{ToolInfo, ToolResult};
use fileid_reconcile::parsing::manifest::parse_manifest;
use fileid_reconcile::parsing::xml::parse_str;
use fileid_reconcile::utils::normalize::pair_eq_ignore_case;
use fileid_reconcile::xml::Element;
use fileid_reconcile::{ConsolidationConfig, Consolidator, FormatTree, Status};

const TS: &str = "2026-05-04T08:30:00Z";

fn consolidator(report_conflicts: bool) -> Consolidator {
    let tree = FormatTree::load_embedded().expect("embedded tree loads");
    let config = ConsolidationConfig {
        report_conflicts,
        ..ConsolidationConfig::default()
    };
    Consolidator::new(Arc::new(tree), config)
}

fn identifier(name: &str, claims: &[(&str, &str)]) -> ToolResult {
    let tool = ToolInfo::new(name, "1.0");
    let identities = claims
        .iter()
        .map(|(format, mime)| ToolIdentity::new(*format, *mime, tool.clone()))
        .collect();
    ToolResult::new(tool).with_identities(identities)
}

fn metadata_only(name: &str, fragment_xml: &str) -> ToolResult {
    ToolResult::new(ToolInfo::new(name, "1.0")).with_fragment(parse_str(fragment_xml).unwrap())
}

fn image_fragment(element: &str, value: &str) -> String {
    format!("<fits><metadata><image><{element}>{value}</{element}></image></metadata></fits>")
}

#[test]
fn test_repeated_passes_are_identical() {
    let build = || {
        vec![
            Some(identifier("Droid", &[("TIFF", "image/tiff")])),
            Some(identifier("Jhove", &[("Portable Document Format", "application/pdf")])),
            Some(metadata_only(
                "Exiftool",
                "<fits><fileinfo><size>10</size><created>2020</created></fileinfo></fits>",
            )),
            Some(metadata_only(
                "MediaInfo",
                "<fits><fileinfo><created>2021</created></fileinfo></fits>",
            )),
        ]
    };

    let c = consolidator(true);
    let first = c.consolidate_at(build(), TS.to_string()).to_xml().unwrap();
    let second = c.consolidate_at(build(), TS.to_string()).to_xml().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_identities_are_unique() {
    let results = vec![
        Some(identifier("Droid", &[("TIFF", "image/tiff"), ("JPEG", "image/jpeg")])),
        Some(identifier("Jhove", &[("tiff", "IMAGE/TIFF"), ("TIFF/EP", "image/tiff")])),
        Some(identifier("Exiftool", &[("JPEG", "image/jpeg"), ("TIFF", "image/tiff")])),
        Some(identifier("ffident", &[("Tagged Image File Format", "image/tiff")])),
    ];
    let output = consolidator(true).consolidate_at(results, TS.to_string());
    let ids = &output.identification.identities;

    for (i, a) in ids.iter().enumerate() {
        for b in &ids[i + 1..] {
            assert!(
                !pair_eq_ignore_case((&a.format, &a.mimetype), (&b.format, &b.mimetype)),
                "duplicate identity {} / {}",
                a.format,
                a.mimetype
            );
        }
    }
}

#[test]
fn test_more_specific_identity_wins() {
    let results = vec![
        Some(identifier("tool1", &[("TIFF/EP", "image/tiff")])),
        Some(identifier("tool2", &[("TIFF", "image/tiff")])),
    ];
    let output = consolidator(true).consolidate_at(results, TS.to_string());
    let ids = &output.identification.identities;

    assert_eq!(ids.len(), 1);
    assert_eq!(ids[0].format, "TIFF/EP");
    assert_eq!(ids[0].mimetype, "image/tiff");
    assert_eq!(ids[0].reporting_tools, vec![ToolInfo::new("tool1", "1.0")]);
    assert_eq!(output.identification.status, Status::SingleResult);
}

#[test]
fn test_numeric_values_agree() {
    let results = vec![
        Some(metadata_only("Exiftool", &image_fragment("xSamplingFrequency", "300"))),
        Some(metadata_only("Jhove", &image_fragment("xSamplingFrequency", "300.0"))),
    ];
    let output = consolidator(true).consolidate_at(results, TS.to_string());
    let image = output.metadata.child("image").unwrap();

    assert_eq!(image.children.len(), 1);
    assert_eq!(image.children[0].text, "300");
    assert_eq!(image.children[0].attr("status"), None);
}

#[test]
fn test_conflict_reporting_toggle() {
    let results = || {
        vec![
            Some(metadata_only("A", &image_fragment("compressionScheme", "JPEG"))),
            Some(metadata_only("B", &image_fragment("compressionScheme", "JFIF"))),
            Some(metadata_only("C", &image_fragment("compressionScheme", "jpeg"))),
        ]
    };

    let off = consolidator(false).consolidate_at(results(), TS.to_string());
    let image = off.metadata.child("image").unwrap();
    assert_eq!(image.children.len(), 1);
    assert_eq!(image.children[0].text, "JPEG");
    assert_eq!(image.children[0].attr("status"), None);

    let on = consolidator(true).consolidate_at(results(), TS.to_string());
    let image = on.metadata.child("image").unwrap();
    let texts: Vec<&str> = image.children.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["JPEG", "JFIF"]);
    assert!(image
        .children
        .iter()
        .all(|e| e.attr("status") == Some("CONFLICT")));
}

#[test]
fn test_linebreak_never_conflicts() {
    let text = |lb: &str| format!("<fits><metadata><text><linebreak>{lb}</linebreak></text></metadata></fits>");
    let results = vec![
        Some(metadata_only("Jhove", &text("LF"))),
        Some(metadata_only("file utility", &text("CRLF"))),
    ];
    let output = consolidator(true).consolidate_at(results, TS.to_string());
    let group = output.metadata.child("text").unwrap();

    assert_eq!(group.children.len(), 1);
    assert_eq!(group.children[0].text, "LF");
    assert_eq!(group.children[0].attr("status"), None);

    let only_crlf = vec![Some(metadata_only("file utility", &text("CRLF")))];
    let output = consolidator(true).consolidate_at(only_crlf, TS.to_string());
    assert_eq!(output.metadata.child("text").unwrap().children[0].text, "CR/LF");
}

#[test]
fn test_partial_fallback_preferred_over_unknown() {
    let results = vec![
        Some(identifier("file utility", &[("Unknown Binary", "application/octet-stream")])),
        Some(identifier("Droid", &[("Broadcast WAVE", "application/octet-stream")])),
    ];
    let output = consolidator(true).consolidate_at(results, TS.to_string());

    assert_eq!(output.identification.status, Status::Partial);
    assert_eq!(output.identification.identities.len(), 1);
    assert_eq!(output.identification.identities[0].format, "Broadcast WAVE");
    assert_eq!(output.identification.identities[0].reporting_tools[0].name, "Droid");
}

#[test]
fn test_unknown_fallback() {
    let results = vec![
        None,
        Some(identifier("file utility", &[("Unknown Binary", "application/octet-stream")])),
    ];
    let output = consolidator(true).consolidate_at(results, TS.to_string());
    assert_eq!(output.identification.status, Status::Unknown);
    assert_eq!(output.identification.identities[0].format, "Unknown Binary");
}

#[test]
fn test_empty_values_elided_except_track() {
    let results = vec![Some(metadata_only(
        "MediaInfo",
        "<fits><metadata><video><track/><duration></duration><frameRate>25</frameRate></video></metadata></fits>",
    ))];
    let output = consolidator(true).consolidate_at(results, TS.to_string());
    let names: Vec<&str> = output
        .metadata
        .child("video")
        .unwrap()
        .children
        .iter()
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(names, vec!["track", "frameRate"]);
}

#[test]
fn test_full_document_shape() {
    let manifest = r#"{
        "tools": [
            { "name": "Droid", "version": "6.4",
              "identities": [{ "format": "Portable Document Format", "mimetype": "application/pdf",
                               "version": "1.4",
                               "external_identifiers": [{"type": "puid", "value": "fmt/18"}] }] },
            { "name": "Jhove", "version": "1.26",
              "identities": [{ "format": "Portable Document Format", "mimetype": "application/pdf",
                               "version": "1.4" }],
              "fragment": "<fits><fileinfo><size>2048</size></fileinfo><filestatus><valid>true</valid><well-formed>true</well-formed></filestatus><metadata><document><pageCount>3</pageCount></document></metadata></fits>",
              "raw_output": "<jhove><repInfo/></jhove>" },
            null
        ]
    }"#;
    let results = parse_manifest(manifest, None).unwrap();

    let mut config = ConsolidationConfig::default();
    config.display_tool_output = true;
    let c = Consolidator::new(Arc::new(FormatTree::load_embedded().unwrap()), config);
    let output = c.consolidate_at(results, TS.to_string());

    // Two tools agree on one identity
    assert_eq!(output.identification.status, Status::None);
    let xml = output.to_xml().unwrap();
    let root: Element = parse_str(&xml).unwrap();

    assert_eq!(root.name, "fits");
    assert_eq!(root.attr("timestamp"), Some(TS));
    let sections: Vec<&str> = root.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        sections,
        vec!["identification", "fileinfo", "filestatus", "metadata", "toolOutput"]
    );

    let identity = root.children[0].child("identity").unwrap();
    assert_eq!(identity.attr("toolname"), Some("Droid"));
    assert_eq!(identity.children_named("tool").count(), 2);
    assert_eq!(identity.children_named("version").count(), 1);
    assert_eq!(identity.child("externalIdentifier").unwrap().text, "fmt/18");

    let filestatus = &root.children[2];
    assert_eq!(filestatus.children.len(), 2);
    assert!(filestatus
        .children
        .iter()
        .all(|e| e.attr("status") == Some("SINGLE_RESULT")));

    let tool_output = &root.children[4];
    assert_eq!(tool_output.children.len(), 1);
    assert_eq!(tool_output.children[0].attr("name"), Some("Jhove"));
    assert_eq!(tool_output.children[0].children[0].name, "jhove");
}
