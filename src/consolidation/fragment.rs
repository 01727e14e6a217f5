//! Element-by-element merging of the fileinfo, filestatus and metadata
//! sections of tool fragments.
//!
//! Each round takes the first element still present in any fragment, moves
//! every same-named element of that section out of every fragment, and
//! reconciles the collected values. Rounds repeat until the section is empty
//! in every fragment, so each source element is considered exactly once.

use tracing::debug;

use crate::core::tool::ToolInfo;
use crate::core::types::{Agreement, Status};
use crate::utils::normalize::eq_ignore_case;
use crate::utils::validation::{normalize_linebreak, values_agree, LINEBREAK_ELEMENT};
use crate::xml::{Document, Element, NodeId};

/// Elements kept even when they carry no value
pub const TRACK_ELEMENT: &str = "track";

/// Elements that legitimately carry several values; disagreement is not a
/// conflict
pub const REPEATABLE_ELEMENTS: &[&str] = &[LINEBREAK_ELEMENT];

pub const TOOLNAME_ATTR: &str = "toolname";
pub const TOOLVERSION_ATTR: &str = "toolversion";
pub const STATUS_ATTR: &str = "status";

/// Mergeable sections of a fragment, in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    FileInfo,
    FileStatus,
    /// Children are grouping nodes named by sub-type (image, text, audio, ...)
    Metadata,
}

impl Section {
    pub const ALL: [Section; 3] = [Self::FileInfo, Self::FileStatus, Self::Metadata];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::FileInfo => "fileinfo",
            Self::FileStatus => "filestatus",
            Self::Metadata => "metadata",
        }
    }

    #[must_use]
    pub fn is_grouped(self) -> bool {
        matches!(self, Self::Metadata)
    }
}

/// One kept tool's fragment, consumed as its elements are merged
#[derive(Debug)]
pub struct FragmentSource {
    pub tool: ToolInfo,
    pub doc: Document,
}

impl FragmentSource {
    #[must_use]
    pub fn new(tool: ToolInfo, doc: Document) -> Self {
        Self { tool, doc }
    }

    fn section_node(&self, section: Section) -> Option<NodeId> {
        let root = self.doc.root()?;
        self.doc.child_named(root, section.name())
    }

    /// First element called `name` in `section`, looking inside every group
    /// called `group` for grouped sections
    fn find(&self, section: Section, group: Option<&str>, name: &str) -> Option<NodeId> {
        let section_node = self.section_node(section)?;
        match group {
            Some(group) => self
                .doc
                .children(section_node)
                .iter()
                .filter(|&&g| self.doc.name(g) == Some(group))
                .find_map(|&g| self.doc.child_named(g, name)),
            None => self.doc.child_named(section_node, name),
        }
    }

    /// First element left in `section`, with its group for grouped sections
    fn first_remaining(&self, section: Section) -> Option<Sample> {
        let container = self.section_node(section)?;
        if section.is_grouped() {
            // Empty groups are skipped; they have nothing left to merge
            self.doc.children(container).iter().find_map(|&group| {
                let first = self.doc.first_child(group)?;
                Some(Sample {
                    name: self.doc.name(first)?.to_string(),
                    group: Some(self.doc.name(group)?.to_string()),
                })
            })
        } else {
            let first = self.doc.first_child(container)?;
            Some(Sample {
                name: self.doc.name(first)?.to_string(),
                group: None,
            })
        }
    }

    /// Move the first element called `sample.name` out of its container,
    /// crediting this source's tool on it
    fn take(&mut self, section: Section, sample: &Sample) -> Option<Element> {
        let node = self.find(section, sample.group.as_deref(), &sample.name)?;
        let mut element = self.doc.detach(node)?;

        element.set_attr(TOOLNAME_ATTR, &self.tool.name);
        element.set_attr(TOOLVERSION_ATTR, &self.tool.version);
        if element.name == LINEBREAK_ELEMENT {
            element.text = normalize_linebreak(&element.text);
        }
        Some(element)
    }
}

/// Name (and metadata group) of the element merged in one round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub name: String,
    pub group: Option<String>,
}

/// Reconciles same-named elements across fragments
#[derive(Debug, Clone, Copy)]
pub struct FragmentMerger {
    report_conflicts: bool,
}

impl FragmentMerger {
    #[must_use]
    pub fn new(report_conflicts: bool) -> Self {
        Self { report_conflicts }
    }

    /// Next element to merge: the first remaining child of the section in the
    /// first source that has one
    #[must_use]
    pub fn next_sample(sources: &[FragmentSource], section: Section) -> Option<Sample> {
        sources.iter().find_map(|s| s.first_remaining(section))
    }

    /// Collect and reconcile every element matching `sample` across sources.
    ///
    /// Matching elements are moved out of the sources. Valueless elements are
    /// dropped (except `track`). What remains is reduced to:
    /// - a lone element, tagged `SINGLE_RESULT`
    /// - the first element, when all values agree
    /// - every distinct value tagged `CONFLICT`, when conflicts are reported
    ///   and the element is not repeatable
    /// - otherwise the first element alone
    pub fn merge(
        &self,
        sources: &mut [FragmentSource],
        section: Section,
        sample: &Sample,
    ) -> Vec<Element> {
        let collected: Vec<Element> = sources
            .iter_mut()
            .filter_map(|s| s.take(section, sample))
            .collect();

        let mut elements = remove_unknowns(collected);
        if elements.is_empty() {
            return elements;
        }

        match test_equality(&elements) {
            Agreement::SingleResult => {
                set_status(&mut elements[0], Status::SingleResult);
                elements
            }
            Agreement::AllAgree => {
                elements.truncate(1);
                elements
            }
            Agreement::Conflict if self.report_conflicts && !is_repeatable(&sample.name) => {
                debug!("conflicting values for {}", sample.name);
                for element in &mut elements {
                    set_status(element, Status::Conflict);
                }
                collapse_duplicates(elements)
            }
            Agreement::Conflict => {
                elements.truncate(1);
                elements
            }
        }
    }

    /// Merge a whole section out of `sources` into a new section element.
    ///
    /// For metadata, merged elements are placed under a grouping node named
    /// after their sub-type, created the first time the sub-type is seen.
    pub fn consolidate_section(&self, sources: &mut [FragmentSource], section: Section) -> Element {
        let mut out = Element::new(section.name());

        while let Some(sample) = Self::next_sample(sources, section) {
            let merged = self.merge(sources, section, &sample);
            let target = match &sample.group {
                Some(group) => out.child_or_insert(group),
                None => &mut out,
            };
            target.children.extend(merged);
        }

        out
    }
}

fn set_status(element: &mut Element, status: Status) {
    if let Some(value) = status.as_attr() {
        element.set_attr(STATUS_ATTR, value);
    }
}

#[must_use]
pub fn is_repeatable(name: &str) -> bool {
    REPEATABLE_ELEMENTS.contains(&name)
}

/// Drop elements that carry no value, unless they are `track` elements
#[must_use]
pub fn remove_unknowns(elements: Vec<Element>) -> Vec<Element> {
    elements
        .into_iter()
        .filter(|e| e.name == TRACK_ELEMENT || !e.is_empty_value())
        .collect()
}

/// Compare the values of a non-empty list of same-named elements
#[must_use]
pub fn test_equality(elements: &[Element]) -> Agreement {
    match elements {
        [] | [_] => Agreement::SingleResult,
        [first, rest @ ..] => {
            if rest.iter().all(|e| values_agree(&first.text, &e.text)) {
                Agreement::AllAgree
            } else {
                Agreement::Conflict
            }
        }
    }
}

/// Keep only the first element of each distinct value (case-insensitive)
#[must_use]
pub fn collapse_duplicates(elements: Vec<Element>) -> Vec<Element> {
    let mut kept: Vec<Element> = Vec::with_capacity(elements.len());
    for element in elements {
        if !kept.iter().any(|k| eq_ignore_case(&k.text, &element.text)) {
            kept.push(element);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str, text: &str) -> Element {
        Element::new(name).with_text(text)
    }

    fn source(tool: &str, fileinfo: Vec<Element>, metadata: Vec<Element>) -> FragmentSource {
        let mut fi = Element::new("fileinfo");
        fi.children = fileinfo;
        let mut md = Element::new("metadata");
        md.children = metadata;
        let root = Element::new("fits")
            .with_child(fi)
            .with_child(Element::new("filestatus"))
            .with_child(md);
        FragmentSource::new(ToolInfo::new(tool, "1.0"), Document::from_element(root))
    }

    fn group(name: &str, children: Vec<Element>) -> Element {
        let mut g = Element::new(name);
        g.children = children;
        g
    }

    #[test]
    fn test_single_source_tagged_single_result() {
        let mut sources = vec![source("Exiftool", vec![leaf("size", "1024")], vec![])];
        let out = FragmentMerger::new(true).consolidate_section(&mut sources, Section::FileInfo);

        assert_eq!(out.children.len(), 1);
        let size = &out.children[0];
        assert_eq!(size.attr("status"), Some("SINGLE_RESULT"));
        assert_eq!(size.attr("toolname"), Some("Exiftool"));
        assert_eq!(size.attr("toolversion"), Some("1.0"));
    }

    #[test]
    fn test_numeric_agreement_keeps_first() {
        let mut sources = vec![
            source("Exiftool", vec![leaf("xSamplingFrequency", "300")], vec![]),
            source("Jhove", vec![leaf("xSamplingFrequency", "300.0")], vec![]),
        ];
        let out = FragmentMerger::new(true).consolidate_section(&mut sources, Section::FileInfo);

        assert_eq!(out.children.len(), 1);
        assert_eq!(out.children[0].text, "300");
        assert_eq!(out.children[0].attr("toolname"), Some("Exiftool"));
        assert_eq!(out.children[0].attr("status"), None);
    }

    #[test]
    fn test_conflict_collapses_duplicate_values() {
        let mut sources = vec![
            source("A", vec![leaf("creatingApplicationName", "Word")], vec![]),
            source("B", vec![leaf("creatingApplicationName", "word")], vec![]),
            source("C", vec![leaf("creatingApplicationName", "LibreOffice")], vec![]),
        ];
        let out = FragmentMerger::new(true).consolidate_section(&mut sources, Section::FileInfo);

        let texts: Vec<&str> = out.children.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["Word", "LibreOffice"]);
        assert!(out.children.iter().all(|e| e.attr("status") == Some("CONFLICT")));
        assert_eq!(out.children[0].attr("toolname"), Some("A"));
    }

    #[test]
    fn test_conflict_unreported_keeps_first() {
        let mut sources = vec![
            source("A", vec![leaf("size", "10")], vec![]),
            source("B", vec![leaf("size", "11")], vec![]),
        ];
        let out = FragmentMerger::new(false).consolidate_section(&mut sources, Section::FileInfo);
        assert_eq!(out.children.len(), 1);
        assert_eq!(out.children[0].text, "10");
        assert_eq!(out.children[0].attr("status"), None);
    }

    #[test]
    fn test_linebreak_is_repeatable_and_normalized() {
        let text = |lb: &str| vec![group("text", vec![leaf("linebreak", lb)])];
        let mut sources = vec![
            source("A", vec![], text("CRLF")),
            source("B", vec![], text("LF")),
        ];
        let out = FragmentMerger::new(true).consolidate_section(&mut sources, Section::Metadata);

        let group = out.child("text").unwrap();
        assert_eq!(group.children.len(), 1);
        assert_eq!(group.children[0].text, "CR/LF");
        assert_eq!(group.children[0].attr("status"), None);
    }

    #[test]
    fn test_empty_elements_dropped_except_track() {
        let mut sources = vec![source(
            "MediaInfo",
            vec![],
            vec![group(
                "video",
                vec![Element::new("duration"), Element::new("track"), leaf("bitRate", "128")],
            )],
        )];
        let out = FragmentMerger::new(true).consolidate_section(&mut sources, Section::Metadata);

        let names: Vec<&str> = out
            .child("video")
            .unwrap()
            .children
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["track", "bitRate"]);
    }

    #[test]
    fn test_metadata_groups_in_first_seen_order() {
        let mut sources = vec![
            source("A", vec![], vec![group("image", vec![leaf("imageWidth", "640")])]),
            source(
                "B",
                vec![],
                vec![
                    group("document", vec![leaf("pageCount", "3")]),
                    group("image", vec![leaf("imageWidth", "640"), leaf("imageHeight", "480")]),
                ],
            ),
        ];
        let out = FragmentMerger::new(true).consolidate_section(&mut sources, Section::Metadata);

        let groups: Vec<&str> = out.children.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(groups, vec!["image", "document"]);

        let image = out.child("image").unwrap();
        let names: Vec<&str> = image.children.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["imageWidth", "imageHeight"]);
        assert_eq!(image.children[0].attr("status"), None);
        assert_eq!(image.children[1].attr("status"), Some("SINGLE_RESULT"));
    }

    #[test]
    fn test_sources_are_drained() {
        let mut sources = vec![
            source("A", vec![leaf("size", "1"), leaf("md5checksum", "x")], vec![]),
            source("B", vec![leaf("md5checksum", "x")], vec![]),
        ];
        let merger = FragmentMerger::new(true);
        merger.consolidate_section(&mut sources, Section::FileInfo);
        assert!(FragmentMerger::next_sample(&sources, Section::FileInfo).is_none());
    }

    #[test]
    fn test_extraction_scoped_to_section() {
        let mut sources = vec![source(
            "A",
            vec![leaf("size", "1")],
            vec![group("image", vec![leaf("size", "2")])],
        )];
        let merger = FragmentMerger::new(true);
        let fileinfo = merger.consolidate_section(&mut sources, Section::FileInfo);
        assert_eq!(fileinfo.children.len(), 1);
        assert_eq!(fileinfo.children[0].text, "1");

        let metadata = merger.consolidate_section(&mut sources, Section::Metadata);
        assert_eq!(metadata.child("image").unwrap().children[0].text, "2");
    }

    #[test]
    fn test_repeated_group_is_drained() {
        let mut sources = vec![source(
            "A",
            vec![],
            vec![
                group("image", vec![leaf("imageWidth", "640")]),
                group("image", vec![leaf("imageHeight", "480")]),
            ],
        )];
        let out = FragmentMerger::new(true).consolidate_section(&mut sources, Section::Metadata);

        assert_eq!(out.children.len(), 1);
        let names: Vec<&str> = out.children[0]
            .children
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["imageWidth", "imageHeight"]);
    }

    #[test]
    fn test_all_empty_yields_nothing() {
        let mut sources = vec![
            source("A", vec![Element::new("size")], vec![]),
            source("B", vec![Element::new("size")], vec![]),
        ];
        let out = FragmentMerger::new(true).consolidate_section(&mut sources, Section::FileInfo);
        assert!(out.children.is_empty());
    }

    #[test]
    fn test_equality_helpers() {
        assert_eq!(test_equality(&[leaf("a", "x")]), Agreement::SingleResult);
        assert_eq!(test_equality(&[leaf("a", "X"), leaf("a", "x")]), Agreement::AllAgree);
        assert_eq!(test_equality(&[leaf("a", "1"), leaf("a", "2")]), Agreement::Conflict);
        assert!(is_repeatable("linebreak"));
        assert!(!is_repeatable("size"));
    }
}
