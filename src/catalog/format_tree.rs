use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::core::types::Specificity;
use crate::parsing::xml::parse_str;
use crate::utils::normalize::{eq_ignore_case, NormalizedKey};
use crate::xml::{Element, XmlError};

/// Element name of hierarchy nodes
pub const FORMAT_NODE: &str = "format";
/// Attribute carrying a node's format name
pub const FORMAT_ATTR: &str = "format";
const ROOT_NODE: &str = "formatTree";

#[derive(Error, Debug)]
pub enum FormatTreeError {
    #[error("Failed to read format tree: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse format tree: {0}")]
    ParseError(#[from] XmlError),

    #[error("Format tree has no formats")]
    Empty,

    #[error("Format node under '{parent}' has no 'format' attribute")]
    MissingName { parent: String },

    #[error("Unexpected element <{0}> in format tree")]
    UnexpectedElement(String),
}

#[derive(Debug)]
struct FormatNode {
    name: String,
    key: NormalizedKey,
    children: Vec<usize>,
}

/// Static generic-to-specific hierarchy of format names.
///
/// Built once and never mutated, so a single instance can be shared by
/// reference across any number of concurrent consolidation passes.
/// The same name may appear under several parents; lookups resolve a name to
/// its first occurrence in document order, while containment checks match
/// any descendant carrying the name.
#[derive(Debug)]
pub struct FormatTree {
    nodes: Vec<FormatNode>,
    roots: Vec<usize>,
    first_by_key: HashMap<NormalizedKey, usize>,
}

/// Nested, serializable view of the hierarchy
#[derive(Debug, Clone, Serialize)]
pub struct FormatTreeNode {
    pub format: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FormatTreeNode>,
}

impl FormatTree {
    /// Load the hierarchy compiled into the binary
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded hierarchy is malformed.
    pub fn load_embedded() -> Result<Self, FormatTreeError> {
        // Validated at compile time by build.rs
        const EMBEDDED_TREE: &str = include_str!("../../catalogs/format_tree.xml");
        Self::from_xml(EMBEDDED_TREE)
    }

    /// Load the hierarchy from an XML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid hierarchy.
    pub fn load_from_file(path: &Path) -> Result<Self, FormatTreeError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_xml(&content)
    }

    /// Parse the hierarchy from XML text
    ///
    /// # Errors
    ///
    /// Returns an error if the XML is malformed, a node lacks a name, or the
    /// tree holds no formats.
    pub fn from_xml(xml: &str) -> Result<Self, FormatTreeError> {
        let root = parse_str(xml)?;
        Self::from_element(&root)
    }

    /// Build from a parsed root element whose children are `format` nodes
    ///
    /// # Errors
    ///
    /// Returns an error if a node is not a `format` element, lacks a name,
    /// or the tree holds no formats.
    pub fn from_element(root: &Element) -> Result<Self, FormatTreeError> {
        let mut tree = Self {
            nodes: Vec::new(),
            roots: Vec::new(),
            first_by_key: HashMap::new(),
        };

        for child in &root.children {
            let id = tree.add_node(child, &root.name)?;
            tree.roots.push(id);
        }

        if tree.nodes.is_empty() {
            return Err(FormatTreeError::Empty);
        }
        Ok(tree)
    }

    fn add_node(&mut self, element: &Element, parent: &str) -> Result<usize, FormatTreeError> {
        if element.name != FORMAT_NODE {
            return Err(FormatTreeError::UnexpectedElement(element.name.clone()));
        }
        let name = element
            .attr(FORMAT_ATTR)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| FormatTreeError::MissingName {
                parent: parent.to_string(),
            })?;

        let id = self.nodes.len();
        let key = NormalizedKey::new(name);
        self.first_by_key.entry(key.clone()).or_insert(id);
        self.nodes.push(FormatNode {
            name: name.to_string(),
            key,
            children: Vec::new(),
        });

        for child in &element.children {
            let child_id = self.add_node(child, name)?;
            self.nodes[id].children.push(child_id);
        }
        Ok(id)
    }

    /// Number of nodes, counting repeated names once per occurrence
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Number of distinct format names
    #[must_use]
    pub fn format_count(&self) -> usize {
        self.first_by_key.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn contains(&self, format: &str) -> bool {
        self.first_by_key.contains_key(&NormalizedKey::new(format))
    }

    /// Relation of format `a` to format `b`.
    ///
    /// Names are compared ignoring case. Equal names, or a name absent from
    /// the hierarchy, yield [`Specificity::Unrelated`].
    #[must_use]
    pub fn specificity(&self, a: &str, b: &str) -> Specificity {
        if eq_ignore_case(a, b) {
            return Specificity::Unrelated;
        }

        let a_key = NormalizedKey::new(a);
        let b_key = NormalizedKey::new(b);
        let (Some(&a_node), Some(&b_node)) =
            (self.first_by_key.get(&a_key), self.first_by_key.get(&b_key))
        else {
            return Specificity::Unrelated;
        };

        if self.subtree_contains(a_node, &b_key) {
            Specificity::BMoreSpecific
        } else if self.subtree_contains(b_node, &a_key) {
            Specificity::AMoreSpecific
        } else {
            Specificity::Unrelated
        }
    }

    /// Whether any strict descendant of `node` carries `key`
    fn subtree_contains(&self, node: usize, key: &NormalizedKey) -> bool {
        let mut pending: Vec<usize> = self.nodes[node].children.clone();
        while let Some(id) = pending.pop() {
            let current = &self.nodes[id];
            if &current.key == key {
                return true;
            }
            pending.extend(current.children.iter().copied());
        }
        false
    }

    /// Depth-first listing of (depth, name) in document order
    #[must_use]
    pub fn walk(&self) -> Vec<(usize, &str)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for &root in &self.roots {
            self.walk_from(root, 0, &mut out);
        }
        out
    }

    fn walk_from<'a>(&'a self, id: usize, depth: usize, out: &mut Vec<(usize, &'a str)>) {
        let node = &self.nodes[id];
        out.push((depth, node.name.as_str()));
        for &child in &node.children {
            self.walk_from(child, depth + 1, out);
        }
    }

    /// Nested view for JSON export
    #[must_use]
    pub fn to_nodes(&self) -> Vec<FormatTreeNode> {
        self.roots.iter().map(|&r| self.view(r)).collect()
    }

    fn view(&self, id: usize) -> FormatTreeNode {
        let node = &self.nodes[id];
        FormatTreeNode {
            format: node.name.clone(),
            children: node.children.iter().map(|&c| self.view(c)).collect(),
        }
    }

    /// The hierarchy as an XML element tree, loadable by [`FormatTree::from_element`]
    #[must_use]
    pub fn to_element(&self) -> Element {
        let mut root = Element::new(ROOT_NODE);
        for &id in &self.roots {
            root.push(self.node_element(id));
        }
        root
    }

    fn node_element(&self, id: usize) -> Element {
        let node = &self.nodes[id];
        let mut element = Element::new(FORMAT_NODE).with_attr(FORMAT_ATTR, &node.name);
        for &child in &node.children {
            element.push(self.node_element(child));
        }
        element
    }
}
