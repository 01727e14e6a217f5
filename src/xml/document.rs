use crate::xml::element::{Attribute, Element};

/// Handle to a node inside one [`Document`].
///
/// A handle is only meaningful for the document that issued it, and becomes
/// stale once its node has been detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
struct Node {
    name: String,
    attributes: Vec<Attribute>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed tree for one tool's normalized fragment output.
///
/// Nodes can only leave the arena by [`Document::detach`], which hands back
/// an owned [`Element`] and empties every slot the subtree occupied. A
/// detached node can never be observed again through this document.
#[derive(Debug, Default)]
pub struct Document {
    nodes: Vec<Option<Node>>,
    root: Option<NodeId>,
}

impl Document {
    /// Build an arena from an owned element tree.
    #[must_use]
    pub fn from_element(root: Element) -> Self {
        let mut doc = Self::default();
        let id = doc.insert(root, None);
        doc.root = Some(id);
        doc
    }

    fn insert(&mut self, element: Element, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(Node {
            name: element.name,
            attributes: element.attributes,
            text: element.text,
            parent,
            children: Vec::with_capacity(element.children.len()),
        }));

        for child in element.children {
            let child_id = self.insert(child, Some(id));
            if let Some(node) = self.node_mut(id) {
                node.children.push(child_id);
            }
        }
        id
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Root node, or `None` once the root has been detached
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    #[must_use]
    pub fn is_live(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    #[must_use]
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.node(id).map(|n| n.name.as_str())
    }

    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.node(id).map(|n| n.text.as_str())
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Live children of `id` in document order; empty for a stale handle
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[][..], |n| n.children.as_slice())
    }

    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    /// First direct child of `parent` whose name is exactly `name`
    #[must_use]
    pub fn child_named(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&c| self.name(c) == Some(name))
    }

    /// Move the subtree rooted at `id` out of the document.
    ///
    /// Returns `None` if `id` is already stale. Afterwards `id` and all of its
    /// descendants are stale, and the node no longer appears among its
    /// parent's children.
    pub fn detach(&mut self, id: NodeId) -> Option<Element> {
        let parent = self.node(id)?.parent;

        match parent {
            Some(parent_id) => {
                if let Some(parent_node) = self.node_mut(parent_id) {
                    parent_node.children.retain(|&c| c != id);
                }
            }
            None => {
                if self.root == Some(id) {
                    self.root = None;
                }
            }
        }

        self.take(id)
    }

    fn take(&mut self, id: NodeId) -> Option<Element> {
        let node = self.nodes.get_mut(id.0)?.take()?;
        let children = node
            .children
            .into_iter()
            .filter_map(|child| self.take(child))
            .collect();

        Some(Element {
            name: node.name,
            attributes: node.attributes,
            text: node.text,
            children,
        })
    }

    /// Copy the live tree back out as an owned element, leaving the arena intact
    #[must_use]
    pub fn to_element(&self) -> Option<Element> {
        self.root.and_then(|r| self.snapshot(r))
    }

    fn snapshot(&self, id: NodeId) -> Option<Element> {
        let node = self.node(id)?;
        Some(Element {
            name: node.name.clone(),
            attributes: node.attributes.clone(),
            text: node.text.clone(),
            children: node
                .children
                .iter()
                .filter_map(|&c| self.snapshot(c))
                .collect(),
        })
    }
}
