use serde::{Deserialize, Serialize};

/// A single name/value attribute on an [`Element`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// An owned XML element with ordered attributes, direct text and children.
///
/// Mixed content is not modelled: all direct text of an element is kept as
/// one trimmed string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Set an attribute, replacing any existing value with the same name
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(existing) = self.attributes.iter_mut().find(|a| a.name == name) {
            existing.value = value;
        } else {
            self.attributes.push(Attribute { name, value });
        }
    }

    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    /// First direct child with the given name
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All direct children with the given name, in document order
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Get the first direct child with `name`, appending an empty one if absent.
    pub fn child_or_insert(&mut self, name: &str) -> &mut Element {
        let index = match self.children.iter().position(|c| c.name == name) {
            Some(i) => i,
            None => {
                self.children.push(Element::new(name));
                self.children.len() - 1
            }
        };
        &mut self.children[index]
    }

    /// An element with no children and no text carries no value
    #[must_use]
    pub fn is_empty_value(&self) -> bool {
        self.children.is_empty() && self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_attr_replaces() {
        let mut e = Element::new("size").with_attr("toolname", "a");
        e.set_attr("toolname", "b");
        e.set_attr("toolversion", "1.0");
        assert_eq!(e.attributes.len(), 2);
        assert_eq!(e.attr("toolname"), Some("b"));
        assert_eq!(e.attr("toolversion"), Some("1.0"));
        assert_eq!(e.attr("status"), None);
    }

    #[test]
    fn test_child_or_insert_reuses_existing() {
        let mut metadata = Element::new("metadata");
        metadata.child_or_insert("image").push(Element::new("imageWidth"));
        metadata.child_or_insert("image").push(Element::new("imageHeight"));
        metadata.child_or_insert("text");

        assert_eq!(metadata.children.len(), 2);
        assert_eq!(metadata.children[0].children.len(), 2);
        assert_eq!(metadata.children[1].name, "text");
    }

    #[test]
    fn test_is_empty_value() {
        assert!(Element::new("md5checksum").is_empty_value());
        assert!(!Element::new("size").with_text("12").is_empty_value());
        assert!(!Element::new("track")
            .with_child(Element::new("codec"))
            .is_empty_value());
    }
}
