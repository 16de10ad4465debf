//! Owned XML element tree

/// A node below an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
    CData(String),
    Comment(String),
}

/// An element with unescaped attribute values in source order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// First value of attribute `key`
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Replace the value of `key`, or append it when absent
    pub fn set_attribute<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn push_element(&mut self, element: XmlElement) {
        self.children.push(XmlNode::Element(element));
    }

    /// Append text, joining it onto a directly preceding text node
    pub fn push_text(&mut self, text: &str) {
        if let Some(XmlNode::Text(existing)) = self.children.last_mut() {
            existing.push_str(text);
        } else {
            self.children.push(XmlNode::Text(text.to_string()));
        }
    }

    pub fn child_elements(&self) -> impl DoubleEndedIterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Concatenated direct text children
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(text) | XmlNode::CData(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Elements named `name` anywhere in this subtree, in document order, for
    /// which `keep` returns true
    ///
    /// The subtree itself is included. A kept element is not searched any
    /// further, so nested elements of the same name travel with it.
    pub fn select<'a, F>(&'a self, name: &str, mut keep: F) -> Vec<&'a XmlElement>
    where
        F: FnMut(&XmlElement) -> bool,
    {
        let mut selected = Vec::new();
        let mut pending = vec![self];

        while let Some(element) = pending.pop() {
            if element.name == name && keep(element) {
                selected.push(element);
                continue;
            }
            pending.extend(element.child_elements().rev());
        }

        selected
    }

    /// Drop whitespace-only text sitting between child elements
    ///
    /// Elements without element children keep their text as is.
    pub(crate) fn drop_blank_text(&mut self) {
        if self.child_elements().next().is_none() {
            return;
        }
        self.children
            .retain(|node| !matches!(node, XmlNode::Text(text) if text.trim().is_empty()));
    }
}
