//! Owned document tree
//!
//! A small mutable element tree. Attribute order and every non-element
//! node are kept so a document written back differs only where patched.

/// A node inside an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
    ProcessingInstruction { target: String, value: Option<String> },
}

/// An element with ordered attributes and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Qualified name (`prefix:local` when namespaced)
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder form of [`Element::set_attribute`]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder form of [`Element::append_child`]
    pub fn with_child(mut self, child: Element) -> Self {
        self.append_child(child);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, keeping its position if it already exists
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Append an element as the last child; returns its index in `children`
    pub fn append_child(&mut self, child: Element) -> usize {
        self.children.push(Node::Element(child));
        self.children.len() - 1
    }

    /// Append an element as the last child on its own line.
    ///
    /// `indent` is written before the child and `closing` before the end
    /// tag. An existing trailing whitespace node stays the closing text.
    /// Returns the child's index in `children`.
    pub fn append_child_indented(&mut self, child: Element, indent: &str, closing: &str) -> usize {
        let trailing = matches!(
            self.children.last(),
            Some(Node::Text(text)) if text.chars().all(char::is_whitespace)
        );
        if trailing {
            let at = self.children.len() - 1;
            self.children.insert(at, Node::Text(indent.to_string()));
            self.children.insert(at + 1, Node::Element(child));
            at + 1
        } else {
            self.children.push(Node::Text(indent.to_string()));
            self.children.push(Node::Element(child));
            self.children.push(Node::Text(closing.to_string()));
            self.children.len() - 2
        }
    }

    /// Child elements, skipping text and comments
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Position in `children` of the first child element matching `pred`
    pub fn position_of(&self, pred: impl Fn(&Element) -> bool) -> Option<usize> {
        self.children.iter().position(|n| match n {
            Node::Element(e) => pred(e),
            _ => false,
        })
    }

    pub fn element_at_mut(&mut self, index: usize) -> Option<&mut Element> {
        match self.children.get_mut(index) {
            Some(Node::Element(e)) => Some(e),
            _ => None,
        }
    }
}

/// A whole document: optional XML declaration, the root element, and any
/// comments or processing instructions around it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Text of the `<?xml ...?>` declaration, without the delimiters
    pub declaration: Option<String>,
    pub prolog: Vec<Node>,
    pub root: Element,
    pub epilog: Vec<Node>,
}

impl Document {
    /// A document with a standard declaration and the given root
    pub fn new(root: Element) -> Self {
        Self {
            declaration: Some(r#"xml version="1.0" encoding="UTF-8""#.to_string()),
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
        }
    }
}
