//! Document tree to XML
//!
//! Writes the tree back exactly as held: existing whitespace text nodes
//! carry the original indentation, so an untouched document round-trips
//! to equivalent markup. Elements without children are self-closed.

use std::fmt::Write as _;

use super::tree::{Document, Element, Node};

fn escape(text: &str, out: &mut String, in_attribute: bool) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            '\n' if in_attribute => out.push_str("&#10;"),
            '\t' if in_attribute => out.push_str("&#9;"),
            '\r' => out.push_str("&#13;"),
            _ => out.push(c),
        }
    }
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Element(element) => write_element(element, out),
        Node::Text(text) => escape(text, out, false),
        Node::Comment(text) => {
            let _ = write!(out, "<!--{}-->", text);
        }
        Node::ProcessingInstruction { target, value } => match value {
            Some(value) => {
                let _ = write!(out, "<?{} {}?>", target, value);
            }
            None => {
                let _ = write!(out, "<?{}?>", target);
            }
        },
    }
}

fn write_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.name);
    for (name, value) in &element.attributes {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        escape(value, out, true);
        out.push('"');
    }

    if element.children.is_empty() {
        out.push_str(" />");
        return;
    }

    out.push('>');
    for child in &element.children {
        write_node(child, out);
    }
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}

impl Document {
    /// Serialize to XML text, ending with a newline
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        if let Some(declaration) = &self.declaration {
            let _ = writeln!(out, "<?{}?>", declaration);
        }
        for node in &self.prolog {
            write_node(node, &mut out);
            out.push('\n');
        }
        write_element(&self.root, &mut out);
        out.push('\n');
        for node in &self.epilog {
            write_node(node, &mut out);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_jetbrains_style() {
        let source = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<project version=\"4\">\n  \
<component name=\"AndroidGradleBuildConfiguration\">\n    \
<option name=\"COMMAND_LINE_OPTIONS\" value=\"-Pdart-defines=QT0x\" />\n  \
</component>\n\
</project>\n";

        let doc = Document::parse(source).unwrap();
        assert_eq!(doc.to_xml(), source);
    }

    #[test]
    fn test_escaping() {
        let root = Element::new("option").with_attribute("value", "a<b & \"c\"\nd");
        let mut doc = Document::new(root);
        doc.root.children.push(Node::Text("x > y".to_string()));

        let xml = doc.to_xml();
        assert!(xml.contains(r#"value="a&lt;b &amp; &quot;c&quot;&#10;d""#));
        assert!(xml.contains("x &gt; y</option>"));

        let reparsed = Document::parse(&xml).unwrap();
        assert_eq!(reparsed.root.attribute("value"), Some("a<b & \"c\"\nd"));
    }

    #[test]
    fn test_empty_element_self_closes() {
        let doc = Document::new(Element::new("component").with_attribute("name", "X"));
        assert_eq!(
            doc.to_xml(),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<component name=\"X\" />\n"
        );
    }

    #[test]
    fn test_comments_and_instructions() {
        let mut doc = Document::new(Element::new("root"));
        doc.declaration = None;
        doc.prolog.push(Node::Comment(" c ".to_string()));
        doc.epilog.push(Node::ProcessingInstruction {
            target: "pi".to_string(),
            value: Some("data".to_string()),
        });

        assert_eq!(doc.to_xml(), "<!-- c -->\n<root />\n<?pi data?>\n");
    }

    #[test]
    fn test_carriage_return_survives_reparse() {
        let doc = Document::parse("<a value=\"x&#13;y\">x&#13;y</a>").unwrap();
        assert_eq!(doc.root.attribute("value"), Some("x\ry"));
        assert_eq!(doc.root.children, vec![Node::Text("x\ry".to_string())]);

        let xml = doc.to_xml();
        assert!(xml.contains(r#"value="x&#13;y">x&#13;y</a>"#));

        let reparsed = Document::parse(&xml).unwrap();
        assert_eq!(reparsed.root, doc.root);
    }
}
