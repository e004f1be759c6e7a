//! XML to document tree
//!
//! Parsing is done by `roxmltree` and copied into the owned tree. Text,
//! comments, processing instructions and namespace declarations are kept;
//! CDATA sections become plain text.

use roxmltree::{Node as XmlNode, NodeType};

use super::tree::{Document, Element, Node};

/// The reserved `xml` prefix is always in scope and never declared
const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

fn qualified_name(node: &XmlNode, namespace: Option<&str>, local: &str) -> String {
    match namespace.and_then(|ns| node.lookup_prefix(ns)) {
        Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, local),
        _ => local.to_string(),
    }
}

/// Namespace declarations made on this element (in scope here but not on
/// the parent element)
fn declared_namespaces(node: &XmlNode) -> Vec<(String, String)> {
    let parent = node.parent_element();
    node.namespaces()
        .filter(|ns| ns.uri() != XML_NAMESPACE)
        .filter(|ns| {
            parent.map_or(true, |p| {
                !p.namespaces()
                    .any(|pns| pns.name() == ns.name() && pns.uri() == ns.uri())
            })
        })
        .map(|ns| {
            let name = match ns.name() {
                Some(prefix) => format!("xmlns:{}", prefix),
                None => "xmlns".to_string(),
            };
            (name, ns.uri().to_string())
        })
        .collect()
}

fn convert_element(node: XmlNode) -> Element {
    let mut element = Element::new(qualified_name(
        &node,
        node.tag_name().namespace(),
        node.tag_name().name(),
    ));

    element.attributes = declared_namespaces(&node);
    element.attributes.extend(node.attributes().map(|attr| {
        (
            qualified_name(&node, attr.namespace(), attr.name()),
            attr.value().to_string(),
        )
    }));

    element.children = node.children().filter_map(convert_node).collect();
    element
}

fn convert_node(node: XmlNode) -> Option<Node> {
    match node.node_type() {
        NodeType::Element => Some(Node::Element(convert_element(node))),
        NodeType::Text => node.text().map(|t| Node::Text(t.to_string())),
        NodeType::Comment => node.text().map(|t| Node::Comment(t.to_string())),
        NodeType::PI => node.pi().map(|pi| Node::ProcessingInstruction {
            target: pi.target.to_string(),
            value: pi.value.map(str::to_string),
        }),
        NodeType::Root => None,
    }
}

/// Extract the XML declaration body (`version="1.0" ...`) if present
fn declaration(source: &str) -> Option<String> {
    let rest = source.trim_start_matches('\u{feff}').strip_prefix("<?xml")?;
    if !rest.starts_with(|c: char| c.is_whitespace()) {
        return None;
    }
    let end = rest.find("?>")?;
    Some(format!("xml {}", rest[..end].trim()))
}

impl Document {
    /// Parse XML text into an owned document
    pub fn parse(source: &str) -> Result<Self, roxmltree::Error> {
        let xml = roxmltree::Document::parse(source)?;
        let root = xml.root_element();

        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        let mut seen_root = false;
        for child in xml.root().children() {
            if child == root {
                seen_root = true;
                continue;
            }
            // Whitespace between top-level nodes is not kept
            if child.is_text() {
                continue;
            }
            if let Some(node) = convert_node(child) {
                if seen_root {
                    epilog.push(node);
                } else {
                    prolog.push(node);
                }
            }
        }

        Ok(Self {
            declaration: declaration(source),
            prolog,
            root: convert_element(root),
            epilog,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RUN_CONFIGURATION: &str = r#"<component name="ProjectRunConfigurationManager">
  <configuration default="false" name="main.dart" type="FlutterRunConfigurationType" factoryName="Flutter">
    <option name="additionalArgs" value="--web-port 1" />
    <option name="filePath" value="$PROJECT_DIR$/lib/main.dart" />
    <method v="2" />
  </configuration>
</component>"#;

    #[test]
    fn test_parse_run_configuration() {
        let doc = Document::parse(RUN_CONFIGURATION).unwrap();

        assert_eq!(doc.declaration, None);
        assert_eq!(doc.root.name, "component");
        let configuration = doc.root.elements().next().unwrap();
        assert_eq!(configuration.attribute("name"), Some("main.dart"));
        assert_eq!(configuration.attributes[0].0, "default");

        let options: Vec<_> = configuration.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(options, vec!["option", "option", "method"]);
        assert!(matches!(configuration.children[0], Node::Text(_)));
    }

    #[test]
    fn test_parse_declaration_and_comments() {
        let source = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!-- top -->\n<project version=\"4\"><!-- inner --></project>\n";
        let doc = Document::parse(source).unwrap();

        assert_eq!(
            doc.declaration.as_deref(),
            Some(r#"xml version="1.0" encoding="UTF-8""#)
        );
        assert_eq!(doc.prolog, vec![Node::Comment(" top ".to_string())]);
        assert_eq!(doc.root.children, vec![Node::Comment(" inner ".to_string())]);
        assert!(doc.epilog.is_empty());
    }

    #[test]
    fn test_parse_namespaces() {
        let source = r#"<a:root xmlns:a="urn:a" xmlns="urn:d"><a:child a:attr="1"/><plain/></a:root>"#;
        let doc = Document::parse(source).unwrap();

        assert_eq!(doc.root.name, "a:root");
        assert_eq!(doc.root.attribute("xmlns:a"), Some("urn:a"));
        assert_eq!(doc.root.attribute("xmlns"), Some("urn:d"));

        let child = doc.root.elements().next().unwrap();
        assert_eq!(child.name, "a:child");
        assert_eq!(child.attribute("a:attr"), Some("1"));
        assert!(child.attribute("xmlns:a").is_none());
    }

    #[test]
    fn test_parse_error() {
        assert!(Document::parse("<project>").is_err());
    }
}
