//! Idempotent document upsert
//!
//! Locates or creates one addressed element and sets one attribute on it.
//! Each call walks a small state machine:
//!
//! `SeekingParent` -> `SeekingTarget` -> `Found` | `NotFound` -> `Done`
//!
//! Missing links are created and appended as the last child of their
//! parent, indented like the document when it has line breaks. Siblings
//! are never removed or reordered. The selector is checked
//! against the document before anything is touched, so a failed call leaves
//! the document unchanged.

use std::fmt;

use super::tree::{Document, Element, Node};
use crate::error::SettingsError;

/// One link of a selector path: an element name plus an optional
/// `(attribute, value)` pair that identifies it among its siblings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub element: String,
    pub key: Option<(String, String)>,
}

impl Step {
    /// Matches the first child element with this name
    pub fn element(name: impl Into<String>) -> Self {
        Self {
            element: name.into(),
            key: None,
        }
    }

    /// Matches the first child element with this name and attribute value
    pub fn keyed(
        name: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            element: name.into(),
            key: Some((attribute.into(), value.into())),
        }
    }

    fn matches(&self, element: &Element) -> bool {
        element.name == self.element
            && match &self.key {
                Some((attr, value)) => element.attribute(attr) == Some(value.as_str()),
                None => true,
            }
    }

    fn create(&self) -> Element {
        let element = Element::new(self.element.clone());
        match &self.key {
            Some((attr, value)) => element.with_attribute(attr.clone(), value.clone()),
            None => element,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some((attr, value)) => write!(f, "{}[@{}='{}']", self.element, attr, value),
            None => f.write_str(&self.element),
        }
    }
}

/// Addresses one attribute of one element below the document root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub root: String,
    pub steps: Vec<Step>,
    pub attribute: String,
}

impl Selector {
    pub fn new(root: impl Into<String>, steps: Vec<Step>, attribute: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            steps,
            attribute: attribute.into(),
        }
    }

    fn validate(&self, document: &Document) -> Result<(), SettingsError> {
        if self.steps.is_empty() {
            return Err(SettingsError::MalformedSelector(format!(
                "{}: no target element below the root",
                self
            )));
        }
        if self.attribute.is_empty() {
            return Err(SettingsError::MalformedSelector(format!(
                "{}: empty attribute name",
                self
            )));
        }
        for step in &self.steps {
            let empty_key = matches!(&step.key, Some((attr, _)) if attr.is_empty());
            if step.element.is_empty() || empty_key {
                return Err(SettingsError::MalformedSelector(format!(
                    "{}: step '{}' has an empty name",
                    self, step
                )));
            }
        }
        if document.root.name != self.root {
            return Err(SettingsError::MalformedSelector(format!(
                "{}: document root is <{}>",
                self, document.root.name
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.root)?;
        for step in &self.steps {
            write!(f, "/{}", step)?;
        }
        write!(f, "/@{}", self.attribute)
    }
}

/// What an upsert did to the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The attribute already held the value
    Unchanged,
    /// The element existed and its attribute was set
    Updated,
    /// At least one element of the path was created
    Created,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatchState {
    /// Walking (and creating) the parent chain; holds the next step index
    SeekingParent(usize),
    SeekingTarget,
    Found(usize),
    NotFound,
    Done,
}

/// Whitespace layout of an element whose children sit on their own lines
#[derive(Debug, Clone, PartialEq, Eq)]
struct Indent {
    /// Text before the element's end tag, e.g. `"\n  "`
    closing: String,
    /// One level of indentation, e.g. `"  "`
    unit: String,
}

fn is_line_break(text: &str) -> bool {
    text.contains('\n') && text.chars().all(char::is_whitespace)
}

impl Indent {
    /// Layout of the root, read from its first and last text nodes.
    /// `None` for documents written without line breaks.
    fn of_root(root: &Element) -> Option<Self> {
        let first = match root.children.first()? {
            Node::Text(text) if is_line_break(text) => text,
            _ => return None,
        };
        let closing = match root.children.last()? {
            Node::Text(text) if is_line_break(text) => text,
            _ => return None,
        };
        let unit = first.strip_prefix(closing.as_str())?;
        if unit.is_empty() {
            return None;
        }
        Some(Self {
            closing: closing.clone(),
            unit: unit.to_string(),
        })
    }

    /// Text before each child element
    fn child(&self) -> String {
        format!("{}{}", self.closing, self.unit)
    }

    /// Layout one level further down
    fn descend(&self) -> Self {
        Self {
            closing: self.child(),
            unit: self.unit.clone(),
        }
    }
}

fn append(parent: &mut Element, child: Element, indent: Option<&Indent>) -> usize {
    match indent {
        Some(indent) => parent.append_child_indented(child, &indent.child(), &indent.closing),
        None => parent.append_child(child),
    }
}

/// Find the first child matching `step`, appending a new one if absent
fn child_or_create<'a>(
    parent: &'a mut Element,
    step: &Step,
    indent: Option<&Indent>,
    created: &mut bool,
) -> Result<&'a mut Element, SettingsError> {
    let index = match parent.position_of(|e| step.matches(e)) {
        Some(index) => index,
        None => {
            *created = true;
            append(parent, step.create(), indent)
        }
    };
    parent
        .element_at_mut(index)
        .ok_or_else(|| SettingsError::MalformedSelector(format!("lost element for step '{}'", step)))
}

/// Ensure the addressed element exists and its attribute equals `value`
pub fn upsert(
    document: &mut Document,
    selector: &Selector,
    value: &str,
) -> Result<PatchOutcome, SettingsError> {
    selector.validate(document)?;

    let (target, parents) = selector.steps.split_last().ok_or_else(|| {
        SettingsError::MalformedSelector(format!("{}: no target element", selector))
    })?;

    let mut indent = Indent::of_root(&document.root);
    let mut cursor: &mut Element = &mut document.root;
    let mut created = false;
    let mut outcome = PatchOutcome::Unchanged;
    let mut state = PatchState::SeekingParent(0);

    loop {
        state = match state {
            PatchState::SeekingParent(depth) if depth < parents.len() => {
                cursor = child_or_create(cursor, &parents[depth], indent.as_ref(), &mut created)?;
                indent = indent.map(|i| i.descend());
                PatchState::SeekingParent(depth + 1)
            }
            PatchState::SeekingParent(_) => PatchState::SeekingTarget,
            PatchState::SeekingTarget => match cursor.position_of(|e| target.matches(e)) {
                Some(index) => PatchState::Found(index),
                None => PatchState::NotFound,
            },
            PatchState::Found(index) => {
                let element = cursor.element_at_mut(index).ok_or_else(|| {
                    SettingsError::MalformedSelector(format!("lost target element for {}", selector))
                })?;
                if element.attribute(&selector.attribute) != Some(value) {
                    element.set_attribute(selector.attribute.clone(), value);
                    outcome = PatchOutcome::Updated;
                }
                PatchState::Done
            }
            PatchState::NotFound => {
                let mut element = target.create();
                element.set_attribute(selector.attribute.clone(), value);
                append(cursor, element, indent.as_ref());
                created = true;
                PatchState::Done
            }
            PatchState::Done => break,
        };
    }

    Ok(if created { PatchOutcome::Created } else { outcome })
}
