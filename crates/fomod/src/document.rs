//! Owned view of a module configuration document
//!
//! The XML text is read once with a `quick_xml` event reader and built into an
//! owned [`Element`] tree so that parsed structures never borrow from the
//! source text. Only what the grammars need is kept: element names, attributes
//! in document order, element children in document order, text content and,
//! for leaf elements, the raw inner content.
//!
//! Documents are untrusted. The tree is built on an explicit stack of open
//! elements and loading fails once nesting passes [`MAX_DOCUMENT_DEPTH`], so
//! no later recursive walk (building, evaluation, drop) can run away.

use crate::error::{ParseError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Element nesting allowed when loading a document, the root counting as 1
pub const MAX_DOCUMENT_DEPTH: usize = 256;

/// A single element of a configuration document
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    /// Concatenated text content directly inside this element, unescaped
    pub text: String,
    /// Source text between the start and end tags, markup and entities as
    /// written. Only recorded for elements without element children.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_xml: Option<String>,
}

impl Element {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_text<S: Into<String>>(mut self, text: S) -> Self {
        self.text = text.into();
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Attribute lookup where absence means the document and parser disagree
    pub fn required_attribute(&self, name: &str) -> Result<&str> {
        self.attribute(name).ok_or_else(|| ParseError::MissingAttribute {
            node: self.name.clone(),
            attribute: name.to_string(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Raw inner content, falling back to the text for elements built in code
    /// or holding element children
    pub fn inner_xml(&self) -> &str {
        self.inner_xml.as_deref().unwrap_or(&self.text)
    }

    pub fn first_child(&self) -> Option<&Element> {
        self.children.first()
    }

    /// Select descendants by a relative path such as `patterns/*` or `type`.
    ///
    /// Segments are element names separated by `/`; `*` matches any element.
    /// Results keep document order.
    pub fn select(&self, path: &str) -> Vec<&Element> {
        let mut current = vec![self];
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = current
                .into_iter()
                .flat_map(|element| element.children.iter())
                .filter(|child| segment == "*" || child.name == segment)
                .collect();
        }
        current
    }

    pub fn select_single(&self, path: &str) -> Option<&Element> {
        self.select(path).into_iter().next()
    }

    pub fn required_child(&self, path: &str) -> Result<&Element> {
        self.select_single(path).ok_or_else(|| ParseError::MissingChild {
            node: self.name.clone(),
            child: path.to_string(),
        })
    }

    /// Name and attributes of a start tag; namespace declarations are dropped
    /// and prefixed names keep their local part
    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let mut element = Element::new(String::from_utf8_lossy(start.local_name().as_ref()));
        for attribute in start.attributes() {
            let attribute = attribute.map_err(quick_xml::Error::from)?;
            if attribute.key.as_namespace_binding().is_some() {
                continue;
            }
            let value = attribute.unescape_value().map_err(quick_xml::Error::from)?;
            element.attributes.push((
                String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned(),
                value.into_owned(),
            ));
        }
        Ok(element)
    }
}

/// An element whose end tag has not been read yet
struct OpenElement {
    element: Element,
    /// Byte offset just past the start tag
    content_start: usize,
}

/// A loaded configuration document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigDocument {
    root: Element,
}

impl ConfigDocument {
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    /// Parse XML text into a document, nesting bounded by [`MAX_DOCUMENT_DEPTH`]
    pub fn parse(xml: &str) -> Result<Self> {
        Self::parse_with_depth_limit(xml, MAX_DOCUMENT_DEPTH)
    }

    /// Parse XML text, failing with [`ParseError::DocumentTooDeep`] as soon as
    /// an element would sit deeper than `max_depth`
    pub fn parse_with_depth_limit(xml: &str, max_depth: usize) -> Result<Self> {
        let xml = xml.trim_start_matches('\u{feff}');
        let mut reader = Reader::from_str(xml);
        let mut open: Vec<OpenElement> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event_start = position(&reader);
            match reader.read_event()? {
                Event::Start(start) => {
                    if open.len() >= max_depth {
                        return Err(ParseError::DocumentTooDeep { limit: max_depth });
                    }
                    let element = Element::from_start(&start)?;
                    open.push(OpenElement {
                        element,
                        content_start: position(&reader),
                    });
                }
                Event::Empty(start) => {
                    if open.len() >= max_depth {
                        return Err(ParseError::DocumentTooDeep { limit: max_depth });
                    }
                    let mut element = Element::from_start(&start)?;
                    element.inner_xml = Some(String::new());
                    attach(&mut open, &mut root, element)?;
                }
                Event::End(_) => {
                    let OpenElement {
                        mut element,
                        content_start,
                    } = open.pop().ok_or_else(|| malformed("closing tag without an open element"))?;
                    if element.children.is_empty() {
                        let inner = xml.get(content_start..event_start).unwrap_or_default();
                        element.inner_xml = Some(inner.to_string());
                    }
                    attach(&mut open, &mut root, element)?;
                }
                Event::Text(text) => {
                    if let Some(current) = open.last_mut() {
                        let text = text.unescape().map_err(quick_xml::Error::from)?;
                        current.element.text.push_str(&text);
                    }
                }
                Event::CData(data) => {
                    if let Some(current) = open.last_mut() {
                        current.element.text.push_str(&String::from_utf8_lossy(&data));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(unclosed) = open.last() {
            return Err(malformed(format!("element '{}' is not closed", unclosed.element.name)));
        }
        root.map(Self::new)
            .ok_or_else(|| malformed("document has no root element"))
    }

    /// Read and parse a configuration file from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let xml = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&xml)
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Select elements by path. A leading `/` anchors the path at the document,
    /// so its first segment must name the root element.
    pub fn select(&self, path: &str) -> Vec<&Element> {
        match path.strip_prefix('/') {
            Some(absolute) => {
                let (first, rest) = absolute.split_once('/').unwrap_or((absolute, ""));
                if first == "*" || first == self.root.name {
                    if rest.is_empty() {
                        vec![&self.root]
                    } else {
                        self.root.select(rest)
                    }
                } else {
                    Vec::new()
                }
            }
            None => self.root.select(path),
        }
    }

    pub fn select_single(&self, path: &str) -> Option<&Element> {
        self.select(path).into_iter().next()
    }
}

fn position(reader: &Reader<&[u8]>) -> usize {
    reader.buffer_position() as usize
}

fn malformed<S: Into<String>>(reason: S) -> ParseError {
    ParseError::MalformedDocument { reason: reason.into() }
}

/// Hand a finished element to its parent, or make it the root
fn attach(open: &mut [OpenElement], root: &mut Option<Element>, element: Element) -> Result<()> {
    match open.last_mut() {
        Some(parent) => parent.element.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(malformed("document has more than one root element")),
    }
    Ok(())
}
