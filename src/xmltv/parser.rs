//! Tolerant XMLTV parser
//!
//! Remote feeds are frequently malformed. Problems are recorded as warnings
//! and parsing carries on: an unparseable fragment is skipped up to the next
//! `<` while the stack of open elements is kept. Only input without any root
//! element is an error.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::borrow::Cow;

use super::document::{XmlElement, XmlNode};
use super::encoding::transcode_to_utf8;
use super::sanitize::{resolve_entity, sanitize, unescape_entities};
use crate::errors::{SourceError, SourceResult};

/// Syntax errors reported individually before only a total is kept
const MAX_RECORDED_SYNTAX_ERRORS: usize = 50;

/// Result of [`parse_tolerant`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    pub root: XmlElement,
    pub warnings: Vec<String>,
}

/// Parse `input` into an element tree, recovering from common defects
pub fn parse_tolerant(input: &[u8]) -> SourceResult<ParsedDocument> {
    let (decoded, encoding_warning) = transcode_to_utf8(input);
    let (cleaned, report) = sanitize(&decoded);
    let mut warnings: Vec<String> = encoding_warning.into_iter().collect();
    warnings.extend(report.warnings());
    let mut builder = TreeBuilder::new(warnings);

    let mut offset = 0;
    let mut reader = lenient_reader(&cleaned);
    let mut buf = Vec::with_capacity(8192);
    loop {
        if builder.is_complete() {
            builder.check_trailing(&mut reader, &mut buf);
            break;
        }

        let position = offset + reader.buffer_position() as usize;
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let element = builder.element_from(e);
                builder.open(element);
            }
            Ok(Event::Empty(ref e)) => {
                let element = builder.element_from(e);
                builder.attach(element);
            }
            Ok(Event::End(ref e)) => {
                let name = lossy(e.name().as_ref()).into_owned();
                builder.close(&name);
            }
            Ok(Event::Text(ref e)) => {
                let raw = lossy(e);
                let text = unescape_entities(&raw, &mut builder.unresolved_entities);
                builder.text(&text);
            }
            Ok(Event::GeneralRef(ref e)) => {
                let name = lossy(e);
                match resolve_entity(&name) {
                    Some(resolved) => builder.text(&resolved),
                    None => {
                        builder.unresolved_entities += 1;
                        builder.text(&format!("&{name};"));
                    }
                }
            }
            Ok(Event::CData(ref e)) => {
                builder.node(XmlNode::CData(lossy(e).into_owned()));
            }
            Ok(Event::Comment(ref e)) => {
                builder.node(XmlNode::Comment(lossy(e).into_owned()));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                builder.syntax_error(format!("XML error at byte {position}: {e}"));
                match next_tag(&cleaned, position + 1) {
                    Some(next) => {
                        offset = next;
                        reader = lenient_reader(&cleaned[next..]);
                    }
                    None => break,
                }
            }
        }
        buf.clear();
    }

    builder.finish()
}

fn lenient_reader(input: &[u8]) -> Reader<&[u8]> {
    let mut reader = Reader::from_reader(input);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    config.expand_empty_elements = false;
    reader
}

/// Offset of the first `<` at or after `from`
fn next_tag(input: &[u8], from: usize) -> Option<usize> {
    input
        .get(from..)?
        .iter()
        .position(|&b| b == b'<')
        .map(|index| from + index)
}

fn lossy(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

/// Stack of open elements plus the completed root
struct TreeBuilder {
    open: Vec<XmlElement>,
    root: Option<XmlElement>,
    warnings: Vec<String>,
    unresolved_entities: usize,
    syntax_errors: usize,
}

impl TreeBuilder {
    fn new(warnings: Vec<String>) -> Self {
        Self {
            open: Vec::new(),
            root: None,
            warnings,
            unresolved_entities: 0,
            syntax_errors: 0,
        }
    }

    fn warn(&mut self, message: String) {
        self.warnings.push(message);
    }

    fn syntax_error(&mut self, message: String) {
        self.syntax_errors += 1;
        if self.syntax_errors <= MAX_RECORDED_SYNTAX_ERRORS {
            self.warn(format!("{message}; skipped to the next tag"));
        }
    }

    fn is_complete(&self) -> bool {
        self.root.is_some()
    }

    fn element_from(&mut self, start: &BytesStart<'_>) -> XmlElement {
        let mut element = XmlElement::new(lossy(start.name().as_ref()));

        let mut attributes = start.attributes();
        attributes.with_checks(false);
        for attribute in attributes {
            match attribute {
                Ok(attribute) => {
                    let key = lossy(attribute.key.as_ref()).into_owned();
                    let value = unescape_entities(
                        &lossy(&attribute.value),
                        &mut self.unresolved_entities,
                    );
                    element.attributes.push((key, value));
                }
                Err(e) => {
                    self.warn(format!(
                        "dropped malformed attributes on <{}>: {e}",
                        element.name
                    ));
                    break;
                }
            }
        }

        element
    }

    fn open(&mut self, element: XmlElement) {
        self.open.push(element);
    }

    /// Add a finished element to the innermost open element, or make it the root
    fn attach(&mut self, mut element: XmlElement) {
        element.drop_blank_text();
        match self.open.last_mut() {
            Some(parent) => parent.push_element(element),
            None => self.root = Some(element),
        }
    }

    fn close(&mut self, name: &str) {
        let Some(index) = self.open.iter().rposition(|element| element.name == name) else {
            self.warn(format!("ignored unmatched end tag </{name}>"));
            return;
        };

        while self.open.len() > index + 1 {
            if let Some(unclosed) = self.open.pop() {
                self.warn(format!(
                    "closed <{}> implicitly at </{name}>",
                    unclosed.name
                ));
                self.attach(unclosed);
            }
        }
        if let Some(element) = self.open.pop() {
            self.attach(element);
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(parent) = self.open.last_mut() {
            parent.push_text(text);
        }
    }

    fn node(&mut self, node: XmlNode) {
        if let Some(parent) = self.open.last_mut() {
            parent.children.push(node);
        }
    }

    /// Report markup following the root element without parsing it
    fn check_trailing(&mut self, reader: &mut Reader<&[u8]>, buf: &mut Vec<u8>) {
        loop {
            buf.clear();
            match reader.read_event_into(buf) {
                Ok(Event::Eof) => return,
                Ok(Event::Start(_) | Event::Empty(_) | Event::End(_)) | Err(_) => {
                    self.warn("ignored content after the root element".to_string());
                    return;
                }
                Ok(_) => {}
            }
        }
    }

    fn finish(mut self) -> SourceResult<ParsedDocument> {
        if !self.open.is_empty() {
            self.warn(format!(
                "closed {} element(s) left open at end of input",
                self.open.len()
            ));
            while let Some(element) = self.open.pop() {
                self.attach(element);
            }
        }

        if self.syntax_errors > MAX_RECORDED_SYNTAX_ERRORS {
            let unreported = self.syntax_errors - MAX_RECORDED_SYNTAX_ERRORS;
            self.warn(format!("skipped {unreported} more unparseable fragment(s)"));
        }

        if self.unresolved_entities > 0 {
            let count = self.unresolved_entities;
            self.warn(format!("kept {count} unknown entity reference(s) literally"));
        }

        match self.root {
            Some(root) => Ok(ParsedDocument {
                root,
                warnings: self.warnings,
            }),
            None => Err(SourceError::parse("document has no root element")),
        }
    }
}
