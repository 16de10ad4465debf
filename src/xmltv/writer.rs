use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::document::{XmlElement, XmlNode};
use crate::errors::{PipelineError, PipelineResult};

const INDENT_WIDTH: usize = 2;

/// Serialize `root` as a UTF-8 document with declaration and two-space indentation
///
/// Output ends with a newline. Identical trees always produce identical bytes.
pub fn write_document(root: &XmlElement) -> PipelineResult<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT_WIDTH);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(serialization_error)?;
    write_element(&mut writer, root)?;

    let mut output = writer.into_inner();
    output.push(b'\n');
    Ok(output)
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &XmlElement) -> PipelineResult<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(serialization_error);
    }

    writer
        .write_event(Event::Start(start))
        .map_err(serialization_error)?;

    for child in &element.children {
        let event = match child {
            XmlNode::Element(child) => {
                write_element(writer, child)?;
                continue;
            }
            XmlNode::Text(text) => Event::Text(BytesText::new(text)),
            XmlNode::CData(text) => Event::CData(BytesCData::new(text.as_str())),
            XmlNode::Comment(text) => Event::Comment(BytesText::from_escaped(text.as_str())),
        };
        writer.write_event(event).map_err(serialization_error)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(serialization_error)
}

fn serialization_error<E: std::fmt::Display>(error: E) -> PipelineError {
    PipelineError::Serialization {
        message: format!("Failed to write XML: {error}"),
    }
}
